//! Catalog resolution and memoization.
//!
//! The store resolves the catalog once: live document first (unless
//! downloads are disabled), then the bundled snapshot. Whichever succeeds
//! is kept and shared until [`CatalogStore::invalidate`] is called.
//!
//! The slot lock is held for the whole first load, so concurrent first
//! callers wait for a single fetch and parse instead of racing.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::crop::{CropLookup, CropTable, NoCropping};
use crate::error::{CatalogError, Result};
use crate::extract::extract_json_object;
use crate::failsafe::{FAILSAFE_DOCUMENT, FAILSAFE_SNAPSHOT};
use crate::fetch::{DocumentSource, HttpFetcher};
use crate::model::Catalog;
use crate::normalize::normalize_catalog;

/// Which document the memoized catalog was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    Live,
    FailSafe,
}

impl fmt::Display for CatalogOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogOrigin::Live => write!(f, "live"),
            CatalogOrigin::FailSafe => write!(f, "fail-safe"),
        }
    }
}

struct LoadedCatalog {
    catalog: Arc<Catalog>,
    origin: CatalogOrigin,
    loaded_at: DateTime<Utc>,
}

/// Extract, decode and normalize one catalog document.
pub fn parse_catalog(document: &[u8], crops: &dyn CropLookup) -> Result<Catalog> {
    let payload = extract_json_object(document)?;
    let decoded: Catalog = serde_json::from_slice(payload)?;
    Ok(normalize_catalog(decoded, crops))
}

/// Owner of the memoized catalog.
pub struct CatalogStore {
    source: Arc<dyn DocumentSource>,
    crops: Arc<dyn CropLookup>,
    failsafe: Bytes,
    downloads_disabled: AtomicBool,
    slot: Mutex<Option<LoadedCatalog>>,
}

impl CatalogStore {
    /// Store backed by `source`, no crop table and the bundled snapshot.
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            source,
            crops: Arc::new(NoCropping),
            failsafe: Bytes::from_static(FAILSAFE_DOCUMENT),
            downloads_disabled: AtomicBool::new(false),
            slot: Mutex::new(None),
        }
    }

    /// Build the HTTP fetcher and crop table described by `config`.
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config)?;
        let mut store = Self::new(Arc::new(fetcher)).with_downloads_disabled(config.disable_downloads);

        if let Some(path) = config.crop_table.as_deref() {
            store = store.with_crop_lookup(Arc::new(load_crop_table(path)?));
        }

        Ok(store)
    }

    pub fn with_crop_lookup(mut self, crops: Arc<dyn CropLookup>) -> Self {
        self.crops = crops;
        self
    }

    /// Replace the bundled snapshot (tests, pinned deployments).
    pub fn with_failsafe_document(mut self, document: impl Into<Bytes>) -> Self {
        self.failsafe = document.into();
        self
    }

    pub fn with_downloads_disabled(self, disabled: bool) -> Self {
        self.set_downloads_disabled(disabled);
        self
    }

    pub fn set_downloads_disabled(&self, disabled: bool) {
        self.downloads_disabled.store(disabled, Ordering::SeqCst);
    }

    pub fn downloads_disabled(&self) -> bool {
        self.downloads_disabled.load(Ordering::SeqCst)
    }

    /// The normalized catalog, loading it on first use.
    ///
    /// Fails only when the fail-safe document itself cannot be parsed.
    pub async fn get(&self) -> Result<Arc<Catalog>> {
        let mut slot = self.slot.lock().await;
        if let Some(loaded) = slot.as_ref() {
            debug!(origin = %loaded.origin, "Catalog cache hit");
            return Ok(loaded.catalog.clone());
        }

        let loaded = self.load().await?;
        let catalog = loaded.catalog.clone();
        *slot = Some(loaded);
        Ok(catalog)
    }

    /// Origin of the memoized catalog, if one is loaded.
    pub async fn origin(&self) -> Option<CatalogOrigin> {
        self.slot.lock().await.as_ref().map(|l| l.origin)
    }

    pub async fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.slot.lock().await.as_ref().map(|l| l.loaded_at)
    }

    /// Drop the memoized catalog; the next [`get`](Self::get) reloads.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        *slot = None;
        debug!("Catalog cache invalidated");
    }

    /// Fetch and parse the live document without touching the cache.
    pub async fn load_live(&self) -> Result<Catalog> {
        let document = self.source.fetch().await?;
        parse_catalog(&document, self.crops.as_ref())
    }

    async fn load(&self) -> Result<LoadedCatalog> {
        if self.downloads_disabled() {
            info!("Catalog downloads disabled, using fail-safe snapshot");
        } else {
            match self.load_live().await {
                Ok(catalog) => return Ok(self.memoize(catalog, CatalogOrigin::Live)),
                Err(e) => {
                    warn!(
                        source = %self.source.describe(),
                        error = %e,
                        "Live catalog unavailable, falling back to fail-safe snapshot"
                    );
                }
            }
        }

        let catalog = parse_catalog(&self.failsafe, self.crops.as_ref())
            .map_err(|e| CatalogError::FailSafe(Box::new(e)))?;
        Ok(self.memoize(catalog, CatalogOrigin::FailSafe))
    }

    fn memoize(&self, catalog: Catalog, origin: CatalogOrigin) -> LoadedCatalog {
        match origin {
            CatalogOrigin::Live => info!(
                origin = %origin,
                satellites = catalog.satellites.len(),
                "Loaded catalog"
            ),
            CatalogOrigin::FailSafe => info!(
                origin = %origin,
                snapshot = FAILSAFE_SNAPSHOT,
                satellites = catalog.satellites.len(),
                "Loaded catalog"
            ),
        }

        LoadedCatalog {
            catalog: Arc::new(catalog),
            origin,
            loaded_at: Utc::now(),
        }
    }
}

fn load_crop_table(path: &Path) -> Result<CropTable> {
    let table = CropTable::load(path)?;
    info!(path = %path.display(), entries = table.len(), "Loaded crop table");
    Ok(table)
}
