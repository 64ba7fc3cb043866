//! Tests for live/fail-safe resolution and memoization.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use slider_catalog::{
    CatalogError, CatalogOrigin, CatalogStore, CropRatios, CropTable, DocumentSource, FetchError,
};

const LIVE_DOCUMENT: &str = r#"var json_file = {"default_satellite":"sat_live","satellites":{"sat_live":{"satellite_title":"Live &amp; Well","default_sector":"full_disk","sectors":{"full_disk":{"sector_title":"Full Disk"}},"products":{"band_01":{"product_title":"Band 1"}}}}};"#;

/// Test double that counts fetches and answers with a fixed outcome.
struct StubSource {
    outcome: Outcome,
    delay: Duration,
    calls: AtomicUsize,
}

enum Outcome {
    Document(&'static str),
    Status(u16),
}

impl StubSource {
    fn serving(document: &'static str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Outcome::Document(document),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            outcome: Outcome::Status(status),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn slow(document: &'static str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcome: Outcome::Document(document),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for StubSource {
    async fn fetch(&self) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.outcome {
            Outcome::Document(doc) => Ok(Bytes::from_static(doc.as_bytes())),
            Outcome::Status(status) => Err(FetchError::Status {
                url: "stub://catalog".to_string(),
                status: *status,
            }),
        }
    }

    fn describe(&self) -> String {
        "stub://catalog".to_string()
    }
}

#[tokio::test]
async fn test_live_document_used() {
    let source = StubSource::serving(LIVE_DOCUMENT);
    let store = CatalogStore::new(source.clone());

    let catalog = store.get().await.unwrap();
    assert_eq!(source.calls(), 1);
    assert_eq!(store.origin().await, Some(CatalogOrigin::Live));
    assert!(store.loaded_at().await.is_some());

    let satellite = catalog.satellite("sat_live").unwrap();
    assert_eq!(satellite.satellite_title, "Live & Well");
    assert!(satellite.product("band-01").is_some());
}

#[tokio::test]
async fn test_downloads_disabled_skips_fetch() {
    let source = StubSource::serving(LIVE_DOCUMENT);
    let store = CatalogStore::new(source.clone()).with_downloads_disabled(true);
    assert!(store.downloads_disabled());

    let catalog = store.get().await.unwrap();
    assert_eq!(source.calls(), 0);
    assert_eq!(store.origin().await, Some(CatalogOrigin::FailSafe));
    assert!(catalog.satellite("goes-16").is_some());
    assert!(catalog.satellite("sat-live").is_none());
}

#[tokio::test]
async fn test_non_200_falls_back() {
    let source = StubSource::failing(503);
    let store = CatalogStore::new(source.clone());

    let catalog = store.get().await.unwrap();
    assert_eq!(source.calls(), 1);
    assert_eq!(store.origin().await, Some(CatalogOrigin::FailSafe));
    assert!(catalog.satellite("goes-16").is_some());
}

#[tokio::test]
async fn test_unparsable_live_document_falls_back() {
    let source = StubSource::serving("<html>502 Bad Gateway</html>");
    let store = CatalogStore::new(source.clone());

    let catalog = store.get().await.unwrap();
    assert_eq!(store.origin().await, Some(CatalogOrigin::FailSafe));
    assert!(!catalog.satellites.is_empty());
}

#[tokio::test]
async fn test_load_live_surfaces_error() {
    let store = CatalogStore::new(StubSource::failing(404));
    let err = store.load_live().await.unwrap_err();
    match err {
        CatalogError::Fetch(fetch) => assert_eq!(fetch.status(), Some(404)),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.origin().await, None);
}

#[tokio::test]
async fn test_memoized_across_calls() {
    let source = StubSource::serving(LIVE_DOCUMENT);
    let store = CatalogStore::new(source.clone());

    let first = store.get().await.unwrap();
    let second = store.get().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_switch_ignored_once_memoized() {
    let source = StubSource::serving(LIVE_DOCUMENT);
    let store = CatalogStore::new(source.clone());

    store.get().await.unwrap();
    store.set_downloads_disabled(true);
    store.get().await.unwrap();
    assert_eq!(store.origin().await, Some(CatalogOrigin::Live));
}

#[tokio::test]
async fn test_invalidate_reloads() {
    let source = StubSource::serving(LIVE_DOCUMENT);
    let store = CatalogStore::new(source.clone());

    let first = store.get().await.unwrap();
    store.invalidate().await;
    assert_eq!(store.origin().await, None);

    let second = store.get().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_concurrent_first_callers_share_one_load() {
    let source = StubSource::slow(LIVE_DOCUMENT, Duration::from_millis(50));
    let store = Arc::new(CatalogStore::new(source.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.get().await.map(|c| c.satellites.len()) })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 1);
    }
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_broken_failsafe_is_fatal() {
    let store = CatalogStore::new(StubSource::failing(500))
        .with_failsafe_document(&b"var json_file = {broken"[..]);

    let err = store.get().await.unwrap_err();
    match err {
        CatalogError::FailSafe(inner) => assert!(matches!(*inner, CatalogError::Extract(_))),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.origin().await, None);
}

#[tokio::test]
async fn test_crop_lookup_applied_to_failsafe() {
    let mut crops = CropTable::new();
    crops.insert("goes_16", "full_disk", CropRatios::new(0.1, 0.2));

    let store = CatalogStore::new(StubSource::failing(500)).with_crop_lookup(Arc::new(crops));
    let catalog = store.get().await.unwrap();

    let goes = catalog.satellite("goes-16").unwrap();
    assert_eq!(
        goes.sector("full-disk").unwrap().crop_ratios,
        Some(CropRatios::new(0.1, 0.2))
    );
    assert_eq!(goes.sector("conus").unwrap().crop_ratios, None);
}
