//! Crop-ratio side table consulted during normalization.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::normalize::normalize_slug;

/// Horizontal and vertical crop ratios for a sector's imagery.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropRatios {
    pub x: f64,
    pub y: f64,
}

impl CropRatios {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Lookup keyed by normalized (satellite, sector) identifiers.
pub trait CropLookup: Send + Sync {
    fn crop_ratios(&self, satellite: &str, sector: &str) -> Option<CropRatios>;
}

/// Lookup that never matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCropping;

impl CropLookup for NoCropping {
    fn crop_ratios(&self, _satellite: &str, _sector: &str) -> Option<CropRatios> {
        None
    }
}

/// In-memory crop table.
///
/// YAML layout:
///
/// ```yaml
/// goes_16:
///   full_disk: { x: 0.1, y: 0.2 }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CropTable {
    entries: HashMap<(String, String), CropRatios>,
}

impl CropTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Both keys are normalized.
    pub fn insert(&mut self, satellite: &str, sector: &str, ratios: CropRatios) {
        self.entries
            .insert((normalize_slug(satellite), normalize_slug(sector)), ratios);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_yaml_str(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let raw: BTreeMap<String, BTreeMap<String, CropRatios>> = serde_yaml::from_str(yaml)?;
        let mut table = Self::new();
        for (satellite, sectors) in &raw {
            for (sector, ratios) in sectors {
                table.insert(satellite, sector, *ratios);
            }
        }
        Ok(table)
    }

    /// Load a crop table from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::CropTable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let table = Self::from_yaml_str(&content).map_err(|e| CatalogError::CropTable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), entries = table.len(), "Loaded crop table");
        Ok(table)
    }
}

impl CropLookup for CropTable {
    fn crop_ratios(&self, satellite: &str, sector: &str) -> Option<CropRatios> {
        self.entries
            .get(&(satellite.to_string(), sector.to_string()))
            .copied()
    }
}
