//! Satellite imagery product catalog.
//!
//! Retrieves the catalog script that drives the tile viewer, pulls the
//! embedded JSON out of it, and normalizes it into a catalog keyed by
//! hyphenated identifiers (`goes-16` / `full-disk` / `band-01`).
//!
//! # Architecture
//!
//! - [`fetch`]: one HTTP GET of the live document
//! - [`extract`]: locate the JSON object inside the script wrapper
//! - [`model`]: the decoded type graph
//! - [`normalize`]: re-keying, title unescaping, header removal
//! - [`crop`]: crop-ratio side table consulted during normalization
//! - [`store`]: live-then-fail-safe resolution and memoization

pub mod config;
pub mod crop;
pub mod error;
pub mod extract;
pub mod failsafe;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod store;

// Re-exports
pub use config::{CatalogConfig, DEFAULT_SOURCE_URL};
pub use crop::{CropLookup, CropRatios, CropTable, NoCropping};
pub use error::{CatalogError, ExtractError, FetchError, Result};
pub use extract::extract_json_object;
pub use failsafe::{FAILSAFE_DOCUMENT, FAILSAFE_SNAPSHOT};
pub use fetch::{DocumentSource, HttpFetcher};
pub use model::{
    Catalog, Defaults, GeoReference, Navigation, NavigationTarget, Product, Satellite, Sector,
    SectorDefaults,
};
pub use normalize::{is_section_header, normalize_catalog, normalize_slug, unescape_title};
pub use store::{parse_catalog, CatalogOrigin, CatalogStore};
