//! Key normalization and title unescaping.
//!
//! A decoded catalog is keyed by source slugs (`goes_16`, `full_disk`,
//! `band_01`). Normalization records each slug on its entry, re-keys every
//! map by the hyphenated identifier, unescapes display titles and drops
//! section-header products. New maps are built; the decoded maps are
//! consumed, never mutated in place.

use std::collections::BTreeMap;

use html_escape::decode_html_entities;
use tracing::{debug, warn};

use crate::crop::CropLookup;
use crate::model::{Catalog, Product, Satellite, Sector};

/// Titles starting with this run of dashes are visual dividers, not products.
pub const SECTION_HEADER_MARKER: &str = "---";

/// Normalized identifier of a slug: every `_` becomes `-`.
pub fn normalize_slug(slug: &str) -> String {
    slug.replace('_', "-")
}

pub fn is_section_header(title: &str) -> bool {
    title.starts_with(SECTION_HEADER_MARKER)
}

/// Decode HTML named and numeric character references.
///
/// Each reference is decoded on its own; an unknown entity or a bare `&`
/// stays as literal text without affecting its neighbours.
pub fn unescape_title(title: &str) -> String {
    if !title.contains('&') {
        return title.to_string();
    }
    decode_html_entities(title).into_owned()
}

/// Rewrite a freshly decoded catalog into its normalized form.
pub fn normalize_catalog(mut catalog: Catalog, crops: &dyn CropLookup) -> Catalog {
    let raw_satellites = std::mem::take(&mut catalog.satellites);

    let mut normalized = BTreeMap::new();
    for (slug, satellite) in raw_satellites {
        let satellite = normalize_satellite(slug, satellite, crops);
        insert_unique(&mut normalized, satellite.id(), satellite, "satellite");
    }
    catalog.satellites = normalized;
    catalog
}

fn normalize_satellite(slug: String, mut satellite: Satellite, crops: &dyn CropLookup) -> Satellite {
    satellite.value = slug;
    satellite.satellite_title = unescape_title(&satellite.satellite_title);
    let satellite_id = satellite.id();

    let mut sectors = BTreeMap::new();
    for (sector_slug, sector) in std::mem::take(&mut satellite.sectors) {
        let sector = normalize_sector(&satellite_id, sector_slug, sector, crops);
        insert_unique(&mut sectors, sector.id(), sector, "sector");
    }

    let mut products = BTreeMap::new();
    for (product_slug, product) in std::mem::take(&mut satellite.products) {
        if let Some(product) = normalize_product(product_slug, product) {
            insert_unique(&mut products, product.id(), product, "product");
        }
    }

    satellite.sectors = sectors;
    satellite.products = products;
    satellite
}

fn normalize_sector(
    satellite_id: &str,
    slug: String,
    mut sector: Sector,
    crops: &dyn CropLookup,
) -> Sector {
    sector.value = slug;
    sector.sector_title = unescape_title(&sector.sector_title);
    if let Some(ratios) = crops.crop_ratios(satellite_id, &sector.id()) {
        sector.crop_ratios = Some(ratios);
    }
    sector
}

fn normalize_product(slug: String, mut product: Product) -> Option<Product> {
    product.value = slug;
    product.product_title = unescape_title(&product.product_title);
    if is_section_header(&product.product_title) {
        debug!(product = %product.value, title = %product.product_title, "Skipping section header");
        return None;
    }
    Some(product)
}

/// Two slugs can normalize to the same identifier (`a_b`, `a-b`). Source
/// maps iterate in key order, so the later slug wins deterministically.
fn insert_unique<T>(map: &mut BTreeMap<String, T>, id: String, entry: T, kind: &str) {
    if map.insert(id.clone(), entry).is_some() {
        warn!(kind = kind, id = %id, "Normalized identifier collision, keeping last entry");
    }
}
