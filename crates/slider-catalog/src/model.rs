//! Catalog type graph.
//!
//! Field names follow the published JSON document. Maps are `BTreeMap` so
//! that a normalized catalog serializes identically on every run.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::crop::CropRatios;
use crate::normalize::normalize_slug;

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Root of the product catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Selectable "number of images" options for the animation loop.
    #[serde(default, deserialize_with = "null_as_default")]
    pub number_of_images_options: Vec<u32>,
    /// Selectable time-step options.
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_step_options: Vec<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub default_satellite: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub defaults: Defaults,
    /// Overlay color name -> display label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub map_colors: BTreeMap<String, String>,
    /// Colors that imply a specific legend.
    #[serde(default, deserialize_with = "null_as_default")]
    pub unique_colors: BTreeMap<String, String>,
    /// Legend names exempt from the white-maps-only filter.
    #[serde(default, deserialize_with = "null_as_default")]
    pub white_maps_only_exceptions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub satellites: BTreeMap<String, Satellite>,
}

impl Catalog {
    /// Look up a satellite by raw slug or normalized identifier.
    pub fn satellite(&self, id: &str) -> Option<&Satellite> {
        self.satellites.get(&normalize_slug(id))
    }

    pub fn default_satellite(&self) -> Option<&Satellite> {
        self.satellite(&self.default_satellite)
    }

    /// Shared defaults with the sector's overrides applied on top.
    ///
    /// Unknown satellite or sector yields the catalog defaults unchanged.
    pub fn effective_defaults(&self, satellite: &str, sector: &str) -> Defaults {
        let mut defaults = self.defaults.clone();
        if let Some(sector) = self.satellite(satellite).and_then(|s| s.sector(sector)) {
            sector.defaults.apply_to(&mut defaults);
        }
        defaults
    }
}

/// Shared fallback values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default, deserialize_with = "null_as_default")]
    pub starting_opacity: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zoom_level_adjust: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_zoom_level: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub minutes_between_images: u32,
    /// Overlay name -> color name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub default_colors: BTreeMap<String, String>,
    /// Overlay name -> label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub default_maps: BTreeMap<String, String>,
}

/// Per-sector overrides of [`Defaults`]. Absent fields inherit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectorDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_level_adjust: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_zoom_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_between_images: Option<u32>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub default_colors: BTreeMap<String, String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub default_maps: BTreeMap<String, String>,
}

impl SectorDefaults {
    fn apply_to(&self, defaults: &mut Defaults) {
        if let Some(v) = self.starting_opacity {
            defaults.starting_opacity = v;
        }
        if let Some(v) = self.zoom_level_adjust {
            defaults.zoom_level_adjust = v;
        }
        if let Some(v) = self.max_zoom_level {
            defaults.max_zoom_level = v;
        }
        if let Some(v) = self.minutes_between_images {
            defaults.minutes_between_images = v;
        }
        defaults.default_colors.extend(
            self.default_colors
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        defaults
            .default_maps
            .extend(self.default_maps.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

/// A satellite and everything it can display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Satellite {
    /// Source slug, recorded during normalization.
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub satellite_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_message: Option<String>,
    /// Zoom level -> resolution label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub imagery_resolutions: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub default_sector: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sectors: BTreeMap<String, Sector>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: BTreeMap<String, Product>,
}

impl Satellite {
    pub fn id(&self) -> String {
        normalize_slug(&self.value)
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation_message
            .as_deref()
            .is_some_and(|m| !m.trim().is_empty())
    }

    pub fn sector(&self, id: &str) -> Option<&Sector> {
        self.sectors.get(&normalize_slug(id))
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(&normalize_slug(id))
    }

    pub fn default_sector(&self) -> Option<&Sector> {
        self.sector(&self.default_sector)
    }

    /// Products of this satellite not suppressed for `sector`.
    pub fn visible_products<'a>(
        &'a self,
        sector: &'a Sector,
    ) -> impl Iterator<Item = &'a Product> + 'a {
        self.products
            .iter()
            .filter(move |(id, _)| !sector.is_product_hidden(id))
            .map(|(_, product)| product)
    }
}

/// A viewing region of a satellite.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sector {
    /// Source slug, recorded during normalization.
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sector_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_zoom_level: u32,
    /// Tile edge length in pixels.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tile_size: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub default_product: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub defaults: SectorDefaults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_lon_query: Option<GeoReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<Navigation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing_products: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing_maps: Vec<String>,
    /// Set from the crop lookup during normalization, never from the document.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub crop_ratios: Option<CropRatios>,
}

impl Sector {
    pub fn id(&self) -> String {
        normalize_slug(&self.value)
    }

    pub fn is_product_hidden(&self, product: &str) -> bool {
        let product = normalize_slug(product);
        self.missing_products
            .iter()
            .any(|p| normalize_slug(p) == product)
    }

    /// Legend names are compared verbatim.
    pub fn is_map_hidden(&self, map: &str) -> bool {
        self.missing_maps.iter().any(|m| m == map)
    }

    /// The sector's default product, looked up in its owning satellite.
    pub fn default_product<'a>(&self, satellite: &'a Satellite) -> Option<&'a Product> {
        satellite.product(&self.default_product)
    }
}

/// Geo-referencing parameters for lat/lon readout and the scale bar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoReference {
    /// Sub-satellite longitude in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon0: Option<f64>,
    /// Satellite altitude in km.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat_alt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rad_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rad_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_radius_x_z0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_radius_y_z0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_bar_min_zoom: Option<u32>,
}

/// Links to neighbouring sectors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Navigation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up: Option<NavigationTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down: Option<NavigationTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<NavigationTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<NavigationTarget>,
}

impl Navigation {
    /// Present links as (direction, target) pairs.
    pub fn links(&self) -> impl Iterator<Item = (&'static str, &NavigationTarget)> {
        [
            ("up", self.up.as_ref()),
            ("down", self.down.as_ref()),
            ("left", self.left.as_ref()),
            ("right", self.right.as_ref()),
        ]
        .into_iter()
        .filter_map(|(dir, target)| target.map(|t| (dir, t)))
    }
}

/// A (satellite, sector) pair a navigation link points to.
///
/// Targets are not checked against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavigationTarget {
    #[serde(default, deserialize_with = "null_as_default")]
    pub satellite: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sector: String,
}

/// A band or derived composite.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    /// Source slug, recorded during normalization.
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_title: String,
    /// May contain inline HTML; left as-is.
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_description: String,
    /// Minimum resolution label, e.g. "0.5 km".
    #[serde(default, deserialize_with = "null_as_default")]
    pub resolution: String,
    /// Legend / color table name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub color_table_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zoom_level_adjust: i32,
}

impl Product {
    pub fn id(&self) -> String {
        normalize_slug(&self.value)
    }
}
