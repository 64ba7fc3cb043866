//! Catalog loader configuration.
//!
//! Environment variables:
//! - `SLIDER_CATALOG_URL` (default: [`DEFAULT_SOURCE_URL`])
//! - `SLIDER_CATALOG_TIMEOUT_SECS` (default: 30)
//! - `SLIDER_CATALOG_CONNECT_TIMEOUT_SECS` (default: 10)
//! - `SLIDER_CATALOG_USER_AGENT`
//! - `SLIDER_DISABLE_DOWNLOADS` (`1`, `true`, `yes`, `on`)
//! - `SLIDER_CROP_TABLE` (path to a crop table YAML file)

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Location of the live catalog script.
pub const DEFAULT_SOURCE_URL: &str = "https://rammb-slider.cira.colostate.edu/data/json/define.js";

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub source_url: String,
    /// Whole-request timeout for the single fetch attempt
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Skip the network and resolve from the fail-safe document
    pub disable_downloads: bool,
    pub crop_table: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("slider-catalog/", env!("CARGO_PKG_VERSION")).to_string(),
            disable_downloads: false,
            crop_table: None,
        }
    }
}

impl CatalogConfig {
    /// Defaults overlaid with whatever the environment sets.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("SLIDER_CATALOG_URL").filter(|v| !v.trim().is_empty()) {
            config.source_url = url.trim().to_string();
        }
        if let Some(secs) = parse_secs(&lookup, "SLIDER_CATALOG_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_secs(&lookup, "SLIDER_CATALOG_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = lookup("SLIDER_CATALOG_USER_AGENT").filter(|v| !v.is_empty()) {
            config.user_agent = agent;
        }
        if let Some(raw) = lookup("SLIDER_DISABLE_DOWNLOADS") {
            match parse_flag(&raw) {
                Some(flag) => config.disable_downloads = flag,
                None => warn!(value = %raw, "Ignoring invalid SLIDER_DISABLE_DOWNLOADS"),
            }
        }
        if let Some(path) = lookup("SLIDER_CROP_TABLE").filter(|v| !v.is_empty()) {
            config.crop_table = Some(PathBuf::from(path));
        }

        config
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!(key = key, value = %raw, "Ignoring invalid timeout");
            None
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
