//! Error types for the slider-catalog crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while retrieving the live catalog document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while locating the JSON payload inside a script document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Catalog JSON start not found: no '{{' in document")]
    StartNotFound,

    #[error("Catalog JSON end not found: no '}};' in document")]
    EndNotFound,

    #[error("Catalog JSON end (offset {end}) precedes its start (offset {start})")]
    EndBeforeStart { start: usize, end: usize },
}

/// Primary error type for catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Failed to decode catalog JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid crop table {}: {message}", path.display())]
    CropTable { path: PathBuf, message: String },

    #[error("Fail-safe catalog unusable: {0}")]
    FailSafe(#[source] Box<CatalogError>),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
