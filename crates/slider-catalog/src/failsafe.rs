//! Bundled catalog snapshot used when the live document is unavailable.

/// Date of the bundled snapshot.
pub const FAILSAFE_SNAPSHOT: &str = "2024-06-12";

/// Same wrapper and schema as the live document.
pub static FAILSAFE_DOCUMENT: &[u8] = include_bytes!("../data/failsafe.js");
