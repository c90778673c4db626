//! Remote store configuration.
//!
//! The Apps Script endpoint is an explicit value injected at adapter
//! construction. Nothing in this crate reads ambient storage per call;
//! the embedding application owns where the URL comes from.

use serde::{Deserialize, Serialize};

/// Configuration for the spreadsheet-backed store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Full URL of the deployed Apps Script web app (`.../exec`).
    pub script_url: String,
}

impl StoreConfig {
    /// Build a config from a raw, possibly messy URL string.
    pub fn new(script_url: &str) -> Self {
        StoreConfig {
            script_url: normalize_script_url(script_url),
        }
    }
}

/// Normalise the script endpoint URL:
/// - strip surrounding whitespace
/// - ensure a scheme is present (https, or http for localhost)
/// - strip trailing slashes
pub fn normalize_script_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    // Ensure scheme
    if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    // Strip trailing slashes
    while url.ends_with('/') {
        url.pop();
    }

    url
}

// ===========================================================================
// Tests
// ===========================================================================
