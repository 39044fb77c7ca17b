//! API key credential lookup
//!
//! The key is read from the TREEHERDER_API_KEY environment variable and passed
//! through to the server unchanged. It is never written to disk.

use std::env;

pub const API_KEY_ENV: &str = "TREEHERDER_API_KEY";

/// Get the API key from environment variable
///
/// Returns the value of TREEHERDER_API_KEY if set and non-empty, otherwise None.
pub fn get_api_key() -> Option<String> {
    env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())
}

/// Check if an API key is configured
pub fn has_api_key() -> bool {
    get_api_key().is_some()
}
