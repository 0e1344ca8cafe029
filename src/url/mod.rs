//! URL handling module for Driftnet
//!
//! This module provides URL canonicalization, host and superdomain
//! extraction, and the file-extension blacklist check used by the frontier.
//! None of these functions fail: malformed input degrades to an unchanged
//! string or an empty host, and later stages reject what cannot be crawled.

mod domain;
mod extension;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, host_of, superdomain_of};
pub use extension::has_disallowed_extension;
pub use normalize::canonicalize;

/// Returns the path component of a URL string
///
/// Unparseable input is returned whole, so extension checks still see its
/// suffix.
pub fn path_of(url_str: &str) -> String {
    match ::url::Url::parse(url_str) {
        Ok(url) => url.path().to_string(),
        Err(_) => url_str.to_string(),
    }
}
