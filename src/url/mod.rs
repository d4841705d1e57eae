//! URL handling module for Site-Harvester
//!
//! This module provides address validation, link resolution and fragment
//! stripping, and the network-location extraction used for same-domain
//! comparison.

mod domain;
mod normalize;

use ::url::Url;

// Re-export main functions
pub use domain::domain_of;
pub use normalize::{canonical_url, normalize_url};

/// Returns true if `candidate` is an absolute `http`/`https` URL with a host
///
/// Malformed input never panics; it simply yields `false`.
///
/// # Examples
///
/// ```
/// use site_harvester::url::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/page"));
/// assert!(!is_valid_url("not-a-url"));
/// assert!(!is_valid_url("ftp://example.com/file"));
/// ```
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate.trim()) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().map_or(false, |host| !host.is_empty())
        }
        Err(_) => false,
    }
}
