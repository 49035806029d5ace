//! URL handling module for Deep-Crawl
//!
//! This module provides URL normalization, domain extraction, domain and glob
//! matching, and content type inference.

mod content_type;
mod domain;
mod matcher;
mod normalize;

pub use content_type::{content_type_matches, infer_content_type, DEFAULT_CONTENT_TYPE};
pub use domain::{domain_ancestors, extract_domain, is_same_or_subdomain};
pub use matcher::{matches_wildcard, GlobPattern};
pub use normalize::normalize_url;

use ::url::Url;

/// Counts the non-empty path segments of a URL
///
/// `https://example.com/` has depth 0, `https://example.com/a/b/` has depth 2.
pub fn path_depth(url: &Url) -> usize {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).count())
        .unwrap_or(0)
}
