//! URL handling module for Review-Harvester
//!
//! This module builds listing URLs from the search template, resolves
//! relative links found in markup against the site base, and derives the
//! review-page URL of a product.

mod links;

pub use links::{listing_url, resolve_link, review_page_url};

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses the configured base URL, accepting only http(s)
pub fn parse_base_url(base_url: &str) -> UrlResult<Url> {
    let url = Url::parse(base_url).map_err(|e| UrlError::Parse(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}
