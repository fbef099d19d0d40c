use crate::config::QUERY_PLACEHOLDER;
use crate::{UrlError, UrlResult};
use url::form_urlencoded;
use url::Url;

/// Builds the first listing URL for a search query
///
/// The query is form-encoded and substituted for `{query}` in the template;
/// the rest of the template is kept verbatim.
///
/// # Example
///
/// ```
/// use review_harvester::url::listing_url;
/// use url::Url;
///
/// let base = Url::parse("https://shop.example.com").unwrap();
/// let url = listing_url(&base, "/search?q={query}&page=1", "smart tv").unwrap();
/// assert_eq!(url.as_str(), "https://shop.example.com/search?q=smart+tv&page=1");
/// ```
pub fn listing_url(base: &Url, template: &str, query: &str) -> UrlResult<Url> {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    let path = template.replace(QUERY_PLACEHOLDER, &encoded);

    base.join(&path).map_err(|e| UrlError::Parse(e.to_string()))
}

/// Resolves an href taken from markup to an absolute http(s) URL
///
/// Returns an error for empty hrefs, script/mail/tel/data schemes and
/// fragment-only anchors, none of which can lead to another listing or
/// product page.
pub fn resolve_link(base: &Url, href: &str) -> UrlResult<Url> {
    let href = href.trim();

    let unresolvable = || UrlError::Unresolvable {
        href: href.to_string(),
        base: base.to_string(),
    };

    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return Err(unresolvable());
    }

    let absolute = base.join(href).map_err(|_| unresolvable())?;

    match absolute.scheme() {
        "http" | "https" => Ok(absolute),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}

/// Rewrites a product link into its review-page URL
///
/// Plain substring substitution of every occurrence; the site routes
/// `/p/` product paths to `/product-reviews/` review listings.
pub fn review_page_url(detail_link: &str, from: &str, to: &str) -> String {
    detail_link.replace(from, to)
}
