//! Listing (search-results) page parsing
//!
//! A listing page yields the item anchors in document order and at most one
//! next-page token. Item nodes are kept as owned markup so they can cross
//! await points; fields are extracted from them on demand.

use crate::crawler::extract::{extract_all, extract_field, normalize_whitespace, SelectorSet};
use crate::crawler::fetcher::fetch_page;
use crate::HarvestError;
use reqwest::Client;
use scraper::Html;

/// One item anchor lifted out of a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemNode {
    /// Outer HTML of the anchor
    pub html: String,
    /// Raw `href` of the anchor, unresolved
    pub href: Option<String>,
}

/// Display fields of one listing entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFields {
    pub name: Option<String>,
    pub price: Option<String>,
    pub overall_rating: Option<String>,
    pub specification: Vec<String>,
}

impl ItemNode {
    /// Extracts the display fields of this entry
    ///
    /// Specification bullets are only looked up inside the specification
    /// container; a missing container gives an empty list.
    pub fn extract(&self, selectors: &SelectorSet) -> ItemFields {
        let fragment = Html::parse_fragment(&self.html);
        let node = fragment.root_element();

        let specification = node
            .select(&selectors.item_spec_container)
            .next()
            .map(|container| extract_all(container, &selectors.item_spec_entry))
            .unwrap_or_default();

        ItemFields {
            name: extract_field(node, &selectors.item_name),
            price: extract_field(node, &selectors.item_price),
            overall_rating: extract_field(node, &selectors.item_rating),
            specification,
        }
    }
}

/// A parsed listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub items: Vec<ItemNode>,
    /// Relative or absolute link to the following page
    pub next_page: Option<String>,
}

/// Parses a listing page body
pub fn parse_listing(body: &str, selectors: &SelectorSet) -> ListingPage {
    let document = Html::parse_document(body);

    let items = document
        .select(&selectors.listing_item)
        .map(|element| ItemNode {
            html: element.html(),
            href: element.value().attr("href").map(str::to_string),
        })
        .collect();

    let next_page = document
        .select(&selectors.next_page)
        .filter(|anchor| {
            selectors.next_page_label.is_empty()
                || normalize_whitespace(&anchor.text().collect::<String>())
                    .contains(selectors.next_page_label.as_str())
        })
        .find_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string);

    ListingPage { items, next_page }
}

/// Fetches and parses one listing page
///
/// Any failure, including a non-success status, is returned to the caller,
/// which treats the page as the end of the crawl.
pub async fn fetch_listing(
    client: &Client,
    url: &str,
    selectors: &SelectorSet,
) -> Result<ListingPage, HarvestError> {
    let body = fetch_page(client, url).await?;
    let page = parse_listing(&body, selectors);

    tracing::debug!(
        "Listing {} has {} items (next page: {})",
        url,
        page.items.len(),
        page.next_page.as_deref().unwrap_or("none")
    );

    Ok(page)
}
