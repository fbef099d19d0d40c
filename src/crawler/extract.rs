//! Field extraction from semi-structured markup
//!
//! A field is located by an exact selector (tag plus full class attribute).
//! A selector that matches nothing yields `None`; absence is data here,
//! never an error.

use crate::config::{FieldSelector, SelectorConfig};
use crate::model::SENTINEL;
use crate::ConfigError;
use scraper::{ElementRef, Selector};

/// The selector table compiled once per harvester
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub listing_item: Selector,
    pub next_page: Selector,
    pub next_page_label: String,
    pub item_name: Selector,
    pub item_price: Selector,
    pub item_rating: Selector,
    pub item_spec_container: Selector,
    pub item_spec_entry: Selector,
    pub review_node: Selector,
    pub review_author: Selector,
    pub review_rating: Selector,
    pub review_title: Selector,
    pub review_body: Selector,
    pub read_more_marker: String,
}

impl SelectorSet {
    /// Compiles every entry of the configured selector table
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            listing_item: compile("listing-item", &config.listing_item)?,
            next_page: compile("next-page", &config.next_page)?,
            next_page_label: config.next_page_label.clone(),
            item_name: compile("item-name", &config.item_name)?,
            item_price: compile("item-price", &config.item_price)?,
            item_rating: compile("item-rating", &config.item_rating)?,
            item_spec_container: compile("item-spec-container", &config.item_spec_container)?,
            item_spec_entry: compile("item-spec-entry", &config.item_spec_entry)?,
            review_node: compile("review-node", &config.review_node)?,
            review_author: compile("review-author", &config.review_author)?,
            review_rating: compile("review-rating", &config.review_rating)?,
            review_title: compile("review-title", &config.review_title)?,
            review_body: compile("review-body", &config.review_body)?,
            read_more_marker: config.read_more_marker.clone(),
        })
    }
}

/// Compiles one field selector into its exact CSS form
pub fn compile(field: &str, selector: &FieldSelector) -> Result<Selector, ConfigError> {
    Selector::parse(&selector.to_css()).map_err(|e| ConfigError::InvalidSelector {
        field: field.to_string(),
        message: format!("{:?}", e),
    })
}

/// Collapses every whitespace run to a single space and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content of the first descendant matching `selector`
pub fn extract_field(node: ElementRef<'_>, selector: &Selector) -> Option<String> {
    node.select(selector)
        .next()
        .map(|element| normalize_whitespace(&element.text().collect::<String>()))
}

/// Like [`extract_field`], but renders absence as the `"NA"` sentinel
pub fn extract(node: ElementRef<'_>, selector: &Selector) -> String {
    extract_field(node, selector).unwrap_or_else(|| SENTINEL.to_string())
}

/// Text content of every descendant matching `selector`, in document order
pub fn extract_all(node: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    node.select(selector)
        .map(|element| normalize_whitespace(&element.text().collect::<String>()))
        .collect()
}

/// Like [`extract_field`], removing every occurrence of `marker` before
/// whitespace is normalized
pub fn extract_field_stripped(
    node: ElementRef<'_>,
    selector: &Selector,
    marker: &str,
) -> Option<String> {
    node.select(selector).next().map(|element| {
        let raw: String = element.text().collect();
        normalize_whitespace(&raw.replace(marker, ""))
    })
}
