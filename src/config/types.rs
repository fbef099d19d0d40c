use serde::{Deserialize, Serialize};

/// Legacy search template; the tracking parameters keep the site on its
/// trending-suggestion code path.
pub const DEFAULT_LISTING_PATH_TEMPLATE: &str = "/search?q={query}&as=on&as-show=on&otracker=AS_Query_TrendingAutoSuggest_8_0_na_na_na&otracker1=AS_Query_TrendingAutoSuggest_8_0_na_na_na&as-pos=8&as-type=TRENDING&suggestionId=tv&requestId=9c9fa553-b7e5-454b-a65b-bbb7a9c74a29&page=1";

/// Placeholder replaced by the URL-encoded search query
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Upper bound on concurrent detail fetches per listing page
pub const MAX_DETAIL_CONCURRENCY: usize = 100;

/// Main configuration structure for Review-Harvester
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub harvester: HarvesterConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub selectors: SelectorConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL every listing and detail link is resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path and query of the first listing page, containing `{query}`
    #[serde(rename = "listing-path-template")]
    pub listing_path_template: String,

    /// Path segment of a product link that is rewritten to reach reviews
    #[serde(rename = "detail-path-from")]
    pub detail_path_from: String,

    /// Replacement path segment routing to the review view
    #[serde(rename = "detail-path-to")]
    pub detail_path_to: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.flipkart.com".to_string(),
            listing_path_template: DEFAULT_LISTING_PATH_TEMPLATE.to_string(),
            detail_path_from: "/p/".to_string(),
            detail_path_to: "/product-reviews/".to_string(),
        }
    }
}

/// Harvester behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    /// Number of listing pages to traverse when the caller does not say
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Maximum number of detail pages fetched concurrently within one listing page
    #[serde(rename = "max-concurrent-detail-fetches")]
    pub max_concurrent_detail_fetches: usize,

    /// Total time allowed for one request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            max_pages: 1,
            max_concurrent_detail_fetches: MAX_DETAIL_CONCURRENCY,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub name: String,
    pub version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "ReviewHarvester".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file holding the current snapshot
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown report file
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./review_harvest.db".to_string(),
            summary_path: "./harvest_summary.md".to_string(),
        }
    }
}

/// An exact structural selector: tag name plus the full class attribute
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FieldSelector {
    pub tag: String,
    pub class: String,
}

impl FieldSelector {
    pub fn new(tag: &str, class: &str) -> Self {
        Self {
            tag: tag.to_string(),
            class: class.to_string(),
        }
    }

    /// CSS form matching the class attribute byte-for-byte
    pub fn to_css(&self) -> String {
        format!("{}[class=\"{}\"]", self.tag, self.class)
    }
}

/// Selector contract for the target site's markup, one entry per field
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    #[serde(rename = "listing-item")]
    pub listing_item: FieldSelector,

    #[serde(rename = "next-page")]
    pub next_page: FieldSelector,

    /// Text a next-page anchor must contain; empty accepts the first match
    #[serde(rename = "next-page-label")]
    pub next_page_label: String,

    #[serde(rename = "item-name")]
    pub item_name: FieldSelector,

    #[serde(rename = "item-price")]
    pub item_price: FieldSelector,

    #[serde(rename = "item-rating")]
    pub item_rating: FieldSelector,

    #[serde(rename = "item-spec-container")]
    pub item_spec_container: FieldSelector,

    #[serde(rename = "item-spec-entry")]
    pub item_spec_entry: FieldSelector,

    #[serde(rename = "review-node")]
    pub review_node: FieldSelector,

    #[serde(rename = "review-author")]
    pub review_author: FieldSelector,

    #[serde(rename = "review-rating")]
    pub review_rating: FieldSelector,

    #[serde(rename = "review-title")]
    pub review_title: FieldSelector,

    #[serde(rename = "review-body")]
    pub review_body: FieldSelector,

    /// Literal boilerplate removed from every review body
    #[serde(rename = "read-more-marker")]
    pub read_more_marker: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_item: FieldSelector::new("a", "_1fQZEK"),
            next_page: FieldSelector::new("a", "_1LKTO3"),
            next_page_label: "Next".to_string(),
            item_name: FieldSelector::new("div", "_4rR01T"),
            item_price: FieldSelector::new("div", "_30jeq3 _1_WHN1"),
            item_rating: FieldSelector::new("div", "_3LWZlK"),
            item_spec_container: FieldSelector::new("div", "fMghEO"),
            item_spec_entry: FieldSelector::new("li", "rgWa7D"),
            review_node: FieldSelector::new("div", "col _2wzgFH K0kLPL"),
            review_author: FieldSelector::new("p", "_2sc7ZR _2V5EHH"),
            review_rating: FieldSelector::new("div", "_3LWZlK _1BLPMq"),
            review_title: FieldSelector::new("p", "_2-N8zT"),
            review_body: FieldSelector::new("div", "t-ZTKy"),
            read_more_marker: "READ MORE".to_string(),
        }
    }
}

impl SelectorConfig {
    /// Every field selector paired with its config key
    pub fn entries(&self) -> [(&'static str, &FieldSelector); 12] {
        [
            ("listing-item", &self.listing_item),
            ("next-page", &self.next_page),
            ("item-name", &self.item_name),
            ("item-price", &self.item_price),
            ("item-rating", &self.item_rating),
            ("item-spec-container", &self.item_spec_container),
            ("item-spec-entry", &self.item_spec_entry),
            ("review-node", &self.review_node),
            ("review-author", &self.review_author),
            ("review-rating", &self.review_rating),
            ("review-title", &self.review_title),
            ("review-body", &self.review_body),
        ]
    }
}
