//! Crawler module for listing and review harvesting
//!
//! This module contains the core crawling logic, including:
//! - Exact-selector field extraction
//! - HTTP fetching
//! - Listing page parsing and pagination tokens
//! - Review page fan-out
//! - Overall harvest coordination

mod detail;
mod extract;
mod fetcher;
mod harvester;
mod listing;

pub use detail::{parse_reviews, DetailFetcher};
pub use extract::{
    extract, extract_all, extract_field, extract_field_stripped, normalize_whitespace,
    SelectorSet,
};
pub use fetcher::{build_http_client, fetch_page};
pub use harvester::Harvester;
pub use listing::{fetch_listing, parse_listing, ItemFields, ItemNode, ListingPage};

use crate::config::Config;
use crate::model::HarvestResult;
use crate::HarvestError;

/// Runs a complete harvest with the configured page count
///
/// # Example
///
/// ```no_run
/// use review_harvester::config::Config;
/// use review_harvester::crawler::harvest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let result = harvest(&Config::default(), "tv").await?;
/// println!("{} items, {} reviews", result.items.len(), result.reviews.len());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: &Config, query: &str) -> Result<HarvestResult, HarvestError> {
    let harvester = Harvester::new(config)?;
    Ok(harvester.harvest(query, config.harvester.max_pages).await)
}
