//! Harvest orchestration
//!
//! Listing pages are walked strictly in sequence, since each page's
//! continuation comes from the previous page. Within a page every item gets
//! its key before its detail fetch is spawned, detail fetches run on a
//! semaphore-bounded task set, and the page's tasks are all joined before
//! the next listing page is requested.
//!
//! Failures never escape: a failed detail fetch gives its item zero reviews,
//! a failed listing fetch ends the crawl with whatever was collected.

use crate::config::{Config, SiteConfig, MAX_DETAIL_CONCURRENCY};
use crate::crawler::detail::DetailFetcher;
use crate::crawler::extract::SelectorSet;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::listing::fetch_listing;
use crate::model::{HarvestResult, Item, ItemKey, ReviewFields, StopReason};
use crate::url::{listing_url, parse_base_url, resolve_link};
use crate::HarvestError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Crawls listing pages and their review pages
pub struct Harvester {
    client: Client,
    base_url: Url,
    site: SiteConfig,
    selectors: Arc<SelectorSet>,
    max_concurrency: usize,
}

impl Harvester {
    /// Creates a harvester from configuration with its own HTTP client
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.user_agent, &config.harvester)?;
        Self::with_client(config, client)
    }

    /// Creates a harvester that reuses an existing HTTP client
    pub fn with_client(config: &Config, client: Client) -> Result<Self, HarvestError> {
        let base_url = parse_base_url(&config.site.base_url)?;
        let selectors = SelectorSet::from_config(&config.selectors)?;

        Ok(Self {
            client,
            base_url,
            site: config.site.clone(),
            selectors: Arc::new(selectors),
            max_concurrency: config
                .harvester
                .max_concurrent_detail_fetches
                .clamp(1, MAX_DETAIL_CONCURRENCY),
        })
    }

    /// Overrides the detail fetch concurrency, clamped to `1..=100`
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.clamp(1, MAX_DETAIL_CONCURRENCY);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Harvests up to `max_pages` listing pages for `query`
    pub async fn harvest(&self, query: &str, max_pages: u32) -> HarvestResult {
        self.harvest_with_cancellation(query, max_pages, CancellationToken::new())
            .await
    }

    /// Harvests with cancellation support
    ///
    /// Once `cancel` fires, detail fetches already in flight are allowed to
    /// finish, no further listing page is requested, and everything gathered
    /// so far is returned.
    pub async fn harvest_with_cancellation(
        &self,
        query: &str,
        max_pages: u32,
        cancel: CancellationToken,
    ) -> HarvestResult {
        let start_time = Instant::now();
        let mut result = HarvestResult::new(query, max_pages);

        let mut current = match listing_url(&self.base_url, &self.site.listing_path_template, query)
        {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot build listing URL for '{}': {}", query, e);
                result.stop_reason = StopReason::ListingFailed;
                return result;
            }
        };

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let details = DetailFetcher::new(
            self.client.clone(),
            Arc::clone(&self.selectors),
            &self.site.detail_path_from,
            &self.site.detail_path_to,
        );

        for page_number in 1..=max_pages {
            if cancel.is_cancelled() {
                tracing::info!("Harvest cancelled before page {}", page_number);
                result.stop_reason = StopReason::Cancelled;
                break;
            }

            tracing::debug!("Fetching listing page {}: {}", page_number, current);
            let page = match fetch_listing(&self.client, current.as_str(), &self.selectors).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        "Listing page {} failed, keeping {} items collected so far: {}",
                        page_number,
                        result.items.len(),
                        e
                    );
                    result.stop_reason = StopReason::ListingFailed;
                    break;
                }
            };
            result.pages_traversed += 1;

            let mut tasks = JoinSet::new();
            for node in &page.items {
                let detail_link = match node.href.as_deref() {
                    Some(href) => match resolve_link(&self.base_url, href) {
                        Ok(url) => url.to_string(),
                        Err(e) => {
                            tracing::warn!("Skipping listing entry with bad link: {}", e);
                            continue;
                        }
                    },
                    None => {
                        tracing::warn!("Skipping listing entry without a link");
                        continue;
                    }
                };

                let fields = node.extract(&self.selectors);
                let item = Item {
                    id: ItemKey::new_v4(),
                    name: fields.name,
                    price: fields.price,
                    overall_rating: fields.overall_rating,
                    specification: fields.specification,
                    detail_link,
                };

                let item_id = item.id;
                let link = item.detail_link.clone();
                let details = details.clone();
                let semaphore = Arc::clone(&semaphore);
                tasks.spawn(async move {
                    // The semaphore is never closed
                    let _permit = semaphore.acquire_owned().await.ok();
                    (item_id, details.fetch_details(&link).await)
                });

                result.items.push(item);
            }

            // Entries without a usable link count as no items
            if page_number == 1 && result.items.is_empty() {
                tracing::info!("No items found for '{}'", query);
                result.stop_reason = StopReason::NoItems;
                break;
            }

            // Page barrier
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((item_id, reviews)) => collect_reviews(&mut result, item_id, reviews),
                    Err(e) => tracing::warn!("Detail fetch task failed: {}", e),
                }
            }

            tracing::info!(
                "Page {} done: {} items, {} reviews so far",
                page_number,
                result.items.len(),
                result.reviews.len()
            );

            let next = match page.next_page.as_deref() {
                Some(token) => token,
                None => {
                    tracing::debug!("No next page after page {}", page_number);
                    result.stop_reason = StopReason::NoNextPage;
                    break;
                }
            };

            match resolve_link(&self.base_url, next) {
                Ok(url) => current = url,
                Err(e) => {
                    tracing::warn!("Unusable next page link after page {}: {}", page_number, e);
                    result.stop_reason = StopReason::NoNextPage;
                    break;
                }
            }
        }

        if !result.items.is_empty() && result.reviews.is_empty() {
            tracing::warn!(
                "Collected {} items but no reviews; returning items anyway",
                result.items.len()
            );
        }

        tracing::info!(
            "Harvest of '{}' finished in {:?}: {} items, {} reviews, {}/{} pages ({})",
            query,
            start_time.elapsed(),
            result.items.len(),
            result.reviews.len(),
            result.pages_traversed,
            result.pages_requested,
            result.stop_reason.to_db_string()
        );

        result
    }
}

/// Tags one item's reviews with its key and appends them in page order
fn collect_reviews(result: &mut HarvestResult, item_id: ItemKey, reviews: Vec<ReviewFields>) {
    result
        .reviews
        .extend(reviews.into_iter().map(|fields| fields.tag(item_id)));
}
