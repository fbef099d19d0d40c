//! Detail (review) page fetching
//!
//! A product link is rewritten into its review-page URL, fetched, and every
//! review node on it is turned into a [`ReviewFields`]. Failures never leave
//! this module: they are logged and become an empty review list.

use crate::crawler::extract::{extract_field, extract_field_stripped, SelectorSet};
use crate::crawler::fetcher::fetch_page;
use crate::model::ReviewFields;
use crate::url::review_page_url;
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;

/// Fetches review pages; cheap to clone into worker tasks
#[derive(Debug, Clone)]
pub struct DetailFetcher {
    client: Client,
    selectors: Arc<SelectorSet>,
    path_from: Arc<str>,
    path_to: Arc<str>,
}

impl DetailFetcher {
    pub fn new(client: Client, selectors: Arc<SelectorSet>, path_from: &str, path_to: &str) -> Self {
        Self {
            client,
            selectors,
            path_from: Arc::from(path_from),
            path_to: Arc::from(path_to),
        }
    }

    /// The review-page URL for a product link
    pub fn review_url(&self, detail_link: &str) -> String {
        review_page_url(detail_link, &self.path_from, &self.path_to)
    }

    /// Fetches the reviews of one product
    ///
    /// Returns an empty list when the page cannot be fetched or carries no
    /// review nodes.
    pub async fn fetch_details(&self, detail_link: &str) -> Vec<ReviewFields> {
        let url = self.review_url(detail_link);

        match fetch_page(&self.client, &url).await {
            Ok(body) => {
                let reviews = parse_reviews(&body, &self.selectors);
                tracing::debug!("Found {} reviews at {}", reviews.len(), url);
                reviews
            }
            Err(e) => {
                tracing::warn!("Failed to fetch reviews from {}: {}", url, e);
                Vec::new()
            }
        }
    }
}

/// Parses every review node of a review page, in document order
pub fn parse_reviews(body: &str, selectors: &SelectorSet) -> Vec<ReviewFields> {
    let document = Html::parse_document(body);

    document
        .select(&selectors.review_node)
        .map(|node| ReviewFields {
            author: extract_field(node, &selectors.review_author),
            rating: extract_field(node, &selectors.review_rating),
            title: extract_field(node, &selectors.review_title),
            body: extract_field_stripped(
                node,
                &selectors.review_body,
                &selectors.read_more_marker,
            ),
        })
        .collect()
}
