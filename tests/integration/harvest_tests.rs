//! Integration tests for the harvester
//!
//! These tests use wiremock to stand up a mock listing site and drive the
//! full harvest cycle end-to-end, including storing and reading back the
//! snapshot.

use review_harvester::config::Config;
use review_harvester::crawler::{harvest, Harvester};
use review_harvester::model::{HarvestResult, JoinedReview, StopReason};
use review_harvester::output::joined_to_json;
use review_harvester::storage::{SnapshotStore, SqliteStorage};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct ListingEntry<'a> {
    slug: &'a str,
    name: &'a str,
    price: Option<&'a str>,
}

fn entry<'a>(slug: &'a str, name: &'a str, price: Option<&'a str>) -> ListingEntry<'a> {
    ListingEntry { slug, name, price }
}

/// Renders a listing page in the site's markup
fn listing_html(entries: &[ListingEntry], next_page: Option<u32>) -> String {
    let mut html = String::from("<html><body>");
    for e in entries {
        html.push_str(&format!(
            r#"<a class="_1fQZEK" href="/{}/p/itm"><div class="_4rR01T">{}</div><div class="_3LWZlK">4.2</div>"#,
            e.slug, e.name
        ));
        if let Some(price) = e.price {
            html.push_str(&format!(r#"<div class="_30jeq3 _1_WHN1">{}</div>"#, price));
        }
        html.push_str(r#"<div class="fMghEO"><ul><li class="rgWa7D">Full HD</li></ul></div></a>"#);
    }
    if let Some(page) = next_page {
        html.push_str(&format!(
            r#"<a class="_1LKTO3" href="/search?q=tv&amp;page={}"><span>Next</span></a>"#,
            page
        ));
    }
    html.push_str("</body></html>");
    html
}

/// Renders a review page with one review per title
fn reviews_html(titles: &[&str]) -> String {
    let mut html = String::from("<html><body>");
    for title in titles {
        html.push_str(&format!(
            r#"<div class="col _2wzgFH K0kLPL">
                 <div class="_3LWZlK _1BLPMq">4</div>
                 <p class="_2-N8zT">{}</p>
                 <div class="t-ZTKy"><div>Body of {}<span>READ MORE</span></div></div>
                 <p class="_2sc7ZR _2V5EHH">Reviewer</p>
               </div>"#,
            title, title
        ));
    }
    html.push_str("</body></html>");
    html
}

async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_reviews(server: &MockServer, slug: &str, titles: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/product-reviews/itm", slug)))
        .respond_with(ResponseTemplate::new(200).set_body_string(reviews_html(titles)))
        .mount(server)
        .await;
}

async fn mount_slow_reviews(server: &MockServer, slug: &str, titles: &[&str], delay: Duration) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/product-reviews/itm", slug)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(reviews_html(titles))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.site.base_url = server.uri();
    config.site.listing_path_template = "/search?q={query}&page=1".to_string();
    config.harvester.request_timeout_secs = 5;
    config
}

/// Two listing pages: a and b on page 1, c on page 2
async fn two_page_site() -> MockServer {
    let server = MockServer::start().await;

    mount_listing(
        &server,
        1,
        listing_html(
            &[
                entry("a", "Alpha TV", Some("₹10,999")),
                entry("b", "Beta TV", Some("₹12,499")),
            ],
            Some(2),
        ),
    )
    .await;
    mount_listing(
        &server,
        2,
        listing_html(&[entry("c", "Gamma TV", Some("₹8,999"))], None),
    )
    .await;

    mount_reviews(&server, "a", &["a1", "a2", "a3"]).await;
    mount_reviews(&server, "b", &["b1"]).await;
    mount_reviews(&server, "c", &[]).await;

    server
}

fn names(result: &HarvestResult) -> Vec<String> {
    result
        .items
        .iter()
        .map(|i| i.name.clone().unwrap_or_default())
        .collect()
}

fn review_titles(result: &HarvestResult, index: usize) -> Vec<String> {
    result
        .reviews_for(result.items[index].id)
        .map(|r| r.title.clone().unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn test_full_harvest_two_pages() {
    let server = two_page_site().await;
    let harvester = Harvester::new(&test_config(&server)).unwrap();

    let result = harvester.harvest("tv", 5).await;

    assert_eq!(names(&result), vec!["Alpha TV", "Beta TV", "Gamma TV"]);
    assert_eq!(result.reviews.len(), 4);
    assert_eq!(result.pages_traversed, 2);
    assert_eq!(result.stop_reason, StopReason::NoNextPage);

    assert_eq!(review_titles(&result, 0), vec!["a1", "a2", "a3"]);
    assert_eq!(review_titles(&result, 1), vec!["b1"]);
    assert!(review_titles(&result, 2).is_empty());

    let first_review = result.reviews_for(result.items[0].id).next().unwrap();
    assert_eq!(first_review.body.as_deref(), Some("Body of a1"));
    assert_eq!(first_review.author.as_deref(), Some("Reviewer"));
    assert_eq!(result.items[0].specification, vec!["Full HD"]);
    assert!(result.items[0].detail_link.ends_with("/a/p/itm"));
}

#[tokio::test]
async fn test_item_keys_unique_and_reviews_reference_items() {
    let server = two_page_site().await;
    let harvester = Harvester::new(&test_config(&server)).unwrap();

    let result = harvester.harvest("tv", 5).await;

    let keys: HashSet<_> = result.items.iter().map(|i| i.id).collect();
    assert_eq!(keys.len(), result.items.len());
    assert!(result.orphan_reviews().is_empty());
}

#[tokio::test]
async fn test_store_and_read_joined() {
    let server = two_page_site().await;
    let harvester = Harvester::new(&test_config(&server)).unwrap();
    let result = harvester.harvest("tv", 5).await;

    let dir = tempfile::tempdir().unwrap();
    let mut storage = SqliteStorage::new(&dir.path().join("harvest.db")).unwrap();
    storage.replace_and_store(&result).unwrap();

    let joined = storage.read_joined().unwrap();
    assert_eq!(joined.len(), result.items.len());
    assert_eq!(
        joined.iter().map(|i| i.reviews.len()).sum::<usize>(),
        result.reviews.len()
    );

    for (stored, harvested) in joined.iter().zip(&result.items) {
        assert_eq!(stored.name, harvested.name);
        assert_eq!(stored.price, harvested.price);
        assert_eq!(stored.overall_rating, harvested.overall_rating);
        assert_eq!(stored.specification, harvested.specification);
        assert_eq!(stored.detail_link, harvested.detail_link);
        let expected: Vec<JoinedReview> = result
            .reviews_for(harvested.id)
            .map(|r| JoinedReview::from(r.fields()))
            .collect();
        assert_eq!(stored.reviews, expected);
    }

    let json = joined_to_json(&joined).unwrap();
    for key in result.items.iter().map(|i| i.id.to_string()) {
        assert!(!json.contains(&key));
    }
    assert!(!json.contains("item_key"));
    assert!(!json.contains("item_id"));
}

#[tokio::test]
async fn test_page_limit_stops_before_next_page() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        1,
        listing_html(&[entry("a", "Alpha TV", Some("₹10,999"))], Some(2)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[], None)))
        .expect(0)
        .mount(&server)
        .await;
    mount_reviews(&server, "a", &["a1"]).await;

    // max-pages defaults to 1
    let result = harvest(&test_config(&server), "tv").await.unwrap();

    assert_eq!(result.items.len(), 1);
    assert_eq!(result.pages_traversed, 1);
    assert_eq!(result.stop_reason, StopReason::PageLimit);
}

#[tokio::test]
async fn test_missing_next_anchor_stops() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        1,
        listing_html(&[entry("a", "Alpha TV", Some("₹10,999"))], None),
    )
    .await;
    mount_reviews(&server, "a", &[]).await;

    let harvester = Harvester::new(&test_config(&server)).unwrap();
    let result = harvester.harvest("tv", 10).await;

    assert_eq!(result.items.len(), 1);
    assert_eq!(result.pages_traversed, 1);
    assert_eq!(result.stop_reason, StopReason::NoNextPage);
}

#[tokio::test]
async fn test_missing_price_is_absent_and_rendered_as_sentinel() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, listing_html(&[entry("a", "Alpha TV", None)], None)).await;
    mount_reviews(&server, "a", &["a1"]).await;

    let harvester = Harvester::new(&test_config(&server)).unwrap();
    let result = harvester.harvest("tv", 1).await;

    assert_eq!(result.items[0].price, None);
    assert_eq!(result.items[0].name.as_deref(), Some("Alpha TV"));

    let mut storage = SqliteStorage::new_in_memory().unwrap();
    storage.replace_and_store(&result).unwrap();
    let json = joined_to_json(&storage.read_joined().unwrap()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["price"], "NA");
    assert_eq!(value[0]["name"], "Alpha TV");
}

#[tokio::test]
async fn test_detail_failure_gives_item_zero_reviews() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        1,
        listing_html(
            &[
                entry("a", "Alpha TV", Some("₹10,999")),
                entry("b", "Beta TV", Some("₹12,499")),
            ],
            None,
        ),
    )
    .await;
    mount_reviews(&server, "a", &["a1", "a2"]).await;
    Mock::given(method("GET"))
        .and(path("/b/product-reviews/itm"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let harvester = Harvester::new(&test_config(&server)).unwrap();
    let result = harvester.harvest("tv", 1).await;

    assert_eq!(result.items.len(), 2);
    assert_eq!(review_titles(&result, 0), vec!["a1", "a2"]);
    assert!(review_titles(&result, 1).is_empty());
}

#[tokio::test]
async fn test_concurrency_does_not_change_content() {
    let server = two_page_site().await;
    let config = test_config(&server);

    let sequential = Harvester::new(&config)
        .unwrap()
        .with_concurrency(1)
        .harvest("tv", 5)
        .await;
    let parallel = Harvester::new(&config)
        .unwrap()
        .with_concurrency(100)
        .harvest("tv", 5)
        .await;

    assert_eq!(names(&sequential), names(&parallel));
    for index in 0..sequential.items.len() {
        assert_eq!(
            review_titles(&sequential, index),
            review_titles(&parallel, index)
        );
    }
    assert_eq!(sequential.reviews.len(), parallel.reviews.len());
}

#[tokio::test]
async fn test_listing_failure_keeps_earlier_pages() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        1,
        listing_html(&[entry("a", "Alpha TV", Some("₹10,999"))], Some(2)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_reviews(&server, "a", &["a1"]).await;

    let harvester = Harvester::new(&test_config(&server)).unwrap();
    let result = harvester.harvest("tv", 3).await;

    assert_eq!(names(&result), vec!["Alpha TV"]);
    assert_eq!(result.reviews.len(), 1);
    assert_eq!(result.pages_traversed, 1);
    assert_eq!(result.stop_reason, StopReason::ListingFailed);
}

#[tokio::test]
async fn test_empty_first_page_is_no_data() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, listing_html(&[], Some(2))).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[], None)))
        .expect(0)
        .mount(&server)
        .await;

    let harvester = Harvester::new(&test_config(&server)).unwrap();
    let result = harvester.harvest("tv", 3).await;

    assert!(result.is_empty());
    assert!(result.reviews.is_empty());
    assert_eq!(result.stop_reason, StopReason::NoItems);
}

#[tokio::test]
async fn test_empty_later_page_follows_next_link() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        1,
        listing_html(&[entry("a", "Alpha TV", Some("₹10,999"))], Some(2)),
    )
    .await;
    mount_listing(&server, 2, listing_html(&[], Some(3))).await;
    mount_listing(
        &server,
        3,
        listing_html(&[entry("c", "Gamma TV", Some("₹8,999"))], None),
    )
    .await;
    mount_reviews(&server, "a", &[]).await;
    mount_reviews(&server, "c", &[]).await;

    let harvester = Harvester::new(&test_config(&server)).unwrap();
    let result = harvester.harvest("tv", 5).await;

    assert_eq!(names(&result), vec!["Alpha TV", "Gamma TV"]);
    assert_eq!(result.pages_traversed, 3);
}

#[tokio::test]
async fn test_query_is_url_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "smart tv & more"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_html(&[entry("a", "Alpha TV", None)], None)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_reviews(&server, "a", &[]).await;

    let harvester = Harvester::new(&test_config(&server)).unwrap();
    let result = harvester.harvest("smart tv & more", 1).await;

    assert_eq!(result.items.len(), 1);
}

#[tokio::test]
async fn test_second_harvest_replaces_snapshot() {
    let server = two_page_site().await;
    let harvester = Harvester::new(&test_config(&server)).unwrap();
    let mut storage = SqliteStorage::new_in_memory().unwrap();

    let first = harvester.harvest("tv", 5).await;
    storage.replace_and_store(&first).unwrap();
    let second = harvester.harvest("tv", 1).await;
    storage.replace_and_store(&second).unwrap();

    let joined = storage.read_joined().unwrap();
    assert_eq!(joined.len(), 2);
    assert_eq!(storage.count_reviews().unwrap(), 4);
    let info = storage.snapshot_info().unwrap().unwrap();
    assert_eq!(info.pages_requested, 1);
    assert_eq!(info.stop_reason, StopReason::PageLimit);
}

#[tokio::test]
async fn test_first_page_without_usable_links_is_no_data() {
    let server = MockServer::start().await;
    let body = r#"<html><body>
        <a class="_1fQZEK"><div class="_4rR01T">No link</div></a>
        <a class="_1fQZEK" href="javascript:void(0)"><div class="_4rR01T">Script link</div></a>
        <a class="_1LKTO3" href="/search?q=tv&amp;page=2"><span>Next</span></a>
    </body></html>"#;
    mount_listing(&server, 1, body.to_string()).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[], None)))
        .expect(0)
        .mount(&server)
        .await;

    let harvester = Harvester::new(&test_config(&server)).unwrap();
    let result = harvester.harvest("tv", 3).await;

    assert!(result.is_empty());
    assert_eq!(result.pages_traversed, 1);
    assert_eq!(result.stop_reason, StopReason::NoItems);
}

#[tokio::test]
async fn test_cancel_mid_run_keeps_in_flight_page() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        1,
        listing_html(
            &[
                entry("a", "Alpha TV", Some("₹10,999")),
                entry("b", "Beta TV", Some("₹12,499")),
            ],
            Some(2),
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_html(&[entry("c", "Gamma TV", None)], None)),
        )
        .expect(0)
        .mount(&server)
        .await;
    let delay = Duration::from_millis(500);
    mount_slow_reviews(&server, "a", &["a1", "a2"], delay).await;
    mount_slow_reviews(&server, "b", &["b1", "b2"], delay).await;

    let harvester = Harvester::new(&test_config(&server)).unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        trigger.cancel();
    });

    let result = harvester.harvest_with_cancellation("tv", 3, cancel).await;

    assert_eq!(result.stop_reason, StopReason::Cancelled);
    assert_eq!(result.pages_traversed, 1);
    assert_eq!(names(&result), vec!["Alpha TV", "Beta TV"]);
    assert_eq!(review_titles(&result, 0), vec!["a1", "a2"]);
    assert_eq!(review_titles(&result, 1), vec!["b1", "b2"]);
}

#[tokio::test]
async fn test_concurrency_limit_bounds_parallel_fetches() {
    let server = MockServer::start().await;
    let slugs = ["a", "b", "c", "d"];
    let entries: Vec<_> = slugs.iter().map(|slug| entry(slug, slug, None)).collect();
    mount_listing(&server, 1, listing_html(&entries, None)).await;
    let delay = Duration::from_millis(300);
    for slug in slugs {
        mount_slow_reviews(&server, slug, &["r"], delay).await;
    }
    let config = test_config(&server);

    let start = Instant::now();
    let sequential = Harvester::new(&config)
        .unwrap()
        .with_concurrency(1)
        .harvest("tv", 1)
        .await;
    let sequential_elapsed = start.elapsed();

    let start = Instant::now();
    let parallel = Harvester::new(&config)
        .unwrap()
        .with_concurrency(slugs.len())
        .harvest("tv", 1)
        .await;
    let parallel_elapsed = start.elapsed();

    assert_eq!(sequential.reviews.len(), 4);
    assert_eq!(parallel.reviews.len(), 4);
    // One permit serializes the four fetches
    assert!(
        sequential_elapsed >= delay * 4,
        "sequential run took {:?}",
        sequential_elapsed
    );
    assert!(
        parallel_elapsed < delay * 3,
        "parallel run took {:?}",
        parallel_elapsed
    );
}
