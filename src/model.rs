//! Harvest records and the joined read view
//!
//! Absent fields are `None` throughout; the legacy `"NA"` sentinel only
//! appears when a record is rendered or serialized for the outside world.

use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Placeholder written wherever a field could not be extracted
pub const SENTINEL: &str = "NA";

/// Synthetic key correlating an item with its reviews within one run
pub type ItemKey = Uuid;

/// One product listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemKey,
    pub name: Option<String>,
    pub price: Option<String>,
    pub overall_rating: Option<String>,
    pub specification: Vec<String>,
    pub detail_link: String,
}

/// Review fields as extracted from a detail page, before correlation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFields {
    pub author: Option<String>,
    pub rating: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl ReviewFields {
    /// Attaches the parent item's key
    pub fn tag(self, item_id: ItemKey) -> Review {
        Review {
            item_id,
            author: self.author,
            rating: self.rating,
            title: self.title,
            body: self.body,
        }
    }
}

/// One review attached to an item of the same run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub item_id: ItemKey,
    pub author: Option<String>,
    pub rating: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl Review {
    /// The review's content without its correlation key
    pub fn fields(&self) -> ReviewFields {
        ReviewFields {
            author: self.author.clone(),
            rating: self.rating.clone(),
            title: self.title.clone(),
            body: self.body.clone(),
        }
    }
}

/// Why a harvest run stopped traversing listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The requested number of pages was traversed
    PageLimit,
    /// The last page carried no usable next-page link
    NoNextPage,
    /// The first listing page contained no items
    NoItems,
    /// A listing page could not be fetched
    ListingFailed,
    /// The caller cancelled the run
    Cancelled,
}

impl StopReason {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::PageLimit => "page_limit",
            Self::NoNextPage => "no_next_page",
            Self::NoItems => "no_items",
            Self::ListingFailed => "listing_failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "page_limit" => Some(Self::PageLimit),
            "no_next_page" => Some(Self::NoNextPage),
            "no_items" => Some(Self::NoItems),
            "listing_failed" => Some(Self::ListingFailed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Everything one harvest run produced
#[derive(Debug, Clone)]
pub struct HarvestResult {
    pub query: String,
    /// Items in encounter order: page order, then listing order
    pub items: Vec<Item>,
    /// Reviews in completion order; per-item order is preserved
    pub reviews: Vec<Review>,
    pub pages_requested: u32,
    pub pages_traversed: u32,
    pub stop_reason: StopReason,
}

impl HarvestResult {
    pub fn new(query: &str, pages_requested: u32) -> Self {
        Self {
            query: query.to_string(),
            items: Vec::new(),
            reviews: Vec::new(),
            pages_requested,
            pages_traversed: 0,
            stop_reason: StopReason::PageLimit,
        }
    }

    /// True when nothing was found at all
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reviews belonging to one item, in detail-page order
    pub fn reviews_for(&self, item_id: ItemKey) -> impl Iterator<Item = &Review> {
        self.reviews.iter().filter(move |r| r.item_id == item_id)
    }

    /// Reviews whose key matches no item of this result
    pub fn orphan_reviews(&self) -> Vec<&Review> {
        self.reviews
            .iter()
            .filter(|r| !self.items.iter().any(|i| i.id == r.item_id))
            .collect()
    }
}

/// One review as exposed by the joined view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedReview {
    #[serde(serialize_with = "or_sentinel")]
    pub author: Option<String>,
    #[serde(serialize_with = "or_sentinel")]
    pub rating: Option<String>,
    #[serde(serialize_with = "or_sentinel")]
    pub title: Option<String>,
    #[serde(serialize_with = "or_sentinel")]
    pub body: Option<String>,
}

impl From<ReviewFields> for JoinedReview {
    fn from(fields: ReviewFields) -> Self {
        Self {
            author: fields.author,
            rating: fields.rating,
            title: fields.title,
            body: fields.body,
        }
    }
}

/// One item with its reviews nested, internal keys stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedItem {
    #[serde(serialize_with = "or_sentinel")]
    pub name: Option<String>,
    #[serde(serialize_with = "or_sentinel")]
    pub price: Option<String>,
    #[serde(serialize_with = "or_sentinel")]
    pub overall_rating: Option<String>,
    pub specification: Vec<String>,
    pub detail_link: String,
    pub reviews: Vec<JoinedReview>,
}

/// Renders an optional field, substituting the sentinel
pub fn display_field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(SENTINEL)
}

fn or_sentinel<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(display_field(value))
}
