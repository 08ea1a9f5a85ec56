//! Typed records produced by the crawl stages
//!
//! `Category` and `ListingRecord` are the stage-file rows of the first two
//! stages. `BookRecord` is the canonical persisted entity; `StoredBook` pairs
//! it with the surrogate id assigned by a [`BookStore`](crate::storage::BookStore).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Product type used when the detail page table does not name one
pub const DEFAULT_PRODUCT_TYPE: &str = "Books";

/// Description used when no candidate paragraph is found
pub const DEFAULT_DESCRIPTION: &str = "No description available";

/// One entry of the catalog's category navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub url_absolute: String,
    pub url_relative: String,
}

/// Summary card scraped from a listing page
///
/// Fields hold the raw text; normalization happens in the detail stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub category: String,
    pub title: String,
    pub price_text: String,
    /// Full class attribute of the rating element, e.g. `"star-rating Three"`
    pub star_class: String,
    pub image_url: String,
    pub detail_url: String,
    pub availability_text: String,
}

/// Normalized detail-page record
///
/// Missing fields in stored JSON fall back to [`BookRecord::default`], so
/// older or hand-edited files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookRecord {
    /// Detail page URL, the natural key during a crawl
    pub url_page: String,
    pub category: String,
    pub title: String,
    /// Same source node as `title`
    pub full_title: String,
    pub price: f64,
    /// 0 (unrated) to 5
    pub star_rating: u8,
    pub review_count: u32,
    pub in_stock: bool,
    pub stock_quantity: u32,
    pub description: String,
    pub image_url: String,
    pub image_filename: String,
    pub image_alt: String,
    pub breadcrumb: Vec<String>,
    pub upc: String,
    pub product_type: String,
    pub tax: f64,
    /// Duplicate of `review_count`
    pub number_of_reviews: u32,
    /// Remaining product table cells keyed by canonical header
    pub attributes: BTreeMap<String, String>,
    /// `<key>_numerique` values for attribute keys containing "prix"
    pub derived_prices: BTreeMap<String, f64>,
}

impl Default for BookRecord {
    fn default() -> Self {
        Self {
            url_page: String::new(),
            category: String::new(),
            title: String::new(),
            full_title: String::new(),
            price: 0.0,
            star_rating: 0,
            review_count: 0,
            in_stock: false,
            stock_quantity: 0,
            description: String::new(),
            image_url: String::new(),
            image_filename: String::new(),
            image_alt: String::new(),
            breadcrumb: Vec::new(),
            upc: String::new(),
            product_type: DEFAULT_PRODUCT_TYPE.to_string(),
            tax: 0.0,
            number_of_reviews: 0,
            attributes: BTreeMap::new(),
            derived_prices: BTreeMap::new(),
        }
    }
}

/// A book together with its surrogate id
///
/// Serializes flat: `{"id": 3, "url_page": ..., "title": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBook {
    #[serde(default)]
    pub id: i64,
    #[serde(flatten)]
    pub book: BookRecord,
}

impl StoredBook {
    pub fn new(id: i64, book: BookRecord) -> Self {
        Self { id, book }
    }
}
