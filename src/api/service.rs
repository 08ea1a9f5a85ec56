//! Request validation and search filtering
//!
//! Handlers stay thin; the rules that decide between 400 and a store call
//! live here.

use crate::api::error::{ApiError, ApiResult};
use crate::records::{BookRecord, StoredBook};
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

/// Optional filters for `GET /books/search`
///
/// Filters combine; each one narrows the result of the previous. A filter
/// sent blank (`?price_min=`) is the same as one left out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilters {
    /// Case-insensitive title substring
    pub title: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub price_min: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub price_max: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub rating_min: Option<i64>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Parses a path id and rejects non-positive values
///
/// # Arguments
///
/// * `raw` - Path segment as received
/// * `kind` - Entity name used in error messages ("Book", "Category")
pub fn parse_id(raw: &str, kind: &str) -> ApiResult<i64> {
    let id: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{} id must be an integer, got '{}'", kind, raw)))?;

    if id <= 0 {
        return Err(ApiError::BadRequest(format!(
            "{} id must be a positive number",
            kind
        )));
    }
    Ok(id)
}

/// Trims a category name, rejecting blank ones
pub fn require_category_name(raw: &str) -> ApiResult<&str> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest(
            "Category name must not be empty".to_string(),
        ));
    }
    Ok(name)
}

/// Business rules for a book submitted through the API
///
/// A star rating of 0 means unrated and is accepted.
pub fn validate_book(book: &BookRecord) -> ApiResult<()> {
    if book.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    if book.price < 0.0 {
        return Err(ApiError::BadRequest("Price must not be negative".to_string()));
    }
    if book.star_rating != 0 && !(1..=5).contains(&book.star_rating) {
        return Err(ApiError::BadRequest(
            "Star rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

/// Applies the search filters in order: title, price_min, price_max, rating_min
pub fn filter_books(books: Vec<StoredBook>, filters: &SearchFilters) -> Vec<StoredBook> {
    let title = filters
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_lowercase);

    books
        .into_iter()
        .filter(|stored| match &title {
            Some(needle) => stored.book.title.to_lowercase().contains(needle),
            None => true,
        })
        .filter(|stored| filters.price_min.map_or(true, |min| stored.book.price >= min))
        .filter(|stored| filters.price_max.map_or(true, |max| stored.book.price <= max))
        .filter(|stored| {
            filters
                .rating_min
                .map_or(true, |min| i64::from(stored.book.star_rating) >= min)
        })
        .collect()
}
