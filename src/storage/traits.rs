//! Storage traits and error types
//!
//! This module defines the trait interface shared by the record sinks and
//! the associated error types.

use crate::records::{BookRecord, StoredBook};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// How the detail stage writes a scraped record into a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Overwrite the record with the same `url_page`, or append if absent
    UpsertByUrl,
    /// Always append; re-running a crawl duplicates rows
    AppendOnly,
}

impl WriteStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpsertByUrl => "upsert-by-url",
            Self::AppendOnly => "append-only",
        }
    }
}

/// Category matching policy, shared by every backend
///
/// Both variants compare trimmed names case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryMatch {
    /// Whole-name equality
    Exact,
    /// The stored category contains the query
    Contains,
}

impl CategoryMatch {
    /// Returns true if a stored category satisfies `query` under this policy
    pub fn matches(&self, stored: &str, query: &str) -> bool {
        let stored = stored.trim().to_lowercase();
        let query = query.trim().to_lowercase();
        match self {
            Self::Exact => stored == query,
            Self::Contains => stored.contains(&query),
        }
    }
}

/// Trait for book record sinks
///
/// Implementations own their persistence; every mutating call is durable
/// when it returns. Callers that share a store across tasks wrap it in a
/// mutex, which is what serializes read-modify-write cycles.
pub trait BookStore {
    /// The strategy the detail stage applies to this sink
    fn write_strategy(&self) -> WriteStrategy;

    /// Returns every record in storage order
    fn get_all(&self) -> StorageResult<Vec<StoredBook>>;

    /// Point lookup by surrogate id
    fn get_by_id(&self, id: i64) -> StorageResult<Option<StoredBook>>;

    /// Point lookup by detail page URL (first match)
    fn get_by_url(&self, url: &str) -> StorageResult<Option<StoredBook>>;

    /// Appends a record and returns its new id
    fn insert(&mut self, book: BookRecord) -> StorageResult<i64>;

    /// Replaces every field of the record with `id`
    ///
    /// # Returns
    ///
    /// `false` if no record has that id
    fn update(&mut self, id: i64, book: BookRecord) -> StorageResult<bool>;

    /// Removes the record with `id`; `false` if absent
    fn delete(&mut self, id: i64) -> StorageResult<bool>;

    /// Returns the records whose category satisfies `query` under `policy`
    fn find_by_category(&self, query: &str, policy: CategoryMatch)
        -> StorageResult<Vec<StoredBook>>;

    /// Number of stored records
    fn count(&self) -> StorageResult<u64>;
}
