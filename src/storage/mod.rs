//! Storage module for persisting crawl data
//!
//! This module handles:
//! - the JSON stage files passed between crawl stages
//! - the [`BookStore`] sinks for detail records (JSON file or SQLite table)
//! - opening the sink selected by configuration

mod json_file;
mod schema;
mod sqlite;
mod stage_files;
mod traits;

pub use json_file::JsonBookStore;
pub use sqlite::SqliteBookStore;
pub use stage_files::{read_json_array, write_json_array};
pub use traits::{BookStore, CategoryMatch, StorageError, StorageResult, WriteStrategy};

use crate::config::{Config, StorageBackend};
use std::path::Path;

/// A book store that can be moved across tasks
pub type DynBookStore = Box<dyn BookStore + Send>;

/// Opens the book store selected by `[storage] backend`
///
/// # Arguments
///
/// * `config` - Loaded configuration
///
/// # Returns
///
/// * `Ok(DynBookStore)` - The file store at `details-path` or the table store
///   at `database-path`
/// * `Err(StorageError)` - The database could not be opened
pub fn open_book_store(config: &Config) -> StorageResult<DynBookStore> {
    match config.storage.backend {
        StorageBackend::File => Ok(Box::new(JsonBookStore::open(Path::new(
            &config.output.details_path,
        )))),
        StorageBackend::Table => Ok(Box::new(SqliteBookStore::new(Path::new(
            &config.storage.database_path,
        ))?)),
    }
}
