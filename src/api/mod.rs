//! HTTP API over the stored books and the category catalog
//!
//! Provides:
//! - Read access to books (by id, by category, filtered search)
//! - Book writes when the file backend is configured
//! - Category catalog CRUD and aggregate views by category
//!
//! Errors use a uniform `{"detail": "<message>"}` body.

mod categories;
mod error;
mod handlers;
mod routes;
mod service;

pub use categories::{CatalogEntry, CategoryCatalog, CategoryPayload};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use service::{filter_books, parse_id, validate_book, SearchFilters};

use crate::config::{Config, StorageBackend};
use crate::storage::{open_book_store, DynBookStore};
use crate::HarvestError;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared state for the API server
///
/// The store sits behind a mutex, so every read-modify-write on the
/// backing file runs one at a time.
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<Mutex<DynBookStore>>,
    pub categories: Arc<Mutex<CategoryCatalog>>,
    pub backend: StorageBackend,
}

impl AppState {
    pub fn new(books: DynBookStore, categories: CategoryCatalog, backend: StorageBackend) -> Self {
        Self {
            books: Arc::new(Mutex::new(books)),
            categories: Arc::new(Mutex::new(categories)),
            backend,
        }
    }

    /// Opens the configured book store and loads the category catalog
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let books = open_book_store(config)?;
        let categories = CategoryCatalog::load(Path::new(&config.output.categories_path))?;
        Ok(Self::new(books, categories, config.storage.backend))
    }

    pub(crate) fn books(&self) -> ApiResult<MutexGuard<'_, DynBookStore>> {
        self.books
            .lock()
            .map_err(|_| ApiError::Internal("book store lock poisoned".to_string()))
    }

    pub(crate) fn categories(&self) -> ApiResult<MutexGuard<'_, CategoryCatalog>> {
        self.categories
            .lock()
            .map_err(|_| ApiError::Internal("category catalog lock poisoned".to_string()))
    }

    /// Book writes are only served by the file backend
    pub(crate) fn require_writable_books(&self) -> ApiResult<()> {
        match self.backend {
            StorageBackend::File => Ok(()),
            StorageBackend::Table => Err(ApiError::MethodNotAllowed(
                "Book writes are not available with the table backend".to_string(),
            )),
        }
    }
}

/// Start the API server on the configured host and port
pub async fn serve(config: &Config) -> Result<(), HarvestError> {
    let state = AppState::from_config(config)?;
    let app = create_router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
