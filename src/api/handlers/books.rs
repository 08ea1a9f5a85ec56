//! Book handlers.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::super::error::{ApiError, ApiResult};
use super::super::service::{filter_books, parse_id, require_category_name, validate_book, SearchFilters};
use super::super::AppState;
use crate::records::{BookRecord, StoredBook};
use crate::storage::CategoryMatch;

fn book_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Book {} not found", id))
}

fn read_body(body: Result<Json<BookRecord>, JsonRejection>) -> ApiResult<BookRecord> {
    body.map(|Json(book)| book)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// List every stored book.
pub async fn list_books(State(state): State<AppState>) -> ApiResult<Json<Vec<StoredBook>>> {
    let store = state.books()?;
    Ok(Json(store.get_all()?))
}

/// Get one book by id.
pub async fn get_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<StoredBook>> {
    let id = parse_id(&raw_id, "Book")?;
    let store = state.books()?;
    store.get_by_id(id)?.map(Json).ok_or_else(|| book_not_found(id))
}

/// Books whose category equals `name`, ignoring case and padding.
pub async fn books_by_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<StoredBook>>> {
    let name = require_category_name(&name)?;
    let store = state.books()?;
    Ok(Json(store.find_by_category(name, CategoryMatch::Exact)?))
}

/// `/books/category/` with no name at all.
pub async fn books_by_empty_category() -> ApiResult<Json<Vec<StoredBook>>> {
    require_category_name("")?;
    Ok(Json(Vec::new()))
}

/// Filtered search over all books.
pub async fn search_books(
    State(state): State<AppState>,
    filters: Result<Query<SearchFilters>, QueryRejection>,
) -> ApiResult<Json<Vec<StoredBook>>> {
    let Query(filters) = filters.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let books = state.books()?.get_all()?;
    Ok(Json(filter_books(books, &filters)))
}

/// Create a book (file backend only).
pub async fn create_book(
    State(state): State<AppState>,
    body: Result<Json<BookRecord>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StoredBook>)> {
    state.require_writable_books()?;
    let book = read_body(body)?;
    validate_book(&book)?;

    let mut store = state.books()?;
    let id = store.insert(book.clone())?;
    tracing::info!("Created book #{} '{}'", id, book.title);

    Ok((StatusCode::CREATED, Json(StoredBook::new(id, book))))
}

/// Replace every field of a book (file backend only).
pub async fn update_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<BookRecord>, JsonRejection>,
) -> ApiResult<Json<StoredBook>> {
    state.require_writable_books()?;
    let id = parse_id(&raw_id, "Book")?;
    let book = read_body(body)?;

    let mut store = state.books()?;
    if store.get_by_id(id)?.is_none() {
        return Err(book_not_found(id));
    }
    validate_book(&book)?;

    if !store.update(id, book.clone())? {
        return Err(book_not_found(id));
    }
    tracing::info!("Updated book #{}", id);

    Ok(Json(StoredBook::new(id, book)))
}

/// Delete a book (file backend only).
pub async fn delete_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.require_writable_books()?;
    let id = parse_id(&raw_id, "Book")?;

    let mut store = state.books()?;
    if !store.delete(id)? {
        return Err(book_not_found(id));
    }
    tracing::info!("Deleted book #{}", id);

    Ok(Json(json!({ "message": format!("Book {} deleted", id) })))
}
