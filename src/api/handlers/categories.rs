//! Category catalog and aggregate handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::super::categories::{CatalogEntry, CategoryPayload};
use super::super::error::{ApiError, ApiResult};
use super::super::service::{parse_id, require_category_name};
use super::super::AppState;
use crate::output::{average_price_by_category, category_ranking, CategoryRanking, PriceByCategory};

fn category_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Category {} not found", id))
}

fn read_payload(body: Result<Json<CategoryPayload>, JsonRejection>) -> ApiResult<CategoryPayload> {
    let Json(payload) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    require_category_name(&payload.name)?;
    Ok(payload)
}

/// List the category catalog.
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<CatalogEntry>>> {
    let catalog = state.categories()?;
    Ok(Json(catalog.all().to_vec()))
}

/// Get one category by id.
pub async fn get_category(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<CatalogEntry>> {
    let id = parse_id(&raw_id, "Category")?;
    let catalog = state.categories()?;
    catalog
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| category_not_found(id))
}

/// Add a category to the catalog.
pub async fn create_category(
    State(state): State<AppState>,
    body: Result<Json<CategoryPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CatalogEntry>)> {
    let payload = read_payload(body)?;
    let entry = state.categories()?.create(payload);
    tracing::info!("Created category #{} '{}'", entry.id, entry.name);
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Replace a category.
pub async fn update_category(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<CategoryPayload>, JsonRejection>,
) -> ApiResult<Json<CatalogEntry>> {
    let id = parse_id(&raw_id, "Category")?;
    let payload = read_payload(body)?;
    let mut catalog = state.categories()?;
    catalog
        .update(id, payload)
        .map(Json)
        .ok_or_else(|| category_not_found(id))
}

/// Remove a category.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&raw_id, "Category")?;
    let deleted = state.categories()?.delete(id);
    if !deleted {
        return Err(category_not_found(id));
    }
    Ok(Json(json!({ "message": format!("Category {} deleted", id) })))
}

/// Average book price per category, highest first.
pub async fn average_price(State(state): State<AppState>) -> ApiResult<Json<Vec<PriceByCategory>>> {
    let books = state.books()?.get_all()?;
    Ok(Json(average_price_by_category(&books)))
}

/// Categories ranked by number of books.
pub async fn top_by_count(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryRanking>>> {
    let books = state.books()?.get_all()?;
    Ok(Json(category_ranking(&books)))
}
