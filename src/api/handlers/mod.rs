//! Request handlers, grouped by resource

mod books;
mod categories;

pub use books::*;
pub use categories::*;

use super::error::ApiError;
use axum::Json;
use serde_json::{json, Value};

/// Welcome payload listing the resource roots
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Book-Harvester API",
        "resources": ["/books/", "/books/search/", "/categories/"],
    }))
}

/// Uniform 404 for unknown paths
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}
