//! Router configuration for the API server.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the API router with all routes.
///
/// Collection paths answer with and without a trailing slash.
pub fn create_router(state: AppState) -> Router {
    let books_collection = get(handlers::list_books).post(handlers::create_book);
    let categories_collection = get(handlers::list_categories).post(handlers::create_category);

    Router::new()
        .route("/", get(handlers::index))
        // Books
        .route("/books", books_collection.clone())
        .route("/books/", books_collection)
        .route("/books/search", get(handlers::search_books))
        .route("/books/search/", get(handlers::search_books))
        .route("/books/category/", get(handlers::books_by_empty_category))
        .route("/books/category/:name", get(handlers::books_by_category))
        .route(
            "/books/:id",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        // Category catalog
        .route("/categories", categories_collection.clone())
        .route("/categories/", categories_collection)
        // Aggregates
        .route("/categories/average-price", get(handlers::average_price))
        .route("/categories/average-price/", get(handlers::average_price))
        .route("/categories/top-by-count", get(handlers::top_by_count))
        .route("/categories/top-by-count/", get(handlers::top_by_count))
        .route(
            "/categories/:id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
