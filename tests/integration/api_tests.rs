//! Integration tests for the HTTP API
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` over a
//! JSON file store in a temporary directory.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use book_harvester::api::{create_router, AppState, CategoryCatalog};
use book_harvester::config::StorageBackend;
use book_harvester::records::{BookRecord, Category};
use book_harvester::storage::{BookStore, DynBookStore, JsonBookStore, SqliteBookStore};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

fn book(title: &str, category: &str, price: f64, star_rating: u8) -> BookRecord {
    let slug = title.to_lowercase().replace(' ', "-");
    BookRecord {
        url_page: format!("https://books.test/catalogue/{}/index.html", slug),
        category: category.to_string(),
        title: title.to_string(),
        full_title: title.to_string(),
        price,
        star_rating,
        ..Default::default()
    }
}

fn seed_books() -> Vec<BookRecord> {
    vec![
        book("A Light in the Attic", "Poetry", 51.77, 3),
        book("Tipping the Velvet", "Historical Fiction", 53.74, 1),
        book("Soumission", "Fiction", 50.10, 1),
        book("Sharp Objects", "Mystery", 47.82, 4),
        book("Olio", "Poetry", 23.87, 1),
    ]
}

fn catalog() -> CategoryCatalog {
    CategoryCatalog::from_categories(vec![
        Category {
            name: "Travel".to_string(),
            url_absolute: "https://books.test/catalogue/category/books/travel_2/index.html"
                .to_string(),
            url_relative: "catalogue/category/books/travel_2/index.html".to_string(),
        },
        Category {
            name: "Poetry".to_string(),
            url_absolute: "https://books.test/catalogue/category/books/poetry_23/index.html"
                .to_string(),
            url_relative: "catalogue/category/books/poetry_23/index.html".to_string(),
        },
    ])
}

/// App over a seeded JSON file store; returns the store path too
fn setup_file_app() -> (Router, PathBuf, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("detail_books.json");

    let mut store = JsonBookStore::open(&path);
    for record in seed_books() {
        store.insert(record).unwrap();
    }

    let books: DynBookStore = Box::new(store);
    let app = create_router(AppState::new(books, catalog(), StorageBackend::File));
    (app, path, dir)
}

fn setup_table_app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let mut store = SqliteBookStore::new(&dir.path().join("books.db")).unwrap();
    for record in seed_books() {
        store.insert(record).unwrap();
    }

    let books: DynBookStore = Box::new(store);
    let app = create_router(AppState::new(books, catalog(), StorageBackend::Table));
    (app, dir)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

fn titles(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_list_books_with_and_without_slash() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = get(&app, "/books/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
    assert_eq!(body[0]["id"], 1);
    assert_eq!(body[0]["title"], "A Light in the Attic");

    let (status, body) = get(&app, "/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_get_book_by_id() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = get(&app, "/books/4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 4);
    assert_eq!(body["title"], "Sharp Objects");
    assert_eq!(body["price"], json!(47.82));
    assert_eq!(body["product_type"], "Books");
}

#[tokio::test]
async fn test_invalid_and_missing_ids() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = get(&app, "/books/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, _) = get(&app, "/books/-2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/books/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/books/999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Book 999999 not found");
}

#[tokio::test]
async fn test_books_by_category() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = get(&app, "/books/category/POETRY").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["A Light in the Attic", "Olio"]);

    // Exact match only: "Fiction" does not pick up "Historical Fiction"
    let (status, body) = get(&app, "/books/category/fiction").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Soumission"]);

    let (status, body) = get(&app, "/books/category/%20Historical%20Fiction%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Tipping the Velvet"]);

    let (status, body) = get(&app, "/books/category/Travel").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_category_is_bad_request() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = get(&app, "/books/category/%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, _) = get(&app, "/books/category/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_filters_combine() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = get(&app, "/books/search/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);

    let (_, body) = get(&app, "/books/search/?title=THE").await;
    assert_eq!(titles(&body), vec!["A Light in the Attic", "Tipping the Velvet"]);

    let (_, body) = get(&app, "/books/search?price_min=48&price_max=52").await;
    assert_eq!(titles(&body), vec!["A Light in the Attic", "Soumission"]);

    let (_, body) = get(&app, "/books/search/?price_min=40&rating_min=3").await;
    assert_eq!(titles(&body), vec!["A Light in the Attic", "Sharp Objects"]);

    let (status, _) = get(&app, "/books/search/?price_min=cheap").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_blank_parameters_are_ignored() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = get(&app, "/books/search/?title=&price_min=&price_max=&rating_min=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);

    let (status, body) = get(&app, "/books/search/?title=attic&price_min=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["A Light in the Attic"]);

    let (status, body) = get(&app, "/books/search?price_min=&rating_min=4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Sharp Objects"]);
}

#[tokio::test]
async fn test_create_book_persists_to_file() {
    let (app, path, _dir) = setup_file_app();

    let payload = json!({
        "url_page": "https://books.test/catalogue/new-book/index.html",
        "title": "New Book",
        "category": "Travel",
        "price": 12.5,
        "star_rating": 5
    });
    let (status, body) = send(&app, "POST", "/books/", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 6);
    assert_eq!(body["title"], "New Book");
    assert_eq!(body["description"], "");

    let reopened = JsonBookStore::open(&path);
    let stored = reopened.get_by_id(6).unwrap().unwrap();
    assert_eq!(stored.book.category, "Travel");
    assert_eq!(stored.book.price, 12.5);
}

#[tokio::test]
async fn test_create_book_validation() {
    let (app, _path, _dir) = setup_file_app();

    let cases = vec![
        json!({ "title": "  ", "price": 1.0 }),
        json!({ "title": "Cheap", "price": -1.0 }),
        json!({ "title": "Overrated", "price": 1.0, "star_rating": 6 }),
    ];
    for payload in cases {
        let (status, body) = send(&app, "POST", "/books", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }

    // Unrated is allowed
    let (status, _) = send(
        &app,
        "POST",
        "/books",
        Some(json!({ "title": "Unrated", "price": 0.0, "star_rating": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let request = Request::builder()
        .method("POST")
        .uri("/books/")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_book() {
    let (app, path, _dir) = setup_file_app();

    let payload = json!({
        "url_page": "https://books.test/catalogue/soumission/index.html",
        "title": "Soumission (poche)",
        "category": "Fiction",
        "price": 9.99,
        "star_rating": 2
    });
    let (status, body) = send(&app, "PUT", "/books/3", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 3);
    assert_eq!(body["title"], "Soumission (poche)");

    // Position in the file is kept
    let reopened = JsonBookStore::open(&path);
    let all = reopened.get_all().unwrap();
    assert_eq!(all[2].id, 3);
    assert_eq!(all[2].book.price, 9.99);

    let (status, _) = send(&app, "PUT", "/books/999999", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "PUT", "/books/0", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PUT", "/books/3", Some(json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_book() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = send(&app, "DELETE", "/books/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book 2 deleted");

    let (status, _) = send(&app, "DELETE", "/books/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/books/2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get(&app, "/books/").await;
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_table_backend_is_read_only() {
    let (app, _dir) = setup_table_app();

    let (status, body) = get(&app, "/books/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "A Light in the Attic");

    let (status, body) = send(
        &app,
        "POST",
        "/books/",
        Some(json!({ "title": "New Book", "price": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(body["detail"].is_string());

    let (status, _) = send(&app, "PUT", "/books/1", Some(json!({ "title": "X" }))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = send(&app, "DELETE", "/books/1", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (_, body) = get(&app, "/books/category/poetry").await;
    assert_eq!(titles(&body), vec!["A Light in the Attic", "Olio"]);
}

#[tokio::test]
async fn test_average_price_view() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = get(&app, "/categories/average-price/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "category": "Historical Fiction", "average_price": 53.74, "item_count": 1 },
            { "category": "Fiction", "average_price": 50.1, "item_count": 1 },
            { "category": "Mystery", "average_price": 47.82, "item_count": 1 },
            { "category": "Poetry", "average_price": 37.82, "item_count": 2 },
        ])
    );
}

#[tokio::test]
async fn test_top_by_count_view() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = get(&app, "/categories/top-by-count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "rank": 1, "category": "Poetry", "item_count": 2, "percentage_of_total": 40.0 },
            { "rank": 2, "category": "Historical Fiction", "item_count": 1, "percentage_of_total": 20.0 },
            { "rank": 3, "category": "Fiction", "item_count": 1, "percentage_of_total": 20.0 },
            { "rank": 4, "category": "Mystery", "item_count": 1, "percentage_of_total": 20.0 },
        ])
    );
}

#[tokio::test]
async fn test_category_catalog_crud() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = get(&app, "/categories/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[1]["id"], 2);
    assert_eq!(body[1]["name"], "Poetry");

    let (status, body) = get(&app, "/categories/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Travel");

    let (status, _) = get(&app, "/categories/0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/categories/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/categories/", Some(json!({ "name": " " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/categories", Some(json!({ "name": "Humor" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 3);

    let (status, body) = send(&app, "PUT", "/categories/3", Some(json!({ "name": "Humour" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Humour");

    let (status, _) = send(&app, "PUT", "/categories/42", Some(json!({ "name": "Nope" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/categories/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", "/categories/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get(&app, "/categories").await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Poetry", "Humour"]);
}

#[tokio::test]
async fn test_unknown_path_uses_uniform_error() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = get(&app, "/authors/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Not found");
}

#[tokio::test]
async fn test_root_lists_resources() {
    let (app, _path, _dir) = setup_file_app();

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book-Harvester API");
    assert!(body["resources"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r == "/books/"));
}
