//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the catalog site and run the
//! crawl stages end-to-end against temporary stage files and stores.

use book_harvester::config::{
    Config, CrawlerConfig, OutputConfig, ServerConfig, StorageBackend, StorageConfig,
    UserAgentConfig,
};
use book_harvester::crawler::{run_crawl, Coordinator, Stage, StageOutcome};
use book_harvester::records::{Category, ListingRecord, StoredBook};
use book_harvester::storage::{read_json_array, BookStore, JsonBookStore, SqliteBookStore};
use book_harvester::HarvestError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TRAVEL_PATH: &str = "/catalogue/category/books/travel_2";
const POETRY_PATH: &str = "/catalogue/category/books/poetry_23";

/// Creates a test configuration pointing at the mock server, with every
/// output file inside `dir`
fn create_test_config(base_url: &str, dir: &TempDir, backend: StorageBackend) -> Config {
    let file = |name: &str| dir.path().join(name).to_string_lossy().into_owned();

    Config {
        crawler: CrawlerConfig {
            start_url: format!("{}/index.html", base_url),
            max_concurrent_requests: 4,
            request_interval_ms: 0,
            max_pages_per_category: 10,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            categories_path: file("categories.json"),
            listings_path: file("books_by_categories.json"),
            details_path: file("detail_books.json"),
        },
        storage: StorageConfig {
            backend,
            database_path: file("books.db"),
        },
        server: ServerConfig::default(),
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn index_page() -> String {
    r#"<html><body>
    <div class="side_categories">
      <ul class="nav nav-list">
        <li>
          <a href="catalogue/category/books_1/index.html">Books</a>
          <ul>
            <li><a href="catalogue/category/books/travel_2/index.html">Travel</a></li>
            <li><a href="catalogue/category/books/poetry_23/index.html">Poetry</a></li>
          </ul>
        </li>
      </ul>
    </div>
    </body></html>"#
        .to_string()
}

/// A listing page with one card per book number and an optional next link
fn listing_page(books: &[u32], next: Option<&str>) -> String {
    let cards: String = books
        .iter()
        .map(|n| {
            format!(
                r#"<li><article class="product_pod">
                  <div class="image_container">
                    <a href="/catalogue/book_{n}/index.html"><img src="/media/cache/book_{n}.jpg" alt="Book {n}"></a>
                  </div>
                  <p class="star-rating Three"></p>
                  <h3><a href="/catalogue/book_{n}/index.html" title="Book {n}">Book {n}</a></h3>
                  <div class="product_price">
                    <p class="price_color">£{n}0.50</p>
                    <p class="instock availability"><i class="icon-ok"></i> In stock</p>
                  </div>
                </article></li>"#
            )
        })
        .collect();

    let pager = next
        .map(|href| format!(r#"<ul class="pager"><li class="next"><a href="{}">next</a></li></ul>"#, href))
        .unwrap_or_default();

    format!(
        r#"<html><body><section><ol class="row">{}</ol><div>{}</div></section></body></html>"#,
        cards, pager
    )
}

fn detail_page(n: u32, category: &str) -> String {
    format!(
        r#"<html><body>
        <ul class="breadcrumb">
          <li><a href="/index.html">Home</a></li>
          <li><a href="/catalogue/category/books_1/index.html">Books</a></li>
          <li><a href="/catalogue/category/books/x/index.html">{category}</a></li>
          <li class="active">Book {n}</li>
        </ul>
        <article class="product_page">
          <div class="row">
            <div id="product_gallery"><div class="thumbnail"><div class="item active">
              <img src="../../media/cache/full_{n}.jpg" alt="Book {n}">
            </div></div></div>
            <div class="product_main">
              <h1>Book {n}</h1>
              <p class="price_color">£{n}0.50</p>
              <p class="instock availability"><i class="icon-ok"></i>
                In stock ({n} available)
              </p>
              <p class="star-rating Four"></p>
            </div>
          </div>
          <div id="product_description" class="sub-header"><h2>Product Description</h2></div>
          <p>Description of book {n}.</p>
          <table class="table table-striped">
            <tr><th>UPC</th><td>upc{n:04}</td></tr>
            <tr><th>Product Type</th><td>Books</td></tr>
            <tr><th>Price (excl. tax)</th><td>£{n}0.50</td></tr>
            <tr><th>Tax</th><td>£0.00</td></tr>
            <tr><th>Number of reviews</th><td>{n}</td></tr>
          </table>
        </article>
        </body></html>"#
    )
}

/// Mounts the whole mock catalog:
/// - Travel: 3 listing pages with books 1-2, 3-4 and 5
/// - Poetry: 1 listing page with book 6
async fn mount_catalog(server: &MockServer) {
    mount_page(server, "/index.html", index_page()).await;

    mount_page(
        server,
        &format!("{}/index.html", TRAVEL_PATH),
        listing_page(&[1, 2], Some("page-2.html")),
    )
    .await;
    mount_page(
        server,
        &format!("{}/page-2.html", TRAVEL_PATH),
        listing_page(&[3, 4], Some("page-3.html")),
    )
    .await;
    mount_page(
        server,
        &format!("{}/page-3.html", TRAVEL_PATH),
        listing_page(&[5], None),
    )
    .await;
    mount_page(
        server,
        &format!("{}/index.html", POETRY_PATH),
        listing_page(&[6], None),
    )
    .await;

    for n in 1..=5 {
        mount_page(server, &format!("/catalogue/book_{}/index.html", n), detail_page(n, "Travel")).await;
    }
    mount_page(server, "/catalogue/book_6/index.html", detail_page(6, "Poetry")).await;
}

fn completed(outcome: &StageOutcome) -> &book_harvester::state::CrawlCounters {
    match outcome {
        StageOutcome::Completed(counters) => counters,
        other => panic!("Stage did not complete: {:?}", other),
    }
}

fn stored_books(config: &Config) -> Vec<StoredBook> {
    JsonBookStore::open(Path::new(&config.output.details_path))
        .get_all()
        .expect("Failed to read stored books")
}

#[tokio::test]
async fn test_full_crawl_file_backend() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir, StorageBackend::File);

    let outcomes = run_crawl(config.clone()).await.expect("Crawl failed");

    let stages: Vec<Stage> = outcomes.iter().map(|(stage, _)| *stage).collect();
    assert_eq!(stages, vec![Stage::Categories, Stage::Listings, Stage::Details]);
    assert!(outcomes.iter().all(|(_, outcome)| outcome.is_completed()));

    let categories: Vec<Category> = read_json_array(Path::new(&config.output.categories_path))
        .unwrap()
        .unwrap();
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Travel", "Poetry"]);
    assert_eq!(
        categories[0].url_absolute,
        format!("{}{}/index.html", mock_server.uri(), TRAVEL_PATH)
    );

    let listings: Vec<ListingRecord> = read_json_array(Path::new(&config.output.listings_path))
        .unwrap()
        .unwrap();
    assert_eq!(listings.len(), 6);
    assert_eq!(listings[0].price_text, "£10.50");
    assert_eq!(listings[5].category, "Poetry");

    let books = stored_books(&config);
    let titles: Vec<&str> = books.iter().map(|b| b.book.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Book 1", "Book 2", "Book 3", "Book 4", "Book 5", "Book 6"]
    );

    let third = &books[2].book;
    assert_eq!(third.category, "Travel");
    assert_eq!(third.price, 30.5);
    assert_eq!(third.star_rating, 4);
    assert!(third.in_stock);
    assert_eq!(third.stock_quantity, 3);
    assert_eq!(third.review_count, 3);
    assert_eq!(third.upc, "upc0003");
    assert_eq!(third.description, "Description of book 3.");
    assert_eq!(third.image_filename, "full_3.jpg");
    assert_eq!(
        third.url_page,
        format!("{}/catalogue/book_3/index.html", mock_server.uri())
    );
    assert_eq!(books[5].book.category, "Poetry");

    let details = completed(&outcomes[2].1);
    assert_eq!(details.inserted, 6);
    assert_eq!(details.failed, 0);
}

#[tokio::test]
async fn test_pagination_three_pages_no_duplicates() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir, StorageBackend::File);
    let coordinator = Coordinator::new(config).unwrap();

    let travel = Category {
        name: "Travel".to_string(),
        url_absolute: format!("{}{}/index.html", mock_server.uri(), TRAVEL_PATH),
        url_relative: "catalogue/category/books/travel_2/index.html".to_string(),
    };

    let listing = coordinator.crawl_category(&travel).await.unwrap();

    let titles: Vec<&str> = listing.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Book 1", "Book 2", "Book 3", "Book 4", "Book 5"]);
    assert_eq!(listing.counters.pages_fetched, 3);
    assert!(listing.counters.anomalies.is_empty());
    assert!(listing
        .records
        .iter()
        .all(|r| r.category == "Travel" && r.detail_url.starts_with(&mock_server.uri())));
}

#[tokio::test]
async fn test_pagination_loop_is_reported() {
    let mock_server = MockServer::start().await;
    let loop_path = "/catalogue/category/books/loop_9";

    mount_page(
        &mock_server,
        &format!("{}/index.html", loop_path),
        listing_page(&[1], Some("page-2.html")),
    )
    .await;
    // Page 2 links back to the first page
    mount_page(
        &mock_server,
        &format!("{}/page-2.html", loop_path),
        listing_page(&[2], Some("index.html")),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir, StorageBackend::File);
    let coordinator = Coordinator::new(config).unwrap();

    let looping = Category {
        name: "Loop".to_string(),
        url_absolute: format!("{}{}/index.html", mock_server.uri(), loop_path),
        url_relative: "catalogue/category/books/loop_9/index.html".to_string(),
    };

    let listing = coordinator.crawl_category(&looping).await.unwrap();

    assert_eq!(listing.records.len(), 2);
    assert_eq!(listing.counters.pages_fetched, 2);
    assert_eq!(listing.counters.anomalies.len(), 1);
}

#[tokio::test]
async fn test_pagination_cap_is_reported() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), &dir, StorageBackend::File);
    config.crawler.max_pages_per_category = 2;
    let coordinator = Coordinator::new(config).unwrap();

    let travel = Category {
        name: "Travel".to_string(),
        url_absolute: format!("{}{}/index.html", mock_server.uri(), TRAVEL_PATH),
        url_relative: "catalogue/category/books/travel_2/index.html".to_string(),
    };

    let listing = coordinator.crawl_category(&travel).await.unwrap();

    assert_eq!(listing.records.len(), 4);
    assert_eq!(listing.counters.pages_fetched, 2);
    assert_eq!(listing.counters.anomalies.len(), 1);
}

#[tokio::test]
async fn test_missing_prerequisites() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir, StorageBackend::File);
    let coordinator = Coordinator::new(config.clone()).unwrap();

    let outcome = coordinator.run_listings().await.unwrap();
    assert_eq!(
        outcome,
        StageOutcome::MissingInput {
            path: Path::new(&config.output.categories_path).to_path_buf(),
            run_first: Stage::Categories,
        }
    );
    assert!(!Path::new(&config.output.listings_path).exists());

    let mut store = JsonBookStore::open(Path::new(&config.output.details_path));
    let outcome = coordinator.run_details(&mut store).await.unwrap();
    assert!(matches!(
        outcome,
        StageOutcome::MissingInput {
            run_first: Stage::Listings,
            ..
        }
    ));
    assert!(!Path::new(&config.output.details_path).exists());

    // Nothing was fetched
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_start_page_unavailable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir, StorageBackend::File);
    let coordinator = Coordinator::new(config.clone()).unwrap();

    let result = coordinator.run_categories().await;
    assert!(matches!(result, Err(HarvestError::Fetch { .. })));
    assert!(!Path::new(&config.output.categories_path).exists());
}

#[tokio::test]
async fn test_second_crawl_updates_in_place() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir, StorageBackend::File);

    run_crawl(config.clone()).await.expect("First crawl failed");
    let first = stored_books(&config);

    let outcomes = run_crawl(config.clone()).await.expect("Second crawl failed");
    let second = stored_books(&config);

    assert_eq!(first.len(), 6);
    assert_eq!(second, first);

    let details = completed(&outcomes[2].1);
    assert_eq!(details.inserted, 0);
    assert_eq!(details.updated, 6);
}

#[tokio::test]
async fn test_table_backend_appends_and_resets() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir, StorageBackend::Table);

    run_crawl(config.clone()).await.expect("First crawl failed");
    run_crawl(config.clone()).await.expect("Second crawl failed");

    let mut store = SqliteBookStore::new(Path::new(&config.storage.database_path)).unwrap();
    assert_eq!(store.count().unwrap(), 12);
    assert!(!Path::new(&config.output.details_path).exists());

    assert_eq!(store.reset().unwrap(), 12);
    assert_eq!(store.count().unwrap(), 0);

    run_crawl(config.clone()).await.expect("Crawl after reset failed");
    let store = SqliteBookStore::new(Path::new(&config.storage.database_path)).unwrap();
    let ids: Vec<i64> = store.get_all().unwrap().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn test_failed_detail_page_is_counted() {
    let mock_server = MockServer::start().await;

    // Book 2 is missing; the mock server answers 404
    Mock::given(method("GET"))
        .and(path("/catalogue/book_1/index.html"))
        .respond_with(html(detail_page(1, "Travel")))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/book_3/index.html"))
        .respond_with(html(detail_page(3, "Travel")))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir, StorageBackend::File);

    let listings: Vec<ListingRecord> = [1, 2, 3]
        .iter()
        .map(|n| ListingRecord {
            category: "Travel".to_string(),
            title: format!("Book {}", n),
            price_text: String::new(),
            star_class: String::new(),
            image_url: String::new(),
            detail_url: format!("{}/catalogue/book_{}/index.html", mock_server.uri(), n),
            availability_text: String::new(),
        })
        .collect();
    book_harvester::storage::write_json_array(Path::new(&config.output.listings_path), &listings)
        .unwrap();

    let coordinator = Coordinator::new(config.clone()).unwrap();
    let mut store = JsonBookStore::open(Path::new(&config.output.details_path));
    let outcome = coordinator.run_details(&mut store).await.unwrap();

    let counters = completed(&outcome);
    assert_eq!(counters.inserted, 2);
    assert_eq!(counters.failed, 1);

    let titles: Vec<String> = stored_books(&config)
        .into_iter()
        .map(|b| b.book.title)
        .collect();
    assert_eq!(titles, vec!["Book 1", "Book 3"]);
}
