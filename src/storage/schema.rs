//! Database schema definitions
//!
//! This module contains the SQL schema for the table backend.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per scraped book; the crawl only ever inserts
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url_page TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    full_title TEXT NOT NULL DEFAULT '',
    price REAL NOT NULL DEFAULT 0,
    star_rating INTEGER NOT NULL DEFAULT 0,
    review_count INTEGER NOT NULL DEFAULT 0,
    in_stock INTEGER NOT NULL DEFAULT 0,
    stock_quantity INTEGER NOT NULL DEFAULT 0,
    description TEXT NOT NULL DEFAULT '',
    image_url TEXT NOT NULL DEFAULT '',
    image_filename TEXT NOT NULL DEFAULT '',
    image_alt TEXT NOT NULL DEFAULT '',
    breadcrumb TEXT NOT NULL DEFAULT '[]',
    upc TEXT NOT NULL DEFAULT '',
    product_type TEXT NOT NULL DEFAULT 'Books',
    tax REAL NOT NULL DEFAULT 0,
    number_of_reviews INTEGER NOT NULL DEFAULT 0,
    attributes TEXT NOT NULL DEFAULT '{}',
    derived_prices TEXT NOT NULL DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS idx_books_url ON books(url_page);
CREATE INDEX IF NOT EXISTS idx_books_category ON books(category);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
