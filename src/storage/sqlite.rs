//! SQLite table backend
//!
//! One row per book keyed by an AUTOINCREMENT id. List-valued fields are
//! stored as JSON text. The crawl writes through this backend append-only.

use crate::records::{BookRecord, StoredBook};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{BookStore, CategoryMatch, StorageResult, WriteStrategy};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SELECT_COLUMNS: &str = "SELECT id, url_page, category, title, full_title, price, star_rating,
    review_count, in_stock, stock_quantity, description, image_url, image_filename, image_alt,
    breadcrumb, upc, product_type, tax, number_of_reviews, attributes, derived_prices
    FROM books";

/// SQLite storage backend
pub struct SqliteBookStore {
    conn: Connection,
}

impl SqliteBookStore {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Deletes every row and resets the id sequence
    ///
    /// # Returns
    ///
    /// The number of rows removed
    pub fn reset(&mut self) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM books", [])?;
        tx.execute("DELETE FROM sqlite_sequence WHERE name = 'books'", [])?;
        tx.commit()?;
        Ok(removed)
    }

    fn query_books(&self, sql: &str, params: impl rusqlite::Params) -> StorageResult<Vec<StoredBook>> {
        let mut stmt = self.conn.prepare(sql)?;
        let books = stmt
            .query_map(params, row_to_book)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_book(row: &Row<'_>) -> rusqlite::Result<StoredBook> {
    Ok(StoredBook {
        id: row.get(0)?,
        book: BookRecord {
            url_page: row.get(1)?,
            category: row.get(2)?,
            title: row.get(3)?,
            full_title: row.get(4)?,
            price: row.get(5)?,
            star_rating: row.get(6)?,
            review_count: row.get(7)?,
            in_stock: row.get(8)?,
            stock_quantity: row.get(9)?,
            description: row.get(10)?,
            image_url: row.get(11)?,
            image_filename: row.get(12)?,
            image_alt: row.get(13)?,
            breadcrumb: json_column(row, 14)?,
            upc: row.get(15)?,
            product_type: row.get(16)?,
            tax: row.get(17)?,
            number_of_reviews: row.get(18)?,
            attributes: json_column(row, 19)?,
            derived_prices: json_column(row, 20)?,
        },
    })
}

impl BookStore for SqliteBookStore {
    fn write_strategy(&self) -> WriteStrategy {
        WriteStrategy::AppendOnly
    }

    fn get_all(&self) -> StorageResult<Vec<StoredBook>> {
        self.query_books(&format!("{} ORDER BY id", SELECT_COLUMNS), [])
    }

    fn get_by_id(&self, id: i64) -> StorageResult<Option<StoredBook>> {
        let book = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                row_to_book,
            )
            .optional()?;
        Ok(book)
    }

    fn get_by_url(&self, url: &str) -> StorageResult<Option<StoredBook>> {
        let book = self
            .conn
            .query_row(
                &format!("{} WHERE url_page = ?1 ORDER BY id LIMIT 1", SELECT_COLUMNS),
                params![url],
                row_to_book,
            )
            .optional()?;
        Ok(book)
    }

    fn insert(&mut self, book: BookRecord) -> StorageResult<i64> {
        let breadcrumb = serde_json::to_string(&book.breadcrumb)?;
        let attributes = serde_json::to_string(&book.attributes)?;
        let derived_prices = serde_json::to_string(&book.derived_prices)?;

        // Dropping the transaction without commit rolls it back
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO books (url_page, category, title, full_title, price, star_rating,
             review_count, in_stock, stock_quantity, description, image_url, image_filename,
             image_alt, breadcrumb, upc, product_type, tax, number_of_reviews, attributes,
             derived_prices)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
             ?17, ?18, ?19, ?20)",
            params![
                book.url_page,
                book.category,
                book.title,
                book.full_title,
                book.price,
                book.star_rating,
                book.review_count,
                book.in_stock,
                book.stock_quantity,
                book.description,
                book.image_url,
                book.image_filename,
                book.image_alt,
                breadcrumb,
                book.upc,
                book.product_type,
                book.tax,
                book.number_of_reviews,
                attributes,
                derived_prices,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(id)
    }

    fn update(&mut self, id: i64, book: BookRecord) -> StorageResult<bool> {
        let breadcrumb = serde_json::to_string(&book.breadcrumb)?;
        let attributes = serde_json::to_string(&book.attributes)?;
        let derived_prices = serde_json::to_string(&book.derived_prices)?;

        let changed = self.conn.execute(
            "UPDATE books SET url_page = ?1, category = ?2, title = ?3, full_title = ?4,
             price = ?5, star_rating = ?6, review_count = ?7, in_stock = ?8,
             stock_quantity = ?9, description = ?10, image_url = ?11, image_filename = ?12,
             image_alt = ?13, breadcrumb = ?14, upc = ?15, product_type = ?16, tax = ?17,
             number_of_reviews = ?18, attributes = ?19, derived_prices = ?20
             WHERE id = ?21",
            params![
                book.url_page,
                book.category,
                book.title,
                book.full_title,
                book.price,
                book.star_rating,
                book.review_count,
                book.in_stock,
                book.stock_quantity,
                book.description,
                book.image_url,
                book.image_filename,
                book.image_alt,
                breadcrumb,
                book.upc,
                book.product_type,
                book.tax,
                book.number_of_reviews,
                attributes,
                derived_prices,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete(&mut self, id: i64) -> StorageResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn find_by_category(
        &self,
        query: &str,
        policy: CategoryMatch,
    ) -> StorageResult<Vec<StoredBook>> {
        // SQLite's lower() only folds ASCII, so matching happens here
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|b| policy.matches(&b.book.category, query))
            .collect())
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
