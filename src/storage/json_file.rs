//! JSON file backend
//!
//! The whole record set lives in memory and is rewritten to a single JSON
//! array after every mutation. Records keep their first-seen position when
//! updated.

use crate::records::{BookRecord, StoredBook};
use crate::storage::stage_files::write_atomically;
use crate::storage::traits::{BookStore, CategoryMatch, StorageResult, WriteStrategy};
use std::path::{Path, PathBuf};

/// Book store backed by a JSON array file
pub struct JsonBookStore {
    path: PathBuf,
    books: Vec<StoredBook>,
    /// Highest id issued by this store; ids are never handed out twice
    last_id: i64,
}

impl JsonBookStore {
    /// Opens the store at `path`
    ///
    /// A missing file starts an empty store. A file that cannot be read or
    /// parsed is logged and also treated as empty; it is replaced on the next
    /// write. Records without an id are numbered after the highest id in the
    /// file, in file order.
    pub fn open(path: &Path) -> Self {
        let mut books = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<StoredBook>>(&content) {
                Ok(books) => books,
                Err(e) => {
                    tracing::warn!(
                        "Corrupt record file {}, starting empty: {}",
                        path.display(),
                        e
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No record file at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read record file {}, starting empty: {}",
                    path.display(),
                    e
                );
                Vec::new()
            }
        };

        let last_id = assign_missing_ids(&mut books);

        tracing::debug!("Loaded {} records from {}", books.len(), path.display());

        Self {
            path: path.to_path_buf(),
            books,
            last_id,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }


    fn save(&self) -> StorageResult<()> {
        let json = serde_json::to_vec_pretty(&self.books)?;
        write_atomically(&self.path, &json)?;
        Ok(())
    }
}

/// Numbers id-less records and returns the highest id in use
fn assign_missing_ids(books: &mut [StoredBook]) -> i64 {
    let mut last = books.iter().map(|b| b.id).max().unwrap_or(0).max(0);
    for book in books.iter_mut().filter(|b| b.id <= 0) {
        last += 1;
        book.id = last;
    }
    last
}

impl BookStore for JsonBookStore {
    fn write_strategy(&self) -> WriteStrategy {
        WriteStrategy::UpsertByUrl
    }

    fn get_all(&self) -> StorageResult<Vec<StoredBook>> {
        Ok(self.books.clone())
    }

    fn get_by_id(&self, id: i64) -> StorageResult<Option<StoredBook>> {
        Ok(self.books.iter().find(|b| b.id == id).cloned())
    }

    fn get_by_url(&self, url: &str) -> StorageResult<Option<StoredBook>> {
        Ok(self.books.iter().find(|b| b.book.url_page == url).cloned())
    }

    fn insert(&mut self, book: BookRecord) -> StorageResult<i64> {
        let id = self.last_id + 1;
        self.books.push(StoredBook::new(id, book));
        if let Err(e) = self.save() {
            self.books.pop();
            return Err(e);
        }
        self.last_id = id;
        Ok(id)
    }

    fn update(&mut self, id: i64, book: BookRecord) -> StorageResult<bool> {
        let Some(slot) = self.books.iter_mut().find(|b| b.id == id) else {
            return Ok(false);
        };
        let previous = std::mem::replace(&mut slot.book, book);
        if let Err(e) = self.save() {
            if let Some(slot) = self.books.iter_mut().find(|b| b.id == id) {
                slot.book = previous;
            }
            return Err(e);
        }
        Ok(true)
    }

    fn delete(&mut self, id: i64) -> StorageResult<bool> {
        let Some(position) = self.books.iter().position(|b| b.id == id) else {
            return Ok(false);
        };
        let removed = self.books.remove(position);
        if let Err(e) = self.save() {
            self.books.insert(position, removed);
            return Err(e);
        }
        Ok(true)
    }

    fn find_by_category(
        &self,
        query: &str,
        policy: CategoryMatch,
    ) -> StorageResult<Vec<StoredBook>> {
        Ok(self
            .books
            .iter()
            .filter(|b| policy.matches(&b.book.category, query))
            .cloned()
            .collect())
    }

    fn count(&self) -> StorageResult<u64> {
        Ok(self.books.len() as u64)
    }
}
