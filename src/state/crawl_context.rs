use super::CrawlCounters;
use crate::records::BookRecord;
use crate::storage::{BookStore, StorageResult, WriteStrategy};
use std::collections::HashMap;

/// What happened to a record handed to [`CrawlContext::write_record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted(i64),
    Updated(i64),
}

/// Mutable state owned by one detail-stage run
///
/// Holds the detail URL → id index loaded from the sink at start-up and the
/// running counters. A fresh context is built for every run; nothing is
/// shared between runs.
#[derive(Debug, Default)]
pub struct CrawlContext {
    index: HashMap<String, i64>,
    counters: CrawlCounters,
}

impl CrawlContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the URL index from the current sink contents
    ///
    /// When the sink holds duplicate URLs (append-only backends) the first
    /// row wins.
    pub fn from_store(store: &dyn BookStore) -> StorageResult<Self> {
        let mut index = HashMap::new();
        for stored in store.get_all()? {
            index.entry(stored.book.url_page).or_insert(stored.id);
        }
        Ok(Self {
            index,
            counters: CrawlCounters::default(),
        })
    }

    /// Id of the record already stored for `url`, if any
    pub fn existing_id(&self, url: &str) -> Option<i64> {
        self.index.get(url).copied()
    }

    /// Number of distinct URLs known to the index
    pub fn indexed_urls(&self) -> usize {
        self.index.len()
    }

    pub fn counters(&self) -> &CrawlCounters {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut CrawlCounters {
        &mut self.counters
    }

    pub fn into_counters(self) -> CrawlCounters {
        self.counters
    }

    /// Writes one scraped record to `store` using the store's strategy
    ///
    /// With [`WriteStrategy::UpsertByUrl`] a known URL is overwritten in
    /// place (full replace); otherwise the record is appended and indexed.
    /// [`WriteStrategy::AppendOnly`] always appends. Counters are updated
    /// for successful writes only.
    pub fn write_record(
        &mut self,
        store: &mut dyn BookStore,
        book: BookRecord,
    ) -> StorageResult<WriteOutcome> {
        let url = book.url_page.clone();

        if store.write_strategy() == WriteStrategy::UpsertByUrl {
            if let Some(id) = self.existing_id(&url) {
                if store.update(id, book.clone())? {
                    self.counters.updated += 1;
                    return Ok(WriteOutcome::Updated(id));
                }
                // Row vanished since the index was built; fall through to insert
                self.index.remove(&url);
            }
        }

        let id = store.insert(book)?;
        self.index.entry(url).or_insert(id);
        self.counters.inserted += 1;
        Ok(WriteOutcome::Inserted(id))
    }
}
