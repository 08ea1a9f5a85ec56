//! Detail stage: `books_by_categories.json` → book store
//!
//! Detail pages are fetched and parsed concurrently. Writes go through a
//! single loop that owns the store, and records are written in first-seen
//! input order regardless of which fetch finishes first.

use crate::crawler::coordinator::{Coordinator, Stage, StageOutcome};
use crate::crawler::parser::parse_detail_page;
use crate::records::{BookRecord, ListingRecord};
use crate::state::{CrawlContext, WriteOutcome};
use crate::storage::{read_json_array, BookStore};
use crate::HarvestError;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tokio::task::JoinSet;

/// One detail page to visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTarget {
    pub url: String,
    /// Listing-stage category, used when the breadcrumb is too short
    pub fallback_category: String,
}

/// Collapses listing rows to one target per distinct detail URL
///
/// The first row for a URL decides its fallback category and position.
/// Rows with an empty detail URL are dropped.
pub fn detail_targets(listings: &[ListingRecord]) -> Vec<DetailTarget> {
    let mut seen = HashSet::new();
    listings
        .iter()
        .filter(|row| {
            let url = row.detail_url.trim();
            if url.is_empty() {
                tracing::warn!("Listing row '{}' has no detail URL, skipping", row.title);
                return false;
            }
            seen.insert(url.to_string())
        })
        .map(|row| DetailTarget {
            url: row.detail_url.trim().to_string(),
            fallback_category: row.category.clone(),
        })
        .collect()
}

impl Coordinator {
    /// Visits every listed detail page and writes the records to `store`
    ///
    /// The store's [`WriteStrategy`](crate::storage::WriteStrategy) decides
    /// between overwrite-by-URL and append. A failed fetch or a failed write
    /// is logged and counted; the stage moves on to the next item.
    pub async fn run_details(&self, store: &mut dyn BookStore) -> Result<StageOutcome, HarvestError> {
        let input_path = self.config().output.listings_path.clone();
        let Some(listings) = read_json_array::<ListingRecord>(Path::new(&input_path))? else {
            return Ok(StageOutcome::missing(&input_path, Stage::Listings));
        };

        let targets = detail_targets(&listings);
        let mut context = CrawlContext::from_store(store)?;

        tracing::info!(
            "Details stage: {} distinct pages from {} listing rows, {} already stored, writing {}",
            targets.len(),
            listings.len(),
            context.indexed_urls(),
            store.write_strategy().as_str()
        );

        let mut tasks = JoinSet::new();
        for (index, target) in targets.into_iter().enumerate() {
            let coordinator = self.clone();
            tasks.spawn(async move {
                let result = coordinator.scrape_detail(&target).await;
                (index, result)
            });
        }

        // Results wait here until every earlier index has been written
        let mut pending: BTreeMap<usize, Option<BookRecord>> = BTreeMap::new();
        let mut next_to_write = 0usize;

        while let Some(joined) = tasks.join_next().await {
            let (index, result) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    // A panicked task never fills its slot; later records flush after the loop
                    tracing::error!("Detail task panicked: {}", e);
                    context.counters_mut().failed += 1;
                    continue;
                }
            };

            let record = match result {
                Ok(Some(book)) => {
                    context.counters_mut().pages_fetched += 1;
                    context.counters_mut().records_emitted += 1;
                    Some(book)
                }
                Ok(None) => {
                    context.counters_mut().failed += 1;
                    None
                }
                Err(e) => {
                    tracing::error!("Detail page #{} failed: {}", index, e);
                    context.counters_mut().failed += 1;
                    None
                }
            };
            pending.insert(index, record);

            while let Some(record) = pending.remove(&next_to_write) {
                next_to_write += 1;
                if let Some(book) = record {
                    write_one(&mut context, store, book);
                }
            }
        }

        for (_, record) in std::mem::take(&mut pending) {
            if let Some(book) = record {
                write_one(&mut context, store, book);
            }
        }

        let counters = context.into_counters();
        counters.log_summary("Details");
        Ok(StageOutcome::Completed(counters))
    }

    /// Fetches and parses one detail page
    ///
    /// # Returns
    ///
    /// * `Ok(Some(book))` - Parsed record
    /// * `Ok(None)` - The page could not be fetched (logged)
    pub async fn scrape_detail(&self, target: &DetailTarget) -> Result<Option<BookRecord>, HarvestError> {
        let Some(page) = self.fetch_html(&target.url).await? else {
            return Ok(None);
        };
        Ok(Some(parse_detail_page(
            &page.body,
            &page.url,
            &target.fallback_category,
        )))
    }
}

fn write_one(context: &mut CrawlContext, store: &mut dyn BookStore, book: BookRecord) {
    let url = book.url_page.clone();
    match context.write_record(store, book) {
        Ok(WriteOutcome::Inserted(id)) => tracing::debug!("Inserted #{} {}", id, url),
        Ok(WriteOutcome::Updated(id)) => tracing::debug!("Updated #{} {}", id, url),
        Err(e) => {
            tracing::error!("Failed to store {}: {}", url, e);
            context.counters_mut().failed += 1;
        }
    }
}
