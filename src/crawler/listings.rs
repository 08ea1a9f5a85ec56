//! Listing stage: `categories.json` → `books_by_categories.json`
//!
//! Categories are crawled concurrently, one task each. Within a category
//! pagination is sequential since every next-page URL comes from the page
//! before it.

use crate::crawler::coordinator::{Coordinator, Stage, StageOutcome};
use crate::crawler::parser::parse_listing_page;
use crate::records::{Category, ListingRecord};
use crate::state::CrawlCounters;
use crate::storage::{read_json_array, write_json_array};
use crate::HarvestError;
use std::collections::HashSet;
use std::path::Path;
use tokio::task::JoinSet;

/// Listing records and counters for one category
#[derive(Debug, Default)]
pub struct CategoryListing {
    pub records: Vec<ListingRecord>,
    pub counters: CrawlCounters,
}

impl Coordinator {
    /// Reads the category file and writes every item card of every category
    ///
    /// Records are written in category order, then page order.
    pub async fn run_listings(&self) -> Result<StageOutcome, HarvestError> {
        let input_path = self.config().output.categories_path.clone();
        let Some(categories) = read_json_array::<Category>(Path::new(&input_path))? else {
            return Ok(StageOutcome::missing(&input_path, Stage::Categories));
        };

        tracing::info!(
            "Listings stage: {} categories from {}",
            categories.len(),
            input_path
        );

        let mut tasks = JoinSet::new();
        for (index, category) in categories.into_iter().enumerate() {
            let coordinator = self.clone();
            tasks.spawn(async move {
                let listing = coordinator.crawl_category(&category).await;
                (index, listing)
            });
        }

        let mut per_category: Vec<(usize, CategoryListing)> = Vec::with_capacity(tasks.len());
        let mut counters = CrawlCounters::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(listing))) => per_category.push((index, listing)),
                Ok((index, Err(e))) => {
                    tracing::error!("Category #{} aborted: {}", index, e);
                    counters.failed += 1;
                }
                Err(e) => {
                    tracing::error!("Category task panicked: {}", e);
                    counters.failed += 1;
                }
            }
        }

        per_category.sort_by_key(|(index, _)| *index);
        let mut records = Vec::new();
        for (_, listing) in per_category {
            counters.merge(listing.counters);
            records.extend(listing.records);
        }

        let output = Path::new(&self.config().output.listings_path);
        write_json_array(output, &records)?;
        tracing::info!("Wrote {} listing records to {}", records.len(), output.display());

        counters.log_summary("Listings");
        Ok(StageOutcome::Completed(counters))
    }

    /// Follows one category's pagination to the end
    ///
    /// Stops when a page has no next link, when the next link points at a page
    /// already visited, or when `max-pages-per-category` pages were fetched.
    /// The last two are recorded as anomalies. A page that fails to fetch ends
    /// the category with what was collected so far.
    pub async fn crawl_category(&self, category: &Category) -> Result<CategoryListing, HarvestError> {
        let page_cap = self.config().crawler.max_pages_per_category.max(1);
        let mut listing = CategoryListing::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut next_url = Some(category.url_absolute.clone());

        while let Some(url) = next_url.take() {
            if visited.contains(&url) {
                listing.counters.record_anomaly(format!(
                    "Category '{}': pagination returned to {}",
                    category.name, url
                ));
                break;
            }

            if listing.counters.pages_fetched >= u64::from(page_cap) {
                listing.counters.record_anomaly(format!(
                    "Category '{}': stopped after {} pages",
                    category.name, page_cap
                ));
                break;
            }
            visited.insert(url.clone());

            let Some(page) = self.fetch_html(&url).await? else {
                listing.counters.failed += 1;
                break;
            };
            listing.counters.pages_fetched += 1;

            let parsed = parse_listing_page(&page.body, &page.url, &category.name);
            tracing::debug!(
                "Category '{}': {} items on {}",
                category.name,
                parsed.records.len(),
                page.url
            );

            // The served URL counts as visited too, in case of redirects
            visited.insert(page.url.to_string());

            listing.counters.records_emitted += parsed.records.len() as u64;
            listing.records.extend(parsed.records);
            next_url = parsed.next_page;
        }

        Ok(listing)
    }
}
