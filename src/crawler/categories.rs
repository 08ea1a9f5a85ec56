//! Category stage: start page → `categories.json`

use crate::crawler::coordinator::{Coordinator, StageOutcome};
use crate::crawler::parser::parse_categories;
use crate::state::CrawlCounters;
use crate::storage::write_json_array;
use crate::HarvestError;
use std::path::Path;

impl Coordinator {
    /// Fetches the start page and writes one record per category link
    ///
    /// # Returns
    ///
    /// * `Ok(StageOutcome::Completed)` - Category file written
    /// * `Err(HarvestError::Fetch)` - The start page could not be fetched
    pub async fn run_categories(&self) -> Result<StageOutcome, HarvestError> {
        let start_url = self.config().crawler.start_url.trim().to_string();
        tracing::info!("Categories stage: fetching {}", start_url);

        let page = self
            .fetch_html(&start_url)
            .await?
            .ok_or_else(|| HarvestError::Fetch {
                url: start_url.clone(),
                reason: "start page unavailable".to_string(),
            })?;

        let categories = parse_categories(&page.body, &page.url);
        if categories.is_empty() {
            tracing::warn!("No category links found on {}", page.url);
        }

        let output = Path::new(&self.config().output.categories_path);
        write_json_array(output, &categories)?;
        tracing::info!(
            "Wrote {} categories to {}",
            categories.len(),
            output.display()
        );

        let counters = CrawlCounters {
            pages_fetched: 1,
            records_emitted: categories.len() as u64,
            ..Default::default()
        };
        counters.log_summary("Categories");

        Ok(StageOutcome::Completed(counters))
    }
}
