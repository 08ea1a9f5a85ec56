//! Crawler coordinator
//!
//! The [`Coordinator`] owns what every stage shares: the configuration, the
//! HTTP client and the request scheduler. It is cheap to clone, and stage
//! tasks hold their own copy.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchResult};
use crate::crawler::scheduler::Scheduler;
use crate::state::CrawlCounters;
use crate::storage::{open_book_store, BookStore};
use crate::url::parse_base_url;
use crate::HarvestError;
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// The three crawl stages, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Categories,
    Listings,
    Details,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Categories => "categories",
            Self::Listings => "listings",
            Self::Details => "details",
        };
        f.write_str(name)
    }
}

/// How a stage run ended
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// The stage ran; totals attached
    Completed(CrawlCounters),

    /// The input file from the previous stage does not exist
    MissingInput {
        /// Expected input file
        path: PathBuf,
        /// Stage that produces it
        run_first: Stage,
    },
}

impl StageOutcome {
    pub(crate) fn missing(path: &str, run_first: Stage) -> Self {
        let path = PathBuf::from(path);
        tracing::error!(
            "Input file {} not found. Run the {} stage first.",
            path.display(),
            run_first
        );
        Self::MissingInput { path, run_first }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// A fetched HTML page and the URL its links resolve against
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub body: String,
}

/// Main crawler coordinator structure
#[derive(Clone)]
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    scheduler: Arc<Scheduler>,
}

impl Coordinator {
    /// Creates a coordinator from a validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Client and scheduler ready
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.user_agent)?;
        let scheduler = Scheduler::new(&config.crawler);

        Ok(Self {
            config: Arc::new(config),
            client,
            scheduler: Arc::new(scheduler),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches one page through the scheduler
    ///
    /// # Returns
    ///
    /// * `Ok(Some(page))` - HTML page fetched
    /// * `Ok(None)` - Fetch failed; already logged
    /// * `Err(HarvestError)` - The scheduler is unusable
    pub async fn fetch_html(&self, url: &str) -> Result<Option<FetchedPage>, HarvestError> {
        let _permit = self.scheduler.acquire().await?;

        match fetch_page(&self.client, url).await {
            FetchResult::Success {
                final_url,
                status_code,
                body,
            } => {
                tracing::debug!("Fetched {} ({}, {} bytes)", final_url, status_code, body.len());
                let page_url = parse_base_url(&final_url).or_else(|_| parse_base_url(url))?;
                Ok(Some(FetchedPage {
                    url: page_url,
                    body,
                }))
            }
            failure => {
                tracing::warn!(
                    "Failed to fetch {}: {}",
                    url,
                    failure.failure_reason().unwrap_or_default()
                );
                Ok(None)
            }
        }
    }

    /// Runs the categories, listings and details stages in order
    ///
    /// Stops after the first stage that does not complete.
    ///
    /// # Arguments
    ///
    /// * `store` - Sink for the details stage
    pub async fn run_all(
        &self,
        store: &mut dyn BookStore,
    ) -> Result<Vec<(Stage, StageOutcome)>, HarvestError> {
        let mut outcomes = Vec::new();

        let outcome = self.run_categories().await?;
        let proceed = outcome.is_completed();
        outcomes.push((Stage::Categories, outcome));
        if !proceed {
            return Ok(outcomes);
        }

        let outcome = self.run_listings().await?;
        let proceed = outcome.is_completed();
        outcomes.push((Stage::Listings, outcome));
        if !proceed {
            return Ok(outcomes);
        }

        let outcome = self.run_details(store).await?;
        outcomes.push((Stage::Details, outcome));

        Ok(outcomes)
    }
}

/// Runs the full pipeline against the configured sink
///
/// This is the main entry point used by the `crawl` command.
pub async fn run_crawl(config: Config) -> Result<Vec<(Stage, StageOutcome)>, HarvestError> {
    let mut store = open_book_store(&config)?;
    let coordinator = Coordinator::new(config)?;
    coordinator.run_all(store.as_mut()).await
}
