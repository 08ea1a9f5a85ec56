//! Crawler module for the three-stage catalog crawl
//!
//! This module contains the crawling logic:
//! - HTTP fetching and outcome classification
//! - HTML parsing for category, listing and detail pages
//! - Request scheduling (concurrency limit and politeness interval)
//! - The categories, listings and details stages
//!
//! Each stage reads the previous stage's output file, so stages can be run
//! one at a time or chained with [`run_crawl`].

mod categories;
mod coordinator;
mod details;
mod fetcher;
mod listings;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, FetchedPage, Stage, StageOutcome};
pub use details::{detail_targets, DetailTarget};
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use listings::CategoryListing;
pub use parser::{parse_categories, parse_detail_page, parse_listing_page, ListingPage};
pub use scheduler::{FetchPermit, Scheduler};
