//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlContext`: per-run URL index and write policy application
//! - `CrawlCounters`: per-stage totals and recorded anomalies

mod counters;
mod crawl_context;

pub use counters::CrawlCounters;
pub use crawl_context::{CrawlContext, WriteOutcome};
