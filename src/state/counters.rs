/// Running totals for one stage run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlCounters {
    /// Pages fetched successfully
    pub pages_fetched: u64,

    /// Records produced by extraction
    pub records_emitted: u64,

    /// Records appended to the sink
    pub inserted: u64,

    /// Records overwritten in place
    pub updated: u64,

    /// Fetches, parses or writes that failed
    pub failed: u64,

    /// Human-readable notes about suspicious site behavior (pagination loops, caps)
    pub anomalies: Vec<String>,
}

impl CrawlCounters {
    pub fn record_anomaly(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("Anomaly: {}", message);
        self.anomalies.push(message);
    }

    /// Adds another run's totals to these
    pub fn merge(&mut self, other: CrawlCounters) {
        self.pages_fetched += other.pages_fetched;
        self.records_emitted += other.records_emitted;
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.failed += other.failed;
        self.anomalies.extend(other.anomalies);
    }

    /// Logs the totals at info level under `stage`
    pub fn log_summary(&self, stage: &str) {
        tracing::info!(
            "{} stage finished: {} pages fetched, {} records, {} inserted, {} updated, {} failed, {} anomalies",
            stage,
            self.pages_fetched,
            self.records_emitted,
            self.inserted,
            self.updated,
            self.failed,
            self.anomalies.len()
        );
    }
}
