use serde::Deserialize;

/// Main configuration structure for Book-Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Catalog page listing every category
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Maximum number of page fetches in flight
    #[serde(rename = "max-concurrent-requests", default = "default_concurrency")]
    pub max_concurrent_requests: u32,

    /// Minimum gap between two request starts (milliseconds)
    #[serde(rename = "request-interval-ms", default)]
    pub request_interval_ms: u64,

    /// Upper bound on listing pages followed within one category
    #[serde(rename = "max-pages-per-category", default = "default_page_cap")]
    pub max_pages_per_category: u32,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Locations of the stage files
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Output of the category stage, input of the listing stage
    #[serde(rename = "categories-path")]
    pub categories_path: String,

    /// Output of the listing stage, input of the detail stage
    #[serde(rename = "listings-path")]
    pub listings_path: String,

    /// JSON array of detail records (file backend)
    #[serde(rename = "details-path")]
    pub details_path: String,
}

/// Which sink receives detail records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Whole-array JSON file keyed by detail URL
    #[default]
    File,
    /// SQLite table keyed by surrogate id
    Table,
}

/// Persistence sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file (table backend)
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            database_path: default_database_path(),
        }
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_concurrency() -> u32 {
    8
}

fn default_page_cap() -> u32 {
    100
}

fn default_database_path() -> String {
    "books.db".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}
