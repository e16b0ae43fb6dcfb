use serde::Deserialize;

/// Main configuration structure for Kumo-Swarm
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub crawler: CrawlerConfig,
    pub retry: RetryConfig,
    pub fetcher: FetcherConfig,
    pub storage: StorageConfig,
}

/// What to crawl: the target domain and the seed URLs
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Only links whose resolved host equals this domain are followed
    pub domain: String,

    /// Initial URLs pushed into the frontier (only if it is empty)
    pub seeds: Vec<String>,
}

/// Worker pool behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent workers
    pub workers: u32,

    /// Controller completion-check interval (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Initial sleep when a worker finds the frontier empty (milliseconds)
    #[serde(rename = "idle-backoff-ms")]
    pub idle_backoff_ms: u64,

    /// Cap on the idle backoff sleep (milliseconds)
    #[serde(rename = "max-idle-backoff-ms")]
    pub max_idle_backoff_ms: u64,
}

/// Retry policy configuration for the fetch path
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total attempts before the fetch degrades to "no result"
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Base wait between attempts (milliseconds); jitter multiplies this
    /// by a random factor in [1, 2)
    #[serde(rename = "base-wait-ms")]
    pub base_wait_ms: u64,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header value
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Charsets tried in order when decoding response bytes
    #[serde(default = "default_charsets")]
    pub charsets: Vec<String>,

    /// Optional HTTP(S) proxy URL
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_charsets() -> Vec<String> {
    vec!["utf-8".to_string()]
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database backing frontier, visited set and pages
    #[serde(rename = "database-path")]
    pub database_path: String,
}
