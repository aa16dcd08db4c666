use serde::Deserialize;
use std::time::Duration;

/// User agent sent with every page request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; ProductCrawler/2.0)";

/// Main configuration structure for Prowl
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,

    pub output: OutputConfig,

    /// Seed URLs, one crawl run each
    pub seeds: Vec<String>,

    /// Upper bound for the whole invocation (seconds)
    #[serde(rename = "run-timeout-secs")]
    pub run_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            output: OutputConfig::default(),
            seeds: vec!["https://dentalstall.com/shop/".to_string()],
            run_timeout_secs: 3600,
        }
    }
}

impl Config {
    /// Overall deadline for all seed crawls
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

/// Crawler behavior configuration, read-only for the duration of a run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Substrings that mark a URL as a product page
    #[serde(rename = "product-url-patterns")]
    pub product_url_patterns: Vec<String>,

    /// Maximum number of link hops from the seed URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Pause applied at the start of every task (milliseconds)
    #[serde(rename = "rate-limit-ms")]
    pub rate_limit_ms: u64,

    /// Maximum number of simultaneously in-flight fetches
    #[serde(rename = "max-concurrent-workers")]
    pub max_concurrent_workers: u32,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Also record errors from non-root tasks in the result
    #[serde(rename = "collect-branch-errors")]
    pub collect_branch_errors: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            product_url_patterns: ["/product/", "/products/", "/item/", "/p/"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            max_depth: 1,
            rate_limit_ms: 500,
            max_concurrent_workers: 10,
            request_timeout_ms: 30_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            collect_branch_errors: false,
        }
    }
}

impl CrawlerConfig {
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON file the results are written to
    #[serde(rename = "result-path")]
    pub result_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            result_path: "crawler_result.json".to_string(),
        }
    }
}
