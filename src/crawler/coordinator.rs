//! Crawler coordinator - per-seed runs and multi-seed orchestration
//!
//! This module contains:
//! - `Crawler`: builds one run per seed URL and returns its `CrawlResult`
//! - `crawl_seeds`: runs every seed concurrently and keys the results by seed index
//! - `Coordinator` / `run_crawl`: the full invocation, with the run timeout,
//!   result file output and final summary

use crate::config::{validate_crawler_config, Config, CrawlerConfig};
use crate::crawler::aggregator::CrawlResult;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::scheduler::Scheduler;
use crate::output::write_results;
use crate::ProwlError;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Results of a multi-seed crawl, keyed by the seed's position in the seed list
pub type SeedResults = BTreeMap<usize, CrawlResult>;

/// Product crawler for a fixed configuration
///
/// A `Crawler` holds no per-run state; every call to [`Crawler::crawl`] starts
/// from an empty visited set, so one instance can serve many seeds concurrently.
#[derive(Clone)]
pub struct Crawler {
    config: Arc<CrawlerConfig>,
    fetcher: Arc<dyn PageFetcher>,
}

impl Crawler {
    /// Creates a crawler that fetches pages over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(ProwlError)` - Invalid configuration or HTTP client construction failure
    pub fn new(config: CrawlerConfig) -> Result<Self, ProwlError> {
        validate_crawler_config(&config)?;
        let fetcher = HttpFetcher::new(&config)?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates a crawler that fetches pages through `fetcher`
    pub fn with_fetcher(
        config: CrawlerConfig,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, ProwlError> {
        validate_crawler_config(&config)?;

        Ok(Self {
            config: Arc::new(config),
            fetcher,
        })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Crawls from `seed` and returns once every spawned task has terminated
    ///
    /// Cancelling `cancel` (or any parent token) stops the run at the next
    /// suspension point of each task; the partial result is still returned,
    /// with `error` set to the cancellation.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use prowl::config::CrawlerConfig;
    /// use prowl::crawler::Crawler;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let crawler = Crawler::new(CrawlerConfig::default())?;
    /// let result = crawler
    ///     .crawl("https://shop.test/", &CancellationToken::new())
    ///     .await;
    /// println!("{} products", result.products.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(&self, seed: &str, cancel: &CancellationToken) -> CrawlResult {
        let scheduler = Scheduler::new(
            Arc::clone(&self.config),
            Arc::clone(&self.fetcher),
            seed,
            cancel.child_token(),
        );

        scheduler.run().await
    }
}

/// Crawls every seed concurrently with a shared crawler
///
/// Each seed gets its own run; a failing seed never affects the others. Seeds
/// whose result carries an error are logged.
pub async fn crawl_seeds(
    crawler: &Crawler,
    seeds: &[String],
    cancel: &CancellationToken,
) -> SeedResults {
    let mut tasks = JoinSet::new();

    for (index, seed) in seeds.iter().enumerate() {
        let crawler = crawler.clone();
        let seed = seed.clone();
        let cancel = cancel.clone();

        tasks.spawn(async move { (index, crawler.crawl(&seed, &cancel).await) });
    }

    let mut results = SeedResults::new();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => {
                if let Some(error) = &result.error {
                    tracing::error!("Crawling error for {}: {}", result.domain, error);
                }
                results.insert(index, result);
            }
            Err(e) => tracing::error!("Seed crawl task failed: {}", e),
        }
    }

    results
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    crawler: Crawler,
}

impl Coordinator {
    /// Creates a new coordinator instance
    pub fn new(config: Config) -> Result<Self, ProwlError> {
        let crawler = Crawler::new(config.crawler.clone())?;
        Ok(Self { config, crawler })
    }

    /// Crawls all configured seeds and writes the result file
    ///
    /// The configured run timeout cancels `cancel` when it expires. Results
    /// gathered up to that point are still written.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<SeedResults, ProwlError> {
        tracing::info!("Crawling {} seed URLs", self.config.seeds.len());

        let deadline = arm_deadline(cancel.clone(), self.config.run_timeout());
        let results = crawl_seeds(&self.crawler, &self.config.seeds, cancel).await;
        deadline.abort();

        write_results(&results, Path::new(&self.config.output.result_path))?;

        Ok(results)
    }
}

/// Runs the main crawl operation
///
/// # Example
///
/// ```no_run
/// use prowl::config::load_config;
/// use prowl::crawler::run_crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("prowl.toml"))?;
/// run_crawl(config, CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, cancel: CancellationToken) -> Result<SeedResults, ProwlError> {
    Coordinator::new(config)?.run(&cancel).await
}

/// Cancels `cancel` once `timeout` has elapsed
fn arm_deadline(cancel: CancellationToken, timeout: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(timeout) => {
                tracing::warn!("Run timeout of {:?} reached, cancelling crawl", timeout);
                cancel.cancel();
            }
        }
    })
}
