//! Recursive, depth-bounded task scheduler
//!
//! This module drives a single crawl run:
//! - One task per discovered link, spawned without waiting for it
//! - A fixed per-task pause before any other work
//! - Deduplication through the run's visited set
//! - Fetch admission through the run's concurrency limiter
//! - Product classification and result aggregation
//!
//! All spawned tasks are tracked, and the run is only complete once the root
//! task and every descendant have terminated.

use crate::config::CrawlerConfig;
use crate::crawler::aggregator::{BranchError, CrawlResult, Product, ResultAggregator};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::crawler::parser::extract_links;
use crate::crawler::visited::VisitedSet;
use crate::state::TaskState;
use crate::url::{is_product_url, resolve_url};
use crate::CrawlError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Outcome of a single task: the terminal state it reached, or the error that stopped it
pub type TaskOutcome = Result<TaskState, CrawlError>;

/// A URL to process and its distance in link hops from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: String,
    pub depth: u32,
}

impl CrawlTask {
    /// The root task of a run
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: 0,
        }
    }

    /// A task for a link found on this task's page
    pub fn child(&self, url: String) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

/// Run-scoped state shared by every task of one crawl
///
/// A scheduler is created per seed URL and discarded once its result has been
/// taken, so every run starts with an empty visited set.
pub struct Scheduler {
    config: Arc<CrawlerConfig>,
    fetcher: Arc<dyn PageFetcher>,
    visited: VisitedSet,
    limiter: ConcurrencyLimiter,
    aggregator: ResultAggregator,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl Scheduler {
    /// Creates the state for a run rooted at `seed`
    pub fn new(
        config: Arc<CrawlerConfig>,
        fetcher: Arc<dyn PageFetcher>,
        seed: &str,
        cancel: CancellationToken,
    ) -> Arc<Self> {
        let limiter = ConcurrencyLimiter::new(config.max_concurrent_workers as usize);

        Arc::new(Self {
            config,
            fetcher,
            visited: VisitedSet::new(),
            limiter,
            aggregator: ResultAggregator::new(seed),
            cancel,
            tracker: TaskTracker::new(),
        })
    }

    /// Runs the whole crawl: the root task, then every descendant
    ///
    /// Only the root task's error is recorded in the result. Errors of other
    /// tasks are logged, and kept in `branch_errors` when enabled.
    pub async fn run(self: Arc<Self>) -> CrawlResult {
        let root = CrawlTask::seed(self.aggregator.domain());
        tracing::info!("Starting crawl of {}", root.url);

        let outcome = Arc::clone(&self).expand(root.clone()).await;
        if let Err(e) = &outcome {
            log_task_error(&root, e);
            self.aggregator.set_error(e.clone());
        }

        self.join().await;

        if let Ok(TaskState::AwaitingChildren) = outcome {
            log_transition(&root, TaskState::AwaitingChildren, TaskState::Done);
        }

        let result = self.aggregator.finish();
        tracing::info!(
            "Crawl of {} finished: {} products{}",
            result.domain,
            result.products.len(),
            if result.error.is_some() { " (with error)" } else { "" }
        );
        result
    }

    /// Processes one task, spawning a child task for every link on its page
    ///
    /// The returned future is boxed so that tasks can spawn further tasks of
    /// the same type.
    pub fn expand(
        self: Arc<Self>,
        task: CrawlTask,
    ) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send>> {
        Box::pin(async move {
            if self.cancel.is_cancelled() {
                return Err(CrawlError::Cancelled);
            }

            if task.depth > self.config.max_depth {
                return Ok(log_transition(
                    &task,
                    TaskState::Created,
                    TaskState::DepthExceeded,
                ));
            }

            // Paid by every task, including ones that turn out to be duplicates
            self.pace().await?;

            if !self.visited.check_and_insert(&task.url) {
                return Ok(log_transition(
                    &task,
                    TaskState::Created,
                    TaskState::Duplicate,
                ));
            }

            log_transition(&task, TaskState::Created, TaskState::Fetching);
            let hrefs = self.fetch_and_parse(&task).await?;
            log_transition(&task, TaskState::Fetching, TaskState::Expanding);

            if is_product_url(&task.url, &self.config.product_url_patterns) {
                tracing::info!("Found product {}", task.url);
                self.aggregator.record_product(Product {
                    url: task.url.clone(),
                });
            }

            if task.depth < self.config.max_depth {
                for href in hrefs {
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    let child = task.child(resolve_url(&task.url, &href));
                    self.spawn_child(child);
                }
            }

            // Only the root waits for descendants; see `run`
            let next = if task.is_root() {
                TaskState::AwaitingChildren
            } else {
                TaskState::Done
            };
            Ok(log_transition(&task, TaskState::Expanding, next))
        })
    }

    fn spawn_child(self: &Arc<Self>, child: CrawlTask) {
        let scheduler = Arc::clone(self);

        self.tracker.spawn(async move {
            let outcome = Arc::clone(&scheduler).expand(child.clone()).await;
            if let Err(e) = outcome {
                log_task_error(&child, &e);
                if scheduler.config.collect_branch_errors && !e.is_cancelled() {
                    scheduler.aggregator.record_branch_error(BranchError {
                        url: child.url,
                        depth: child.depth,
                        error: e,
                    });
                }
            }
        });
    }

    /// Fixed per-task pause; cut short by cancellation
    async fn pace(&self) -> Result<(), CrawlError> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(CrawlError::Cancelled),
            _ = tokio::time::sleep(self.config.rate_limit()) => Ok(()),
        }
    }

    /// Fetches and parses the task's page while holding a limiter slot
    ///
    /// The slot is released when this returns, on every path.
    async fn fetch_and_parse(&self, task: &CrawlTask) -> Result<Vec<String>, CrawlError> {
        let _slot = tokio::select! {
            _ = self.cancel.cancelled() => return Err(CrawlError::Cancelled),
            slot = self.limiter.acquire() => slot?,
        };

        // No new fetch may start once the run is cancelled
        if self.cancel.is_cancelled() {
            return Err(CrawlError::Cancelled);
        }

        tracing::debug!("Current URL {} (depth {})", task.url, task.depth);
        let document = self.fetcher.fetch(&task.url, &self.cancel).await?;

        Ok(extract_links(&document))
    }

    /// Waits for every spawned task to terminate
    ///
    /// The join is the root's last suspension point: if the run was cancelled
    /// before every descendant terminated, the root reports the cancellation.
    async fn join(&self) {
        self.tracker.close();

        tokio::select! {
            biased;
            _ = self.tracker.wait() => {}
            _ = self.cancel.cancelled() => {
                // Tasks still queued for a slot give up instead of fetching
                self.limiter.close();
                tracing::warn!(
                    "Crawl of {} cancelled with {} tasks pending",
                    self.aggregator.domain(),
                    self.tracker.len()
                );
                self.tracker.wait().await;
            }
        }

        if self.cancel.is_cancelled() {
            self.aggregator.set_error(CrawlError::Cancelled);
        }
    }
}

fn log_transition(task: &CrawlTask, from: TaskState, to: TaskState) -> TaskState {
    debug_assert!(from.can_transition_to(to), "{} -> {}", from, to);
    if to.is_terminal() {
        tracing::debug!("{} (depth {}) {}", task.url, task.depth, to);
    } else {
        tracing::trace!("{} (depth {}): {} -> {}", task.url, task.depth, from, to);
    }
    to
}

fn log_task_error(task: &CrawlTask, error: &CrawlError) {
    let state = TaskState::from_error(error);
    if error.is_cancelled() {
        tracing::debug!("{} (depth {}) {}", task.url, task.depth, state);
    } else {
        tracing::warn!("{} (depth {}) {}: {}", task.url, task.depth, state, error);
    }
}
