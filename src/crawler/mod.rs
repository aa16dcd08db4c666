//! Crawler module for product page discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` seam
//! - HTML parsing and anchor extraction
//! - The run-scoped visited set and fetch admission gate
//! - Recursive, depth-bounded task scheduling with per-task rate pacing
//! - Result aggregation and multi-seed coordination

mod aggregator;
mod coordinator;
mod fetcher;
mod limiter;
mod parser;
mod scheduler;
mod visited;

pub use aggregator::{BranchError, CrawlResult, Product, ResultAggregator};
pub use coordinator::{crawl_seeds, run_crawl, Coordinator, Crawler, SeedResults};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use limiter::{ConcurrencyLimiter, FetchSlot};
pub use parser::extract_links;
pub use scheduler::{CrawlTask, Scheduler};
pub use visited::VisitedSet;
