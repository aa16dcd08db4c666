//! Result aggregation for a single crawl run
//!
//! Every task of a run reports into one `ResultAggregator`. Products and
//! branch errors are appended under a mutex; the error slot is written at most
//! once and only by the root task.

use crate::CrawlError;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// A fetched URL that matched one of the product patterns
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Product {
    pub url: String,
}

/// An error from a non-root task, kept only when branch error collection is enabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchError {
    pub url: String,
    pub depth: u32,
    pub error: CrawlError,
}

/// Outcome of one crawl run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    /// The seed URL the run started from
    pub domain: String,

    /// Product pages in the order they were recorded
    pub products: Vec<Product>,

    /// Terminal error of the root task, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CrawlError>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branch_errors: Vec<BranchError>,
}

impl CrawlResult {
    /// Returns true if `url` was recorded as a product
    pub fn contains_product(&self, url: &str) -> bool {
        self.products.iter().any(|p| p.url == url)
    }
}

#[derive(Debug, Default)]
struct Aggregate {
    products: Vec<Product>,
    error: Option<CrawlError>,
    branch_errors: Vec<BranchError>,
}

/// Collects the results of every task of a run
#[derive(Debug)]
pub struct ResultAggregator {
    domain: String,
    inner: Mutex<Aggregate>,
}

impl ResultAggregator {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            inner: Mutex::new(Aggregate::default()),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn record_product(&self, product: Product) {
        self.lock().products.push(product);
    }

    /// Records the run's terminal error
    ///
    /// The first error wins. Callers must only pass errors of the root task.
    pub fn set_error(&self, error: CrawlError) {
        let mut inner = self.lock();
        if let Some(existing) = &inner.error {
            tracing::debug!("Keeping run error '{}', ignoring '{}'", existing, error);
            return;
        }
        inner.error = Some(error);
    }

    pub fn record_branch_error(&self, branch_error: BranchError) {
        self.lock().branch_errors.push(branch_error);
    }

    /// Moves the collected state out into a `CrawlResult`
    ///
    /// Called once every task of the run has terminated; the aggregator is
    /// left empty afterwards.
    pub fn finish(&self) -> CrawlResult {
        let aggregate = std::mem::take(&mut *self.lock());

        CrawlResult {
            domain: self.domain.clone(),
            products: aggregate.products,
            error: aggregate.error,
            branch_errors: aggregate.branch_errors,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Aggregate> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
