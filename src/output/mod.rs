//! Output module for crawl results
//!
//! This module handles:
//! - Writing the per-seed results to a JSON file
//! - Computing and printing the aggregate summary of an invocation

mod json;
pub mod stats;

pub use json::{results_to_json, write_results};
pub use stats::{print_summary, CrawlSummary};
