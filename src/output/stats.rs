//! Aggregate summary of a multi-seed crawl

use crate::crawler::SeedResults;

/// Crawl summary across all seeds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Total number of products found across all seeds
    pub total_products: usize,

    /// Number of seeds crawled
    pub domains: usize,

    /// Seeds whose root task failed
    pub failed_domains: Vec<String>,

    /// Non-root errors collected across all seeds
    pub branch_errors: usize,
}

impl CrawlSummary {
    pub fn from_results(results: &SeedResults) -> Self {
        let mut summary = Self {
            domains: results.len(),
            ..Self::default()
        };

        for result in results.values() {
            summary.total_products += result.products.len();
            summary.branch_errors += result.branch_errors.len();
            if result.error.is_some() {
                summary.failed_domains.push(result.domain.clone());
            }
        }

        summary
    }
}

/// Prints the summary line and any failed seeds
pub fn print_summary(summary: &CrawlSummary, result_path: &str) {
    println!(
        "Crawled {} products across {} domains. Results saved to {}",
        summary.total_products, summary.domains, result_path
    );

    if !summary.failed_domains.is_empty() {
        println!("Failed domains ({}):", summary.failed_domains.len());
        for domain in &summary.failed_domains {
            println!("  - {}", domain);
        }
    }

    if summary.branch_errors > 0 {
        println!("Branch errors collected: {}", summary.branch_errors);
    }
}
