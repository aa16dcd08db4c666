use crate::crawler::SeedResults;
use crate::ProwlError;
use std::path::Path;

/// Renders results as pretty-printed JSON, keyed by seed index
///
/// ```json
/// {
///   "0": {
///     "domain": "https://shop.test/",
///     "products": [{ "url": "https://shop.test/product/1" }],
///     "error": "HTTP status 404 for https://shop.test/"
///   }
/// }
/// ```
///
/// `error` is omitted when the root task succeeded, and `branch_errors` when
/// none were collected.
pub fn results_to_json(results: &SeedResults) -> Result<String, ProwlError> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Writes results to `path`, replacing any existing file
pub fn write_results(results: &SeedResults, path: &Path) -> Result<(), ProwlError> {
    let json = results_to_json(results)?;
    std::fs::write(path, json)?;
    tracing::info!("Results written to {}", path.display());
    Ok(())
}
