use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Run-scoped record of URLs that have already been claimed by a task
///
/// The only access point is [`VisitedSet::check_and_insert`]: the membership
/// check and the insertion happen under one lock, so two tasks racing on the
/// same URL can never both be told they are first.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as visited
    ///
    /// Returns true if this call inserted the URL (the caller is the first
    /// visitor), false if it was already present.
    pub fn check_and_insert(&self, url: &str) -> bool {
        let mut urls = self.urls.lock().unwrap_or_else(PoisonError::into_inner);

        if urls.contains(url) {
            return false;
        }

        urls.insert(url.to_string())
    }
}
