//! Deduplicated set of discovered URLs
//!
//! `claim_if_new` is the single linearizable point of the crawl: membership
//! check and insertion happen under one lock, so exactly one caller wins each
//! distinct URL.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

#[derive(Debug, Default)]
struct State {
    seen: HashSet<Url>,
    frozen: bool,
}

/// Shared URL frontier
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<State>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url` and returns true if no one has claimed it before
    ///
    /// A frozen frontier accepts nothing and always returns false.
    pub fn claim_if_new(&self, url: &Url) -> bool {
        let mut state = self.lock();
        if state.frozen {
            return false;
        }
        state.seen.insert(url.clone())
    }

    /// Stops accepting claims; the set is read-only from here on
    pub fn freeze(&self) {
        self.lock().frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.lock().frozen
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.lock().seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().seen.is_empty()
    }

    /// Every claimed URL, sorted for stable hand-off
    pub fn snapshot(&self) -> Vec<Url> {
        let mut urls: Vec<Url> = self.lock().seen.iter().cloned().collect();
        urls.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        urls
    }

    // A panic while holding the lock cannot leave the set half-updated.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
