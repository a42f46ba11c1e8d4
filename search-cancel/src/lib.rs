//! Cooperative cancellation for long running searches.
//!
//! Every search takes a version number. Starting a newer search bumps
//! [`ACTIVE_SEARCH_VERSION`], and any token holding an older version reports
//! itself cancelled the next time it is polled.

use std::sync::atomic::{AtomicU64, Ordering};

/// Version of the most recently started search.
pub static ACTIVE_SEARCH_VERSION: AtomicU64 = AtomicU64::new(0);

/// How many records a scan walks between two cancellation polls.
pub const CANCEL_CHECK_INTERVAL: usize = 0x10000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CancellationToken {
    version: Option<u64>,
}

impl CancellationToken {
    /// Marks `version` as the active search. Versions only move forward, so a
    /// late `new` with a stale version is born cancelled.
    pub fn new(version: u64) -> Self {
        ACTIVE_SEARCH_VERSION.fetch_max(version, Ordering::SeqCst);
        Self {
            version: Some(version),
        }
    }

    /// A token that is never cancelled.
    pub const fn noop() -> Self {
        Self { version: None }
    }

    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn is_cancelled(&self) -> bool {
        match self.version {
            Some(version) => ACTIVE_SEARCH_VERSION.load(Ordering::Relaxed) != version,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_is_never_cancelled() {
        let token = CancellationToken::noop();
        assert!(!token.is_cancelled());
        assert_eq!(token.version(), None);
    }
}
