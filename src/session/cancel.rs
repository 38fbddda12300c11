//! Cooperative cancellation for dashboard loads.
//!
//! A session owns a generation counter. Each load captures the generation it
//! started under; starting a newer load or calling `cancel` bumps the
//! counter, and results of the older load are dropped when they arrive.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle shared between the view and any in-flight loads
#[derive(Debug, Clone, Default)]
pub struct LoadSession {
    generation: Arc<AtomicU64>,
}

/// Generation captured when a load starts
#[derive(Debug, Clone)]
pub struct LoadToken {
    generation: Arc<AtomicU64>,
    started_at: u64,
}

impl LoadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load, superseding any load still in flight
    pub fn begin(&self) -> LoadToken {
        let started_at = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LoadToken {
            generation: Arc::clone(&self.generation),
            started_at,
        }
    }

    /// Invalidate every in-flight load (view torn down)
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl LoadToken {
    /// True once the session moved past the generation of this load
    pub fn is_cancelled(&self) -> bool {
        self.generation.load(Ordering::SeqCst) != self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_live() {
        let session = LoadSession::new();
        let token = session.begin();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_invalidates_token() {
        let session = LoadSession::new();
        let token = session.begin();
        session.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_newer_load_supersedes_older() {
        let session = LoadSession::new();
        let first = session.begin();
        let second = session.clone().begin();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(session.generation(), 2);
    }
}
