//! Traffic statistics for a sink bridge
//!
//! Lock-free counters shared between the session task and the caller.

use std::sync::atomic::{AtomicU64, Ordering};

/// Message counters (fully lock-free)
#[derive(Debug, Default)]
pub struct Stats {
    /// WRITE messages posted to the port
    writes: AtomicU64,
    /// CLOSE/ABORT messages posted to the port
    finals: AtomicU64,
    /// BACKPRESSURE messages received
    backpressure: AtomicU64,
    /// ERROR messages received
    errors: AtomicU64,
    /// Outbound messages dropped because the port was gone
    dropped: AtomicU64,
}

/// Point-in-time copy of `Stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub writes: u64,
    pub finals: u64,
    pub backpressure: u64,
    pub errors: u64,
    pub dropped: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_final(&self) {
        self.finals.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_backpressure(&self) {
        self.backpressure.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            finals: self.finals.load(Ordering::Relaxed),
            backpressure: self.backpressure.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = Stats::new();
        stats.add_write();
        stats.add_write();
        stats.add_backpressure();
        stats.add_dropped();

        let snap = stats.snapshot();
        assert_eq!(snap.writes, 2);
        assert_eq!(snap.backpressure, 1);
        assert_eq!(snap.errors, 0);
        assert_eq!(snap.dropped, 1);
    }
}
