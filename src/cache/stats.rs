//! Operation counters.
//!
//! All counters are monotonic and updated with relaxed atomics; a snapshot
//! reads each field independently and promises no cross-field consistency.

use std::sync::atomic::{AtomicU64, Ordering};

/// Shared mutable counters for one cache instance.
#[derive(Debug, Default)]
pub(crate) struct CacheStats {
    reads: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
    rotations: AtomicU64,
    items_promoted: AtomicU64,
    promotion_transactions: AtomicU64,
    promotion_deletes: AtomicU64,
    promotion_errors: AtomicU64,
}

impl CacheStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_reads(&self, count: u64) {
        self.reads.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_writes(&self, count: u64) {
        self.writes.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_deletes(&self, count: u64) {
        self.deletes.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_promotion_transaction(&self) {
        self.promotion_transactions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_items_promoted(&self, count: u64) {
        self.items_promoted.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn add_promotion_deletes(&self, count: u64) {
        self.promotion_deletes.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_promotion_error(&self) {
        self.promotion_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, promotion_backlog: usize) -> StatsSnapshot {
        StatsSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            items_promoted: self.items_promoted.load(Ordering::Relaxed),
            promotion_transactions: self.promotion_transactions.load(Ordering::Relaxed),
            promotion_deletes: self.promotion_deletes.load(Ordering::Relaxed),
            promotion_errors: self.promotion_errors.load(Ordering::Relaxed),
            promotion_backlog,
        }
    }
}

/// Point-in-time view of the counters plus the current queue depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Total keys looked up across all `read` calls.
    pub reads: u64,
    /// Total pairs written across all `write` calls.
    pub writes: u64,
    /// Total keys passed to `delete` calls.
    pub deletes: u64,
    /// Total `rotate` calls.
    pub rotations: u64,
    /// Entries reissued into the newest ring by the promoter.
    pub items_promoted: u64,
    /// Write transactions the promoter has opened.
    pub promotion_transactions: u64,
    /// Entries removed from their source ring during promotion.
    pub promotion_deletes: u64,
    /// Promotion batches that failed.
    pub promotion_errors: u64,
    /// Promotion requests currently queued.
    pub promotion_backlog: usize,
}
