//! cycledb - a pseudo-LRU key/value cache on top of redb
//!
//! cycledb keeps a bounded working set without tracking per-key access
//! times. Entries live in a rotating ring of redb tables: writes go to the
//! newest ring, reads search newest to oldest, hot entries are promoted back
//! into the newest ring by a background worker, and rotation drops the
//! oldest rings wholesale. Forgetting is implicit in rotation, so eviction
//! is O(1) regardless of how many entries age out.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cycledb::{CacheConfig, CycleCache};
//!
//! let db = Arc::new(redb::Database::create("cache.redb")?);
//! let cache = CycleCache::open(db, CacheConfig::default())?;
//!
//! cache.write(&[(b"key".as_slice(), b"value".as_slice())])?;
//! let values = cache.read(&[b"key".as_slice()])?;
//!
//! // Periodically, e.g. from a timer:
//! cache.rotate()?;
//!
//! cache.close()?;
//! ```
//!
//! The cache shares its [`redb::Database`] with any other tables the
//! application keeps there; all ring tables live under a configurable
//! namespace (default `"cyc"`).

#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod error;
pub mod rings;

// Re-exports for convenience
pub use cache::{CacheConfig, CycleCache, StatsSnapshot};
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::cache::{CacheConfig, CycleCache, StatsSnapshot};
    pub use crate::error::{Error, Result};
    pub use crate::rings::RingId;
}
