//! Pseudo-LRU cache built from a rotating ring of tables.
//!
//! # Overview
//!
//! Entries live in a time-ordered sequence of redb tables (rings). Writes
//! always land in the newest ring; reads search newest to oldest; entries
//! read out of an older ring are asynchronously moved forward; rotation
//! appends a fresh newest ring and drops the oldest rings wholesale.
//! Recency is coarsened to "which ring", so eviction costs one table drop
//! and entries carry no per-key metadata.
//!
//! ```text
//!            oldest                     newest
//!          ┌────────┐  ┌────────┐  ┌──────────┐
//!  reads ─▶│ ring n │  │ring n+1│  │ ring n+2 │◀─ writes
//!          └────┬───┘  └───┬────┘  └──────────┘
//!               │          │             ▲
//!               └──────────┴─────────────┘
//!                 promoter (batched, async)
//! ```
//!
//! Rotation drops `ring n` once the ring count exceeds the configured
//! minimum, forgetting every entry that was never read back.

mod config;
mod locate;
mod promoter;
mod stats;

pub use config::CacheConfig;
pub use stats::StatsSnapshot;

use std::sync::Arc;

use redb::Database;
use tracing::debug;

use crate::cache::promoter::{Promoter, Promotion};
use crate::cache::stats::CacheStats;
use crate::error::{Error, Result};
use crate::rings::{
    self, create_ring, drop_ring, raw_table, ring_ids_write, verify_disjoint, verify_ring_names,
};

/// A pseudo-LRU byte-string cache over a shared redb database.
///
/// All methods take `&self`; the instance is `Send + Sync` and intended to be
/// shared behind an [`Arc`]. Mutations are serialized by redb's single write
/// transaction; reads run on snapshots and never block each other.
pub struct CycleCache {
    db: Arc<Database>,
    config: CacheConfig,
    stats: Arc<CacheStats>,
    promoter: Option<Promoter>,
}

impl CycleCache {
    /// Open a cache over `db` with the given options.
    ///
    /// Unless `config.read_only` is set, this seeds ring 0 into an empty
    /// namespace and starts the background promoter. Option and
    /// initialization failures surface as [`Error::Configuration`].
    pub fn open(db: Arc<Database>, config: CacheConfig) -> Result<CycleCache> {
        config.validate()?;
        if !config.read_only {
            rings::initialize(&db, &config.root)
                .map_err(|err| Error::Configuration(format!("initialization failed: {err}")))?;
        }

        let stats = Arc::new(CacheStats::new());
        let promoter = if config.read_only {
            None
        } else {
            Some(Promoter::start(
                Arc::clone(&db),
                config.root.clone(),
                config.promotion_backlog,
                config.max_batch_size,
                Arc::clone(&stats),
                config.error_sink.clone(),
            ))
        };
        debug!(root = %config.root, read_only = config.read_only, "cache opened");

        Ok(CycleCache {
            db,
            config,
            stats,
            promoter,
        })
    }

    /// Look up `keys`, returning one slot per key in input order.
    ///
    /// Each hit found below the newest ring is queued for promotion before
    /// this call returns; the move itself happens asynchronously, and a full
    /// promotion queue blocks here until the promoter catches up. The
    /// returned values were consistent at one read snapshot.
    pub fn read<K: AsRef<[u8]>>(&self, keys: &[K]) -> Result<Vec<Option<Vec<u8>>>> {
        self.stats.record_reads(keys.len() as u64);
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<&[u8]> = keys.iter().map(|key| key.as_ref()).collect();
        let located = {
            let rtx = self.db.begin_read()?;
            locate::locate_keys(&rtx, &self.config.root, &raw)?
        };

        let mut values = Vec::with_capacity(located.len());
        for (index, slot) in located.into_iter().enumerate() {
            match slot {
                Some(found) => {
                    if found.needs_promotion {
                        if let Some(promoter) = &self.promoter {
                            promoter.enqueue(Promotion {
                                ring: found.ring,
                                key: raw[index].to_vec(),
                                value: found.value.clone(),
                            });
                        }
                    }
                    values.push(Some(found.value));
                }
                None => values.push(None),
            }
        }
        Ok(values)
    }

    /// Insert or replace `pairs` in the newest ring, atomically.
    ///
    /// Later pairs win over earlier ones for the same key.
    pub fn write<K, V>(&self, pairs: &[(K, V)]) -> Result<()>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        if self.config.read_only {
            return Err(Error::ReadOnly);
        }
        self.stats.record_writes(pairs.len() as u64);
        if pairs.is_empty() {
            return Ok(());
        }

        let wtx = self.db.begin_write()?;
        {
            let ids = ring_ids_write(&wtx, &self.config.root)?;
            let newest = ids.last().copied().ok_or(Error::NoNewestRing)?;
            let name = newest.table_name(&self.config.root);
            let mut table = wtx.open_table(raw_table(&name))?;
            for (key, value) in pairs {
                table.insert(key.as_ref(), value.as_ref())?;
            }
        }
        wtx.commit()?;
        Ok(())
    }

    /// Remove `keys` from every ring, atomically.
    ///
    /// Returns, per key, whether it was present in at least one ring.
    pub fn delete<K: AsRef<[u8]>>(&self, keys: &[K]) -> Result<Vec<bool>> {
        if self.config.read_only {
            return Err(Error::ReadOnly);
        }
        self.stats.record_deletes(keys.len() as u64);
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut present = vec![false; keys.len()];
        let wtx = self.db.begin_write()?;
        {
            let ids = ring_ids_write(&wtx, &self.config.root)?;
            if ids.is_empty() {
                return Err(Error::RootMissing(self.config.root.clone()));
            }
            for id in &ids {
                let name = id.table_name(&self.config.root);
                let mut table = wtx.open_table(raw_table(&name))?;
                for (index, key) in keys.iter().enumerate() {
                    if table.remove(key.as_ref())?.is_some() {
                        present[index] = true;
                    }
                }
            }
        }
        wtx.commit()?;
        Ok(present)
    }

    /// Drop oldest rings past `min_rings`, then append a fresh newest ring.
    ///
    /// The trim loop compares against the ring count captured before the
    /// append, so periodic rotation settles at `min_rings + 1` rings. Either
    /// the whole rotation commits or none of it is visible.
    pub fn rotate(&self) -> Result<()> {
        if self.config.read_only {
            return Err(Error::ReadOnly);
        }
        self.stats.record_rotation();

        let wtx = self.db.begin_write()?;
        let created = {
            let ids = ring_ids_write(&wtx, &self.config.root)?;
            let newest = ids.last().copied().ok_or(Error::NoNewestRing)?;
            let mut count = ids.len();
            for id in &ids {
                if count <= self.config.min_rings {
                    break;
                }
                drop_ring(&wtx, &self.config.root, *id)?;
                count -= 1;
            }
            let next = newest.next();
            create_ring(&wtx, &self.config.root, next)?;
            next
        };
        wtx.commit()?;
        debug!(ring = %created, "rotated in new ring");
        Ok(())
    }

    /// Check that every table under the root namespace is a well-formed ring.
    pub fn verify_rings(&self) -> Result<()> {
        let rtx = self.db.begin_read()?;
        verify_ring_names(&rtx, &self.config.root)
    }

    /// Check that no key is present in more than one ring.
    ///
    /// Meaningful at quiescence; while the promoter is mid-flight a key may
    /// legitimately exist in two rings.
    pub fn verify_compressed(&self) -> Result<()> {
        let rtx = self.db.begin_read()?;
        verify_disjoint(&rtx, &self.config.root)
    }

    /// Snapshot the operation counters and current promotion backlog.
    pub fn stats(&self) -> StatsSnapshot {
        let backlog = self.promoter.as_ref().map_or(0, Promoter::backlog);
        self.stats.snapshot(backlog)
    }

    /// Stop the promoter after it drains everything enqueued so far.
    ///
    /// No promotions happen after this returns. Immediate for read-only
    /// instances; safe to call more than once. Also runs on drop.
    pub fn close(&self) -> Result<()> {
        if let Some(promoter) = &self.promoter {
            promoter.stop();
        }
        Ok(())
    }

    /// The options this cache was opened with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
