//! Background promotion of recently-read entries into the newest ring.
//!
//! Readers enqueue promotion requests onto a bounded channel; one worker
//! drains them in batches and moves each entry into the newest ring inside a
//! single write transaction. A full queue blocks the reader: back-pressure,
//! not an error.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use redb::Database;
use tracing::warn;

use crate::cache::stats::CacheStats;
use crate::error::{Error, Result};
use crate::rings::{raw_table, ring_ids_write, RingId};

/// One entry to move from a non-newest ring into the newest ring.
#[derive(Debug, Clone)]
pub(crate) struct Promotion {
    pub ring: RingId,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

enum PromoterMessage {
    Promote(Promotion),
    Shutdown,
}

struct PromoterShared {
    db: Arc<Database>,
    root: String,
    max_batch_size: usize,
    stats: Arc<CacheStats>,
    error_sink: Option<Sender<Error>>,
}

/// Owner of the promotion queue and its worker thread.
pub(crate) struct Promoter {
    tx: Sender<PromoterMessage>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Promoter {
    pub(crate) fn start(
        db: Arc<Database>,
        root: String,
        backlog: usize,
        max_batch_size: usize,
        stats: Arc<CacheStats>,
        error_sink: Option<Sender<Error>>,
    ) -> Self {
        let (tx, rx) = bounded(backlog);
        let shared = PromoterShared {
            db,
            root,
            max_batch_size,
            stats,
            error_sink,
        };
        let worker = thread::spawn(move || promoter_loop(shared, rx));
        Self {
            tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueue one promotion, blocking while the queue is full.
    pub(crate) fn enqueue(&self, promotion: Promotion) {
        // A send error means the worker already exited; the entry stays
        // readable in its source ring, so nothing is lost.
        let _ = self.tx.send(PromoterMessage::Promote(promotion));
    }

    /// Promotion requests currently queued.
    pub(crate) fn backlog(&self) -> usize {
        self.tx.len()
    }

    /// Stop the worker after it drains everything enqueued so far.
    /// Idempotent.
    pub(crate) fn stop(&self) {
        if let Some(worker) = self.worker.lock().take() {
            let _ = self.tx.send(PromoterMessage::Shutdown);
            let _ = worker.join();
        }
    }
}

impl Drop for Promoter {
    fn drop(&mut self) {
        self.stop();
    }
}

fn promoter_loop(shared: PromoterShared, rx: Receiver<PromoterMessage>) {
    loop {
        let first = match rx.recv() {
            Ok(PromoterMessage::Promote(promotion)) => promotion,
            Ok(PromoterMessage::Shutdown) | Err(_) => return,
        };

        let mut batch = Vec::with_capacity(shared.max_batch_size);
        batch.push(first);
        let mut shutdown = false;
        while batch.len() < shared.max_batch_size {
            match rx.try_recv() {
                Ok(PromoterMessage::Promote(promotion)) => batch.push(promotion),
                Ok(PromoterMessage::Shutdown) => {
                    shutdown = true;
                    break;
                }
                Err(_) => break,
            }
        }

        if let Err(err) = promote_batch(&shared, batch) {
            shared.stats.record_promotion_error();
            warn!(error = %err, "promotion batch failed");
            if let Some(sink) = &shared.error_sink {
                let _ = sink.try_send(err);
            }
        }

        if shutdown {
            return;
        }
    }
}

/// Move one batch into the newest ring in a single write transaction.
///
/// Items are grouped by source ring to keep table churn down. A source ring
/// that rotation already dropped contributes nothing to delete, but its items
/// still go into the newest ring: the read that produced them proved the key
/// hot.
fn promote_batch(shared: &PromoterShared, batch: Vec<Promotion>) -> Result<()> {
    let mut groups: BTreeMap<RingId, Vec<Promotion>> = BTreeMap::new();
    for promotion in batch {
        groups.entry(promotion.ring).or_default().push(promotion);
    }

    let wtx = shared.db.begin_write()?;
    shared.stats.record_promotion_transaction();
    let mut promoted = 0u64;
    let mut deleted = 0u64;
    {
        let ids = ring_ids_write(&wtx, &shared.root)?;
        let newest = ids.last().copied().ok_or(Error::NoNewestRing)?;
        let newest_name = newest.table_name(&shared.root);
        let mut newest_table = wtx.open_table(raw_table(&newest_name))?;

        for (ring, items) in groups {
            if ring != newest && ids.binary_search(&ring).is_ok() {
                let name = ring.table_name(&shared.root);
                let mut source = wtx.open_table(raw_table(&name))?;
                for promotion in items {
                    promoted += 1;
                    if source.remove(promotion.key.as_slice())?.is_some() {
                        deleted += 1;
                    }
                    newest_table
                        .insert(promotion.key.as_slice(), promotion.value.as_slice())?;
                }
            } else {
                for promotion in items {
                    promoted += 1;
                    newest_table
                        .insert(promotion.key.as_slice(), promotion.value.as_slice())?;
                }
            }
        }
    }
    wtx.commit()?;
    // Counters become visible only once the moves are durable, so a backlog
    // of zero plus a stable promoted count means quiescence.
    shared.stats.add_items_promoted(promoted);
    shared.stats.add_promotion_deletes(deleted);
    Ok(())
}
