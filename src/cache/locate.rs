//! Batched key location across rings, newest to oldest.

use redb::{ReadTransaction, ReadableTable};

use crate::error::{Error, Result};
use crate::rings::{raw_table, ring_ids_read, RingId};

/// Where a key was found and whether it should move to the newest ring.
#[derive(Debug, Clone)]
pub(crate) struct Located {
    pub ring: RingId,
    pub value: Vec<u8>,
    pub needs_promotion: bool,
}

/// Find each key inside one read transaction.
///
/// Rings are searched newest first: a write-then-read workload hits on the
/// first probe. Only hits in rings below the newest are flagged for
/// promotion. Values are copied out because redb guards borrow from the
/// transaction.
pub(crate) fn locate_keys(
    rtx: &ReadTransaction,
    root: &str,
    keys: &[&[u8]],
) -> Result<Vec<Option<Located>>> {
    let ids = ring_ids_read(rtx, root)?;
    if ids.is_empty() {
        return Err(Error::RootMissing(root.to_string()));
    }

    let mut results: Vec<Option<Located>> = vec![None; keys.len()];
    let mut pending: Vec<(usize, &[u8])> = keys.iter().copied().enumerate().collect();
    let mut needs_promotion = false;

    for id in ids.iter().rev() {
        if pending.is_empty() {
            break;
        }
        let name = id.table_name(root);
        let table = rtx.open_table(raw_table(&name))?;

        let mut missed = Vec::with_capacity(pending.len());
        for (index, key) in pending {
            match table.get(key)? {
                Some(guard) => {
                    results[index] = Some(Located {
                        ring: *id,
                        value: guard.value().to_vec(),
                        needs_promotion,
                    });
                }
                None => missed.push((index, key)),
            }
        }
        pending = missed;
        needs_promotion = true;
    }

    Ok(results)
}
