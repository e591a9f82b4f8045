//! Read-only integrity checks over the ring namespace.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use redb::{MultimapTableHandle, ReadTransaction, ReadableTable};

use crate::error::{Error, Result};
use crate::rings::directory::{raw_table, ring_ids_read, RingId};

/// Check that every table under the root namespace is a well-formed ring.
///
/// Namespace tables with malformed names surface as
/// [`Error::UnexpectedChildShape`]; multimap tables in the namespace have the
/// wrong shape outright. An empty namespace is [`Error::RootMissing`].
pub(crate) fn verify_ring_names(rtx: &ReadTransaction, root: &str) -> Result<()> {
    // ring_ids_read already rejects malformed names in the namespace.
    let ids = ring_ids_read(rtx, root)?;
    if ids.is_empty() {
        return Err(Error::RootMissing(root.to_string()));
    }
    for handle in rtx.list_multimap_tables()? {
        let name = handle.name().to_string();
        if RingId::parse(root, &name).is_some() {
            return Err(Error::UnexpectedChildShape(name));
        }
    }
    Ok(())
}

/// Check that no key appears in more than one ring.
///
/// K-way merge over per-ring iterators: a min-heap holds the current head key
/// of each non-empty ring; each popped key must be strictly greater than the
/// previous one. Rings iterate in sorted key order, so any duplicate across
/// rings (or corruption within one) shows up as a non-increasing pop.
pub(crate) fn verify_disjoint(rtx: &ReadTransaction, root: &str) -> Result<()> {
    let ids = ring_ids_read(rtx, root)?;
    if ids.is_empty() {
        return Err(Error::RootMissing(root.to_string()));
    }

    let mut tables = Vec::with_capacity(ids.len());
    for id in &ids {
        let name = id.table_name(root);
        tables.push(rtx.open_table(raw_table(&name))?);
    }

    let mut ranges = Vec::with_capacity(tables.len());
    let mut heads: BinaryHeap<Reverse<(Vec<u8>, usize)>> = BinaryHeap::new();
    for (i, table) in tables.iter().enumerate() {
        let mut range = table.iter()?;
        if let Some(entry) = range.next() {
            let (key, _) = entry?;
            heads.push(Reverse((key.value().to_vec(), i)));
        }
        ranges.push(range);
    }

    let mut prev: Option<Vec<u8>> = None;
    while let Some(Reverse((key, i))) = heads.pop() {
        if let Some(p) = &prev {
            // Pops arrive in non-decreasing order; equality means the key
            // exists in two rings.
            if key <= *p {
                return Err(Error::OrderingWrong);
            }
        }
        prev = Some(key);
        if let Some(entry) = ranges[i].next() {
            let (key, _) = entry?;
            heads.push(Reverse((key.value().to_vec(), i)));
        }
    }
    Ok(())
}
