//! Ring naming and directory operations.
//!
//! All operations piggyback on a caller-supplied redb transaction; nothing
//! here commits. Ring tables hold opaque byte-string keys and values.

use std::fmt;

use redb::{ReadTransaction, TableDefinition, TableHandle, WriteTransaction};

use crate::error::{Error, Result};

/// Number of hex digits in an encoded ring id.
const RING_NAME_DIGITS: usize = 16;

/// Identity of one ring: a u64 that doubles as its position in time order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RingId(u64);

impl RingId {
    /// The ring seeded into an empty namespace at initialization.
    pub const FIRST: RingId = RingId(0);

    /// Create a ring id from its numeric value.
    pub const fn new(id: u64) -> Self {
        RingId(id)
    }

    /// The numeric value of this ring id.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The id of the ring created after this one.
    pub const fn next(&self) -> RingId {
        RingId(self.0.wrapping_add(1))
    }

    /// The redb table name for this ring under `root`.
    ///
    /// Zero-padded lowercase hex keeps lexicographic name order equal to
    /// numeric id order.
    pub fn table_name(&self, root: &str) -> String {
        format!("{root}/{:0digits$x}", self.0, digits = RING_NAME_DIGITS)
    }

    /// Parse a table name back into a ring id.
    ///
    /// Returns `None` for tables outside the `root` namespace, and
    /// [`Error::UnexpectedChildShape`] for namespace tables whose name is not
    /// exactly 16 lowercase hex digits.
    pub fn parse(root: &str, table_name: &str) -> Option<Result<RingId>> {
        let rest = table_name
            .strip_prefix(root)
            .and_then(|r| r.strip_prefix('/'))?;
        if rest.len() != RING_NAME_DIGITS
            || !rest
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Some(Err(Error::UnexpectedChildShape(table_name.to_string())));
        }
        match u64::from_str_radix(rest, 16) {
            Ok(id) => Some(Ok(RingId(id))),
            Err(_) => Some(Err(Error::UnexpectedChildShape(table_name.to_string()))),
        }
    }
}

impl fmt::Display for RingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0digits$x}", self.0, digits = RING_NAME_DIGITS)
    }
}

/// Table definition for a ring: opaque keys to opaque values.
pub(crate) fn raw_table(name: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(name)
}

fn collect_ring_ids<I>(names: I, root: &str) -> Result<Vec<RingId>>
where
    I: Iterator<Item = String>,
{
    let mut ids = names
        .filter_map(|name| RingId::parse(root, &name))
        .collect::<Result<Vec<_>>>()?;
    ids.sort_unstable();
    Ok(ids)
}

/// List ring ids in ascending (oldest to newest) order within a read
/// transaction.
pub(crate) fn ring_ids_read(rtx: &ReadTransaction, root: &str) -> Result<Vec<RingId>> {
    collect_ring_ids(rtx.list_tables()?.map(|h| h.name().to_string()), root)
}

/// List ring ids in ascending order within a write transaction.
pub(crate) fn ring_ids_write(wtx: &WriteTransaction, root: &str) -> Result<Vec<RingId>> {
    collect_ring_ids(wtx.list_tables()?.map(|h| h.name().to_string()), root)
}

/// Create the (empty) table for `id`. Creation becomes visible at commit.
pub(crate) fn create_ring(wtx: &WriteTransaction, root: &str, id: RingId) -> Result<()> {
    let name = id.table_name(root);
    wtx.open_table(raw_table(&name))?;
    Ok(())
}

/// Drop the table for `id`. Returns whether it existed.
pub(crate) fn drop_ring(wtx: &WriteTransaction, root: &str, id: RingId) -> Result<bool> {
    let name = id.table_name(root);
    Ok(wtx.delete_table(raw_table(&name))?)
}

/// Ensure the namespace holds at least one ring, seeding [`RingId::FIRST`]
/// into an empty namespace.
pub(crate) fn initialize(db: &redb::Database, root: &str) -> Result<()> {
    let wtx = db.begin_write()?;
    if ring_ids_write(&wtx, root)?.is_empty() {
        create_ring(&wtx, root, RingId::FIRST)?;
    }
    wtx.commit()?;
    Ok(())
}
