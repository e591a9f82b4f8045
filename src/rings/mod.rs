//! Ring directory and integrity checks.
//!
//! A cache instance owns a namespace of redb tables (`"<root>/<id>"`) called
//! rings. Ring ids are monotonically increasing u64s encoded as 16 zero-padded
//! lowercase hex digits, so the lexicographic order of table names equals the
//! numeric order of ids. Writes land in the ring with the largest id (the
//! newest); the smallest id is the next eviction candidate.

mod directory;
mod verify;

pub use directory::RingId;

pub(crate) use directory::{
    create_ring, drop_ring, initialize, raw_table, ring_ids_read, ring_ids_write,
};
pub(crate) use verify::{verify_disjoint, verify_ring_names};
