//! Basic operation tests for cycledb
//!
//! Integration tests for write, read, delete and their batch semantics.

use std::sync::Arc;

use cycledb::{CacheConfig, CycleCache, Error};
use redb::{Database, ReadableTable};

/// Create a cache over a fresh temporary database.
fn create_cache(config: CacheConfig) -> (tempfile::NamedTempFile, Arc<Database>, CycleCache) {
    let file = tempfile::NamedTempFile::new().unwrap();
    let db = Arc::new(Database::create(file.path()).unwrap());
    let cache = CycleCache::open(Arc::clone(&db), config).unwrap();
    (file, db, cache)
}

#[test]
fn test_write_then_read() {
    let (_file, _db, cache) = create_cache(CacheConfig::default());

    cache
        .write(&[
            (b"a".as_slice(), b"1".as_slice()),
            (b"b".as_slice(), b"2".as_slice()),
        ])
        .unwrap();

    let values = cache
        .read(&[b"a".as_slice(), b"b".as_slice(), b"c".as_slice()])
        .unwrap();
    assert_eq!(
        values,
        vec![Some(b"1".to_vec()), Some(b"2".to_vec()), None]
    );

    cache.close().unwrap();
}

#[test]
fn test_read_nonexistent() {
    let (_file, _db, cache) = create_cache(CacheConfig::default());

    let values = cache.read(&[b"missing".as_slice()]).unwrap();
    assert_eq!(values, vec![None]);
    // An absent key must not queue promotion work.
    assert_eq!(cache.stats().promotion_backlog, 0);

    cache.close().unwrap();
}

#[test]
fn test_overwrite_returns_latest() {
    let (_file, _db, cache) = create_cache(CacheConfig::default());

    cache.write(&[(b"k".as_slice(), b"v1".as_slice())]).unwrap();
    cache.write(&[(b"k".as_slice(), b"v2".as_slice())]).unwrap();

    let values = cache.read(&[b"k".as_slice()]).unwrap();
    assert_eq!(values, vec![Some(b"v2".to_vec())]);

    cache.close().unwrap();
}

#[test]
fn test_last_write_wins_within_batch() {
    let (_file, _db, cache) = create_cache(CacheConfig::default());

    cache
        .write(&[
            (b"k".as_slice(), b"first".as_slice()),
            (b"k".as_slice(), b"second".as_slice()),
        ])
        .unwrap();

    let values = cache.read(&[b"k".as_slice()]).unwrap();
    assert_eq!(values, vec![Some(b"second".to_vec())]);

    cache.close().unwrap();
}

#[test]
fn test_values_roundtrip_exactly() {
    let (_file, _db, cache) = create_cache(CacheConfig::default());

    let value: Vec<u8> = (0u16..512).map(|b| (b % 256) as u8).collect();
    cache.write(&[(b"blob".as_slice(), value.as_slice())]).unwrap();

    let values = cache.read(&[b"blob".as_slice()]).unwrap();
    assert_eq!(values[0].as_deref(), Some(value.as_slice()));

    cache.close().unwrap();
}

#[test]
fn test_empty_batches() {
    let (_file, _db, cache) = create_cache(CacheConfig::default());

    let no_keys: &[&[u8]] = &[];
    let no_pairs: &[(&[u8], &[u8])] = &[];

    assert_eq!(cache.read(no_keys).unwrap(), Vec::<Option<Vec<u8>>>::new());
    cache.write(no_pairs).unwrap();
    assert_eq!(cache.delete(no_keys).unwrap(), Vec::<bool>::new());

    cache.close().unwrap();
}

#[test]
fn test_delete_reports_presence() {
    let (_file, _db, cache) = create_cache(CacheConfig::default());

    cache.write(&[(b"k".as_slice(), b"v".as_slice())]).unwrap();

    let flags = cache.delete(&[b"k".as_slice(), b"missing".as_slice()]).unwrap();
    assert_eq!(flags, vec![true, false]);

    let values = cache.read(&[b"k".as_slice()]).unwrap();
    assert_eq!(values, vec![None]);

    cache.close().unwrap();
}

#[test]
fn test_delete_is_idempotent() {
    let (_file, _db, cache) = create_cache(CacheConfig::default());

    cache.write(&[(b"k".as_slice(), b"v".as_slice())]).unwrap();

    assert_eq!(cache.delete(&[b"k".as_slice()]).unwrap(), vec![true]);
    assert_eq!(cache.delete(&[b"k".as_slice()]).unwrap(), vec![false]);

    cache.close().unwrap();
}

#[test]
fn test_delete_spans_rings() {
    let (_file, _db, cache) = create_cache(CacheConfig::default());

    // Same key in two rings: one copy in ring 0, one in the ring added by
    // rotation.
    cache.write(&[(b"k".as_slice(), b"v".as_slice())]).unwrap();
    cache.rotate().unwrap();
    cache.write(&[(b"k".as_slice(), b"v2".as_slice())]).unwrap();

    let flags = cache.delete(&[b"k".as_slice()]).unwrap();
    assert_eq!(flags, vec![true]);

    // Both copies are gone.
    let values = cache.read(&[b"k".as_slice()]).unwrap();
    assert_eq!(values, vec![None]);
    cache.verify_compressed().unwrap();

    cache.close().unwrap();
}

#[test]
fn test_read_after_write_across_rotation() {
    let (_file, _db, cache) = create_cache(CacheConfig::new().with_min_rings(4));

    cache.write(&[(b"k".as_slice(), b"v".as_slice())]).unwrap();
    cache.rotate().unwrap();

    // The key now lives below the newest ring but is still readable.
    let values = cache.read(&[b"k".as_slice()]).unwrap();
    assert_eq!(values, vec![Some(b"v".to_vec())]);

    cache.close().unwrap();
}

#[test]
fn test_shared_database_keeps_foreign_tables() {
    let (_file, db, cache) = create_cache(CacheConfig::default());

    // Another part of the application stores its own table in the same
    // database; the cache must not touch it.
    let def: redb::TableDefinition<&[u8], &[u8]> = redb::TableDefinition::new("sessions");
    let wtx = db.begin_write().unwrap();
    {
        let mut table = wtx.open_table(def).unwrap();
        table.insert(b"sid".as_slice(), b"data".as_slice()).unwrap();
    }
    wtx.commit().unwrap();

    cache.write(&[(b"k".as_slice(), b"v".as_slice())]).unwrap();
    cache.rotate().unwrap();
    cache.rotate().unwrap();
    cache.rotate().unwrap();
    cache.verify_rings().unwrap();

    let rtx = db.begin_read().unwrap();
    let table = rtx.open_table(def).unwrap();
    let guard = table.get(b"sid".as_slice()).unwrap();
    assert_eq!(guard.unwrap().value(), b"data");

    cache.close().unwrap();
}

#[test]
fn test_close_twice_is_ok() {
    let (_file, _db, cache) = create_cache(CacheConfig::default());
    cache.close().unwrap();
    cache.close().unwrap();
}

#[test]
fn test_read_only_surface() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let db = Arc::new(Database::create(file.path()).unwrap());

    // Populate with a writable instance.
    let writer = CycleCache::open(Arc::clone(&db), CacheConfig::default()).unwrap();
    writer.write(&[(b"k".as_slice(), b"v".as_slice())]).unwrap();
    writer.close().unwrap();
    drop(writer);

    let cache = CycleCache::open(Arc::clone(&db), CacheConfig::new().with_read_only(true)).unwrap();

    assert_eq!(
        cache.read(&[b"k".as_slice()]).unwrap(),
        vec![Some(b"v".to_vec())]
    );
    cache.verify_rings().unwrap();
    cache.verify_compressed().unwrap();

    assert!(matches!(
        cache.write(&[(b"a".as_slice(), b"1".as_slice())]),
        Err(Error::ReadOnly)
    ));
    assert!(matches!(cache.delete(&[b"a".as_slice()]), Err(Error::ReadOnly)));
    assert!(matches!(cache.rotate(), Err(Error::ReadOnly)));

    cache.close().unwrap();
}
