//! An in-memory stand-in for the heap file manager: object storage, a
//! paginated scan cursor, and class-OID lookup, scoped to one heap file
//! per `InMemoryHeap` instance (the engine's test fixtures keep one
//! instance per class, matching one `HFID` addressing one class's
//! instance storage).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use locator_core::{ClassOid, Hfid, HeapApi, LocatorResult, Oid, Record};
use parking_lot::Mutex;

/// A single heap file's contents, keyed by OID for stable scan order
/// (`BTreeMap` gives us `next(after)` almost for free).
#[derive(Default)]
struct HeapFile {
    records: BTreeMap<Oid, Record>,
}

/// In-memory heap: one `HashMap<Hfid, HeapFile>` behind a mutex, OIDs
/// assigned from a monotonically increasing page counter.
#[derive(Default)]
pub struct InMemoryHeap {
    files: Mutex<std::collections::HashMap<Hfid, HeapFile>>,
    next_page: AtomicI32,
}

impl InMemoryHeap {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(std::collections::HashMap::new()),
            next_page: AtomicI32::new(1),
        }
    }

    fn fresh_oid(&self, hfid: Hfid) -> Oid {
        let pageid = self.next_page.fetch_add(1, Ordering::SeqCst);
        Oid::new(hfid.vfid.volid, pageid, 0)
    }

    /// Directly seed a record at a caller-chosen OID, bypassing OID
    /// assignment — used by tests that need a known OID up front (e.g.
    /// to install the root/meta-class instance).
    pub fn seed(&self, hfid: Hfid, oid: Oid, record: Record) {
        self.files
            .lock()
            .entry(hfid)
            .or_default()
            .records
            .insert(oid, record);
    }
}

impl HeapApi for InMemoryHeap {
    fn insert(&self, hfid: Hfid, class_oid: ClassOid, record: &Record) -> LocatorResult<Oid> {
        let oid = self.fresh_oid(hfid);
        let mut record = record.clone();
        record.class_oid = class_oid;
        self.files
            .lock()
            .entry(hfid)
            .or_default()
            .records
            .insert(oid, record);
        Ok(oid)
    }

    fn update(&self, oid: Oid, record: &Record) -> LocatorResult<()> {
        let mut files = self.files.lock();
        for file in files.values_mut() {
            if let Some(slot) = file.records.get_mut(&oid) {
                *slot = record.clone();
                return Ok(());
            }
        }
        Err(locator_core::LocatorError::ObjectNotFound(oid))
    }

    fn delete(&self, oid: Oid) -> LocatorResult<()> {
        let mut files = self.files.lock();
        for file in files.values_mut() {
            if file.records.remove(&oid).is_some() {
                return Ok(());
            }
        }
        Err(locator_core::LocatorError::ObjectNotFound(oid))
    }

    fn get(&self, oid: Oid) -> LocatorResult<Option<Record>> {
        let files = self.files.lock();
        for file in files.values() {
            if let Some(record) = file.records.get(&oid) {
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    fn next(&self, hfid: Hfid, after: Option<Oid>) -> LocatorResult<Option<Oid>> {
        let files = self.files.lock();
        let Some(file) = files.get(&hfid) else {
            return Ok(None);
        };
        let next = match after {
            None => file.records.keys().next(),
            Some(oid) => file.records.range((
                std::ops::Bound::Excluded(oid),
                std::ops::Bound::Unbounded,
            )).next().map(|(k, _)| k),
        };
        Ok(next.copied())
    }

    fn get_class_oid(&self, oid: Oid) -> LocatorResult<Option<ClassOid>> {
        Ok(self.get(oid)?.map(|r| r.class_oid))
    }

    fn does_exist(&self, oid: Oid) -> LocatorResult<bool> {
        Ok(self.get(oid)?.is_some())
    }

    fn estimate_num_objects(&self, hfid: Hfid) -> LocatorResult<i64> {
        Ok(self
            .files
            .lock()
            .get(&hfid)
            .map(|f| f.records.len() as i64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locator_core::Vfid;

    fn hfid() -> Hfid {
        Hfid {
            vfid: Vfid { volid: 0, fileid: 1 },
            hpgid: 0,
        }
    }

    #[test]
    fn insert_then_get_round_trips() {
        let heap = InMemoryHeap::new();
        let class_oid = Oid::new(0, 1, 0);
        let oid = heap.insert(hfid(), class_oid, &Record::new(class_oid)).unwrap();
        let fetched = heap.get(oid).unwrap().unwrap();
        assert_eq!(fetched.class_oid, class_oid);
    }

    #[test]
    fn delete_then_does_exist_is_false() {
        let heap = InMemoryHeap::new();
        let class_oid = Oid::new(0, 1, 0);
        let oid = heap.insert(hfid(), class_oid, &Record::new(class_oid)).unwrap();
        heap.delete(oid).unwrap();
        assert!(!heap.does_exist(oid).unwrap());
    }

    #[test]
    fn next_walks_in_oid_order_then_ends() {
        let heap = InMemoryHeap::new();
        let class_oid = Oid::new(0, 1, 0);
        let a = heap.insert(hfid(), class_oid, &Record::new(class_oid)).unwrap();
        let b = heap.insert(hfid(), class_oid, &Record::new(class_oid)).unwrap();
        let first = heap.next(hfid(), None).unwrap().unwrap();
        assert_eq!(first, a.min(b));
        let second = heap.next(hfid(), Some(first)).unwrap().unwrap();
        assert_eq!(second, a.max(b));
        assert_eq!(heap.next(hfid(), Some(second)).unwrap(), None);
    }

    #[test]
    fn empty_heap_scan_ends_immediately() {
        let heap = InMemoryHeap::new();
        assert_eq!(heap.next(hfid(), None).unwrap(), None);
    }
}
