//! An in-memory stand-in for the B+tree runtime.
//!
//! Deliberately does not reject a duplicate key on `insert`, even for a
//! tree backing a declared-unique index: uniqueness here is a
//! statement-end bookkeeping concern (`locator_concurrency::UniqueStats`),
//! not something the tree itself enforces at insert time. Entries are
//! kept as a flat `(key, oid)` list per `Btid`; counts are computed by
//! scanning rather than maintained incrementally, which is fine at test
//! scale and keeps the double's behavior easy to audit.

use std::collections::HashMap;

use locator_core::{key_is_null, BTreeRuntime, Btid, LocatorResult, Oid, Value};
use parking_lot::Mutex;

/// In-memory B+tree runtime: one flat `(key, oid)` list per `Btid`.
#[derive(Default)]
pub struct InMemoryBTree {
    trees: Mutex<HashMap<Btid, Vec<(Vec<Value>, Oid)>>>,
}

impl InMemoryBTree {
    pub fn new() -> Self {
        Self::default()
    }
}

fn keys_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

impl BTreeRuntime for InMemoryBTree {
    fn insert(&self, btid: Btid, key: &[Value], oid: Oid) -> LocatorResult<bool> {
        let mut trees = self.trees.lock();
        let entries = trees.entry(btid).or_default();
        let is_new_key = key_is_null(key) || !entries.iter().any(|(k, _)| keys_equal(k, key));
        entries.push((key.to_vec(), oid));
        Ok(is_new_key)
    }

    fn delete(&self, btid: Btid, key: &[Value], oid: Oid) -> LocatorResult<()> {
        if let Some(entries) = self.trees.lock().get_mut(&btid) {
            if let Some(pos) = entries
                .iter()
                .position(|(k, o)| *o == oid && keys_equal(k, key))
            {
                entries.remove(pos);
            }
        }
        Ok(())
    }

    fn find_unique(&self, btid: Btid, key: &[Value]) -> LocatorResult<Option<Oid>> {
        let trees = self.trees.lock();
        Ok(trees
            .get(&btid)
            .and_then(|entries| entries.iter().find(|(k, _)| keys_equal(k, key)))
            .map(|(_, oid)| *oid))
    }

    fn find_all(&self, btid: Btid, key: &[Value]) -> LocatorResult<Vec<Oid>> {
        let trees = self.trees.lock();
        Ok(trees
            .get(&btid)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(k, _)| keys_equal(k, key))
                    .map(|(_, oid)| *oid)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn key_count(&self, btid: Btid) -> LocatorResult<i64> {
        let trees = self.trees.lock();
        let Some(entries) = trees.get(&btid) else {
            return Ok(0);
        };
        let mut distinct: Vec<&Vec<Value>> = Vec::new();
        for (key, _) in entries.iter().filter(|(k, _)| !key_is_null(k)) {
            if !distinct.iter().any(|k| keys_equal(k, key)) {
                distinct.push(key);
            }
        }
        Ok(distinct.len() as i64)
    }

    fn oid_count(&self, btid: Btid) -> LocatorResult<i64> {
        Ok(self
            .trees
            .lock()
            .get(&btid)
            .map(|entries| entries.len() as i64)
            .unwrap_or(0))
    }

    fn null_count(&self, btid: Btid) -> LocatorResult<i64> {
        Ok(self
            .trees
            .lock()
            .get(&btid)
            .map(|entries| entries.iter().filter(|(k, _)| key_is_null(k)).count() as i64)
            .unwrap_or(0))
    }
}
