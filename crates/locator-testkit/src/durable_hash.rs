//! An in-memory stand-in for the durable classname→OID extendible hash.

use locator_core::{DurableHash, LocatorResult, Oid};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// In-memory durable hash: a plain map behind a mutex. No crash-safety,
/// no I/O — it exists only so the classname registry's algorithms are
/// exercisable without a real extendible hash.
#[derive(Default)]
pub struct InMemoryDurableHash {
    entries: Mutex<FxHashMap<String, Oid>>,
}

impl InMemoryDurableHash {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableHash for InMemoryDurableHash {
    fn insert(&self, name: &str, oid: Oid) -> LocatorResult<()> {
        self.entries.lock().insert(name.to_string(), oid);
        Ok(())
    }

    fn delete(&self, name: &str) -> LocatorResult<()> {
        self.entries.lock().remove(name);
        Ok(())
    }

    fn search(&self, name: &str) -> LocatorResult<Option<Oid>> {
        Ok(self.entries.lock().get(name).copied())
    }

    fn for_each(&self, f: &mut dyn FnMut(&str, Oid)) {
        for (name, oid) in self.entries.lock().iter() {
            f(name, *oid);
        }
    }
}
