//! An in-memory stand-in for the lock manager: grants every request
//! unconditionally (no deadlock detection, no blocking), tracks the
//! current mode per `(tran, oid)` pair via the conversion table so
//! `current_mode` reflects what a real manager would report.

use std::collections::HashMap;

use locator_core::{ClassOid, LockApi, LockMode, LocatorResult, Oid, TranIndex};
use parking_lot::Mutex;

/// In-memory lock manager: grants every request immediately and tracks
/// the resulting mode per `(tran, oid)` pair.
#[derive(Default)]
pub struct InMemoryLockManager {
    held: Mutex<HashMap<(TranIndex, Oid), LockMode>>,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LockApi for InMemoryLockManager {
    fn lock_object(
        &self,
        tran: TranIndex,
        oid: Oid,
        _class_oid: ClassOid,
        mode: LockMode,
    ) -> LocatorResult<()> {
        let mut held = self.held.lock();
        let entry = held.entry((tran, oid)).or_insert(LockMode::Null);
        *entry = entry.convert(mode);
        Ok(())
    }

    fn unlock_object(&self, tran: TranIndex, oid: Oid) {
        self.held.lock().remove(&(tran, oid));
    }

    fn lock_objects(&self, tran: TranIndex, oids: &[(Oid, ClassOid, LockMode)]) -> LocatorResult<()> {
        for (oid, class_oid, mode) in oids {
            self.lock_object(tran, *oid, *class_oid, *mode)?;
        }
        Ok(())
    }

    fn lock_class(&self, tran: TranIndex, class_oid: ClassOid, mode: LockMode) -> LocatorResult<()> {
        self.lock_object(tran, class_oid, class_oid, mode)
    }

    fn unlock_class(&self, tran: TranIndex, class_oid: ClassOid) {
        self.unlock_object(tran, class_oid);
    }

    fn current_mode(&self, tran: TranIndex, oid: Oid) -> LockMode {
        self.held
            .lock()
            .get(&(tran, oid))
            .copied()
            .unwrap_or(LockMode::Null)
    }
}
