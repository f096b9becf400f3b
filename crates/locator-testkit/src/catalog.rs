//! An in-memory stand-in for the catalog: per-class heap file and index
//! descriptor lookup.

use std::collections::HashMap;

use locator_core::{CatalogApi, ClassInfo, ClassOid, LocatorResult};
use parking_lot::Mutex;

/// In-memory catalog: a plain map from class OID to `ClassInfo`.
#[derive(Default)]
pub struct InMemoryCatalog {
    classes: Mutex<HashMap<ClassOid, ClassInfo>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogApi for InMemoryCatalog {
    fn get_class_info(&self, class_oid: ClassOid) -> LocatorResult<Option<ClassInfo>> {
        Ok(self.classes.lock().get(&class_oid).cloned())
    }

    fn update_class_info(&self, info: ClassInfo) -> LocatorResult<()> {
        self.classes.lock().insert(info.class_oid, info);
        Ok(())
    }
}
