//! The two named critical sections the locator serializes through:
//! `classname-table` and `catalog-oid-table`. Lock order is
//! fixed — a thread may hold `classname-table` and then acquire
//! `catalog-oid-table`, never the reverse — and debug builds catch a
//! violation via a thread-local re-entrancy counter rather than relying
//! on call-site discipline alone.

use std::cell::Cell;
use std::ops::{Deref, DerefMut};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

thread_local! {
    static CATALOG_OID_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// The classname critical section. May be acquired while the calling
/// thread already holds `CatalogOidTable`'s section — acquiring it
/// *after* catalog-oid-table is the forbidden direction and trips a
/// `debug_assert!`.
pub struct ClassnameTable<T> {
    inner: RwLock<T>,
}

impl<T> ClassnameTable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        debug_assert_eq!(
            CATALOG_OID_DEPTH.with(|d| d.get()),
            0,
            "lock order violation: acquired classname-table while holding catalog-oid-table"
        );
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        debug_assert_eq!(
            CATALOG_OID_DEPTH.with(|d| d.get()),
            0,
            "lock order violation: acquired classname-table while holding catalog-oid-table"
        );
        self.inner.write()
    }
}

/// The catalog-OID-table critical section. Tracks its own re-entrancy
/// depth on the current thread so `ClassnameTable` can refuse to be
/// acquired underneath it.
pub struct CatalogOidTable<T> {
    inner: RwLock<T>,
}

impl<T> CatalogOidTable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    pub fn read(&self) -> CatalogOidReadGuard<'_, T> {
        CATALOG_OID_DEPTH.with(|d| d.set(d.get() + 1));
        CatalogOidReadGuard {
            guard: self.inner.read(),
        }
    }

    pub fn write(&self) -> CatalogOidWriteGuard<'_, T> {
        CATALOG_OID_DEPTH.with(|d| d.set(d.get() + 1));
        CatalogOidWriteGuard {
            guard: self.inner.write(),
        }
    }
}

/// Read guard for `CatalogOidTable`; decrements the re-entrancy depth on
/// drop so a later `ClassnameTable` acquisition on this thread is legal
/// again.
pub struct CatalogOidReadGuard<'a, T> {
    guard: RwLockReadGuard<'a, T>,
}

impl<T> Deref for CatalogOidReadGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> Drop for CatalogOidReadGuard<'_, T> {
    fn drop(&mut self) {
        CATALOG_OID_DEPTH.with(|d| d.set(d.get() - 1));
    }
}

/// Write guard for `CatalogOidTable`; see `CatalogOidReadGuard`.
pub struct CatalogOidWriteGuard<'a, T> {
    guard: RwLockWriteGuard<'a, T>,
}

impl<T> Deref for CatalogOidWriteGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for CatalogOidWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for CatalogOidWriteGuard<'_, T> {
    fn drop(&mut self) {
        CATALOG_OID_DEPTH.with(|d| d.set(d.get() - 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classname_then_catalog_oid_is_the_legal_order() {
        let classname = ClassnameTable::new(0u32);
        let catalog = CatalogOidTable::new(0u32);
        let _c = classname.write();
        let _o = catalog.write();
    }

    #[test]
    #[should_panic(expected = "lock order violation")]
    fn catalog_oid_then_classname_panics_in_debug() {
        let classname = ClassnameTable::new(0u32);
        let catalog = CatalogOidTable::new(0u32);
        let _o = catalog.write();
        let _c = classname.write();
    }

    #[test]
    fn guard_drop_clears_reentrancy_depth() {
        let classname = ClassnameTable::new(0u32);
        let catalog = CatalogOidTable::new(0u32);
        {
            let _o = catalog.write();
        }
        // depth should be back to zero, so this must not panic
        let _c = classname.write();
    }
}
