//! Trait contracts for every external collaborator the locator depends on
//! but does not implement: the durable classname hash, the heap, the lock
//! manager, the catalog, and the B+tree runtime. `locator-testkit`
//! supplies one in-memory implementation of each so the locator's own
//! algorithms can be exercised without a real storage engine.

use crate::error::LocatorResult;
use crate::ids::{AttrId, Btid, ClassOid, Hfid, Oid};
use crate::lock::LockMode;
use crate::value::{Record, Value};

/// The durable, crash-safe classname -> OID hash that backs the
/// permanent half of the classname registry.
pub trait DurableHash: Send + Sync {
    fn insert(&self, name: &str, oid: Oid) -> LocatorResult<()>;
    fn delete(&self, name: &str) -> LocatorResult<()>;
    fn search(&self, name: &str) -> LocatorResult<Option<Oid>>;
    fn for_each(&self, f: &mut dyn FnMut(&str, Oid));
}

/// Heap-file operations the fetch/force engines drive directly.
pub trait HeapApi: Send + Sync {
    fn insert(&self, hfid: Hfid, class_oid: ClassOid, record: &Record) -> LocatorResult<Oid>;
    fn update(&self, oid: Oid, record: &Record) -> LocatorResult<()>;
    fn delete(&self, oid: Oid) -> LocatorResult<()>;
    fn get(&self, oid: Oid) -> LocatorResult<Option<Record>>;
    /// Returns the next live OID in the heap after `after` (`None` to
    /// start a fresh scan), used by paginated class scans.
    fn next(&self, hfid: Hfid, after: Option<Oid>) -> LocatorResult<Option<Oid>>;
    fn get_class_oid(&self, oid: Oid) -> LocatorResult<Option<ClassOid>>;
    fn does_exist(&self, oid: Oid) -> LocatorResult<bool>;
    fn estimate_num_objects(&self, hfid: Hfid) -> LocatorResult<i64>;
}

/// Lock manager operations used to acquire or release object/class
/// locks before a fetch or force proceeds.
pub trait LockApi: Send + Sync {
    fn lock_object(&self, tran: i32, oid: Oid, class_oid: ClassOid, mode: LockMode)
        -> LocatorResult<()>;
    fn unlock_object(&self, tran: i32, oid: Oid);
    fn lock_objects(&self, tran: i32, oids: &[(Oid, ClassOid, LockMode)]) -> LocatorResult<()>;
    fn lock_class(&self, tran: i32, class_oid: ClassOid, mode: LockMode) -> LocatorResult<()>;
    /// Release a previously granted class lock. Used both to drop a
    /// genuinely held lock and to release the "dirty read" lock taken
    /// only to wait out a classname contender (§4.2's reserve/delete/
    /// rename protocol).
    fn unlock_class(&self, tran: i32, class_oid: ClassOid);
    fn current_mode(&self, tran: i32, oid: Oid) -> LockMode;
}

/// Catalog operations used to resolve a class's heap file and index
/// descriptors.
pub trait CatalogApi: Send + Sync {
    fn get_class_info(&self, class_oid: ClassOid) -> LocatorResult<Option<ClassInfo>>;
    fn update_class_info(&self, info: ClassInfo) -> LocatorResult<()>;
}

/// The catalog's view of a class, as consumed by the force and index
/// maintenance paths.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub class_oid: ClassOid,
    pub hfid: Hfid,
    pub indexes: Vec<IndexDescriptor>,
    pub tot_objects: i64,
}

/// What kind of index a `BTID` backs, and whether it enforces a foreign
/// key.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexKind {
    Unique,
    NonUnique,
    PrimaryKey,
    ForeignKey,
}

/// A foreign key's referential action and cache-repair metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyDef {
    pub name: String,
    pub ref_class_oid: ClassOid,
    pub ref_pk_btid: Btid,
    pub delete_action: ReferentialAction,
    pub update_action: ReferentialAction,
    /// Attribute on the referencing class that caches the resolved OID
    /// of the referenced row, repaired whenever the reference changes.
    pub cache_attr_id: Option<AttrId>,
}

/// What to do to a referencing row when the referenced row is deleted or
/// its key is updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
    Restrict,
    NoAction,
    Cascade,
    SetNull,
}

/// An index's coverage, kind, and foreign-key metadata (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDescriptor {
    pub btid: Btid,
    pub attr_ids: Vec<AttrId>,
    pub kind: IndexKind,
    pub fk: Option<ForeignKeyDef>,
}

/// B+tree operations beyond the page layout itself: insert/delete/find
/// and statistics reflection.
pub trait BTreeRuntime: Send + Sync {
    /// Insert `(key, oid)`. Returns `true` if no prior entry existed
    /// for `key` in this tree, `false` if this insert collided with an
    /// existing key — the caller feeds this straight into unique-index
    /// statistics rather than treating every insert as a distinct key.
    fn insert(&self, btid: Btid, key: &[Value], oid: Oid) -> LocatorResult<bool>;
    fn delete(&self, btid: Btid, key: &[Value], oid: Oid) -> LocatorResult<()>;
    fn find_unique(&self, btid: Btid, key: &[Value]) -> LocatorResult<Option<Oid>>;
    /// All OIDs stored under `key`, used by non-unique lookups and by
    /// foreign-key presence checks.
    fn find_all(&self, btid: Btid, key: &[Value]) -> LocatorResult<Vec<Oid>>;
    fn key_count(&self, btid: Btid) -> LocatorResult<i64>;
    fn oid_count(&self, btid: Btid) -> LocatorResult<i64>;
    fn null_count(&self, btid: Btid) -> LocatorResult<i64>;
}
