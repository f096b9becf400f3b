//! `locator-db`: the object locator and B+tree page codec for a
//! transactional relational database server, binding the workspace's
//! six components into one facade.
//!
//! | Component | Crate |
//! |---|---|
//! | C1 page codec | [`locator_btree`] |
//! | C2 classname registry | [`locator_classname`] |
//! | C3 copy-area protocol | [`locator_copyarea`] |
//! | C4 fetch engine | [`locator_engine`] (`fetch`) |
//! | C5 force engine | [`locator_engine`] (`force`) |
//! | C6 index maintainer & FK enforcer | [`locator_engine`] (`index`) |
//!
//! `locator-core` supplies the identifiers, error type, and external
//! collaborator traits (heap, lock manager, catalog, durable hash,
//! B+tree runtime) that every other crate is generic over; a real
//! deployment implements those traits against its own storage engine,
//! while `locator-testkit`'s in-memory doubles let this crate's own
//! test suite and the cross-crate tests under `tests/` exercise every
//! invariant without one.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use locator_btree as btree_codec;
pub use locator_classname as classname;
pub use locator_concurrency as concurrency;
pub use locator_copyarea as copyarea;
pub use locator_core as core;
pub use locator_engine as engine;

pub use locator_classname::{ActionKind, ActionRecord, ClassnameRegistry, FindOutcome, RegistryConfig, RenameOutcome, ReserveOutcome};
pub use locator_concurrency::{CatalogOidTable, ClassnameTable, ScanCacheStats, TransactionContext, UniqueStats};
pub use locator_copyarea::{AppendOutcome, CopyArea, ManyObjsHeader, OneObj, Operation};
pub use locator_core::{
    AttrId, BTreeRuntime, Btid, CatalogApi, ClassInfo, ClassOid, DurableHash, ForeignKeyDef,
    HeapApi, Hfid, IndexDescriptor, IndexKind, LockApi, LockMode, LocatorError, LocatorResult,
    Oid, ReferentialAction, Record, TranIndex, Value, Vfid, Vpid,
};
pub use locator_engine::{
    record_chn, CascadeDelegate, Chn, FetchAllPage, FetchEngine, ForceEngine, ForceScanCache,
    IndexMaintainer, Lockset, LocksetObject, LocatorConfig, VerificationReport, CLASS_NAME_ATTR,
    ROOT_CLASS_OID,
};
