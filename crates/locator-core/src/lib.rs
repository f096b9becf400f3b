//! Identifiers, the unified error type, external-collaborator contracts,
//! lock-mode algebra, typed attribute values, and the arena allocator
//! shared by every other `locator-*` crate.
//!
//! This crate has no knowledge of the page layout, the classname registry,
//! the copy-area wire format, or the fetch/force algorithms; it only
//! defines the vocabulary those crates share.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::result_large_err)]

pub mod arena;
pub mod contracts;
pub mod error;
pub mod ids;
pub mod lock;
pub mod value;

pub use arena::Arena;
pub use contracts::{
    BTreeRuntime, CatalogApi, ClassInfo, DurableHash, ForeignKeyDef, HeapApi, IndexDescriptor,
    IndexKind, LockApi, ReferentialAction,
};
pub use error::{BtreeInconsistencyKind, LocatorError, LocatorResult};
pub use ids::{AttrId, Btid, ClassOid, Hfid, Lsa, Oid, TranIndex, Vfid, Vpid, NULL_FIELD};
pub use lock::LockMode;
pub use value::{key_is_null, Record, Value};
