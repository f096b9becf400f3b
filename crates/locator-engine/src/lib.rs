//! Fetch engine, force engine, and index maintainer/FK enforcer for the
//! object locator.
//!
//! This crate is where the other locator crates come together: `fetch`
//! answers client reads by building copy areas out of `locator-copyarea`
//! buffers, `force` applies a flushed batch's inserts/updates/deletes,
//! and `index` keeps every class's B+tree indexes (via
//! `locator-btree`/`locator-core::BTreeRuntime`) and foreign keys
//! consistent with the heap. `config` carries the tunables all three
//! share.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::result_large_err)]

mod config;
mod fetch;
mod force;
mod index;

pub use config::LocatorConfig;
pub use fetch::{record_chn, Chn, FetchAllPage, FetchEngine, Lockset, LocksetObject};
pub use force::{ForceEngine, ForceScanCache, CLASS_NAME_ATTR, ROOT_CLASS_OID};
pub use index::{CascadeDelegate, IndexMaintainer, VerificationReport};
