//! The two-tier classname registry: a durable classname→OID hash plus an
//! in-memory transient table of per-transaction actions with savepoint
//! rollback.
//!
//! The registry is the server's single source of truth for "does a class
//! by this name exist, and if so what OID does it have". Everything here
//! is built around one invariant: at most one non-`EXIST`
//! action for a name may be live across all transactions at any time,
//! enforced by having contenders block on the class OID lock rather than
//! on the registry's own critical section.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::result_large_err)]

pub mod action;
pub mod registry;

pub use action::{ActionKind, ActionRecord};
pub use registry::{ClassnameRegistry, FindOutcome, RegistryConfig, RenameOutcome, ReserveOutcome};
