//! Unified error type for every locator component.
//!
//! One enum covers classname registry conflicts, fetch/force failures,
//! index maintenance and foreign-key violations, and page-codec
//! corruption. Each variant carries the data a caller needs to decide
//! whether to retry, surface to the client verbatim, or abort the
//! transaction.

use crate::ids::{Btid, Oid};
use thiserror::Error;

/// The locator's unified error type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocatorError {
    /// A classname is already reserved or exists under a different OID.
    #[error("class name {name:?} already taken by {existing}")]
    ClassnameExists { name: String, existing: Oid },

    /// A classname lookup found no entry, durable or transient.
    #[error("class name {name:?} is not registered")]
    ClassnameNotFound { name: String },

    /// A classname action conflicts with one already active in this
    /// transaction (e.g. delete-then-reserve of the same name twice).
    #[error("class name {name:?} has a conflicting pending action")]
    ClassnameActionConflict { name: String },

    /// The transient classname table's attempt to roll back past a
    /// savepoint it never recorded.
    #[error("no savepoint recorded for lsa {0:?}")]
    SavepointNotFound(crate::ids::Lsa),

    /// A copy area could not hold its payload even after the caller's
    /// preferred retry budget was exhausted.
    #[error("copy area of {attempted} bytes insufficient, need at least {required}")]
    CopyAreaTooSmall { attempted: usize, required: usize },

    /// An object fetch found no live object at the given OID.
    #[error("object {0} does not exist")]
    ObjectNotFound(Oid),

    /// A requested lock could not be granted (the lock manager is a
    /// collaborator; this variant is what the locator surfaces to its
    /// caller when that collaborator refuses).
    #[error("lock request on {oid} was refused")]
    LockRefused { oid: Oid },

    /// A flush batch referenced an OID class that does not match any
    /// known class, or mixed class OIDs within one MANYOBJS batch that
    /// should have been split per-class.
    #[error("flush slot for {oid} names unknown class {class_oid}")]
    UnknownClassInFlush { oid: Oid, class_oid: Oid },

    /// Foreign key violation on delete/update of a referenced row with
    /// `RESTRICT`/`NO ACTION` semantics and still-live referencing rows.
    #[error("foreign key {fk_name:?} on {btid:?} restricts this operation")]
    FkRestrict { fk_name: String, btid: Btid },

    /// A foreign key's `update` action would require a cascading update,
    /// which this locator does not implement; callers must avoid
    /// updating a referenced key's value instead.
    #[error("foreign key {fk_name:?} requires CASCADE on update, which is unsupported")]
    FkCascadeUpdateUnsupported { fk_name: String },

    /// The referencing side of a foreign key insert/update points at a
    /// primary key value that does not exist.
    #[error("foreign key {fk_name:?} value has no matching primary key")]
    FkValueNotFound { fk_name: String },

    /// A uniqueness violation: the key already exists in the index.
    #[error("unique index {btid:?} already has a matching key")]
    UniqueViolation { btid: Btid },

    /// The heap and a B+tree disagree about an object's membership,
    /// detected by a consistency scan. Carries which direction the
    /// mismatch was found in.
    #[error("btree {btid:?} inconsistent with heap: {kind:?}")]
    InconsistentBtreeEntry {
        btid: Btid,
        kind: BtreeInconsistencyKind,
    },

    /// A classname registry or index scan found an unexplainable state
    /// (e.g. a transient entry with no action record).
    #[error("classname table inconsistent: {detail}")]
    InconsistentClassname { detail: String },

    /// A page codec read failed CRC validation, magic-byte check, or
    /// hit a length that violates `BTREE_MAX_KEYLEN_INPAGE`.
    #[error("corrupt page: {detail}")]
    CorruptPage { detail: String },

    /// A caller-supplied value does not fit the operation (e.g. a key
    /// longer than the configured overflow threshold without a
    /// corresponding overflow OID).
    #[error("invalid operation: {detail}")]
    InvalidOperation { detail: String },

    /// An internal invariant was violated; this should never surface
    /// outside of tests and indicates a bug in the locator itself.
    #[error("internal invariant violated: {detail}")]
    Internal { detail: String },
}

/// Sub-classification of an `InconsistentBtreeEntry`, matching the
/// directions a uniqueness-check scan can fail in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BtreeInconsistencyKind {
    /// A live heap object has no corresponding index entry.
    HeapEntryMissingFromTree,
    /// An index entry points at an OID the heap does not have.
    TreeEntryMissingFromHeap,
    /// An index entry points at an OID the heap has, but that object's
    /// class or header marks it as logically deleted.
    TreeEntryPointsToDeadHeapRecord,
    /// The index's tracked key/OID counts disagree with a direct scan.
    CountMismatch,
}

impl LocatorError {
    /// Conditions where retrying the same operation, possibly after a
    /// short backoff, can succeed without caller-visible state change:
    /// lock contention and copy-area undersizing are the only such
    /// cases here, everything else is a terminal outcome for the call.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LocatorError::LockRefused { .. } | LocatorError::CopyAreaTooSmall { .. }
        )
    }

    /// Conditions serious enough that a caller should treat the
    /// surrounding transaction as unsalvageable rather than attempt
    /// statement-level recovery.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LocatorError::InconsistentBtreeEntry { .. }
                | LocatorError::InconsistentClassname { .. }
                | LocatorError::CorruptPage { .. }
                | LocatorError::Internal { .. }
        )
    }
}

/// Convenience alias used throughout the locator crates.
pub type LocatorResult<T> = Result<T, LocatorError>;
