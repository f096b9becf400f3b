//! Identifiers shared by every component of the locator: object, heap file,
//! B+tree, volume-page, and volume-file references, plus the opaque log
//! sequence address used for savepoint ordering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sentinel used across every identifier field below to mean "no page",
/// "no volume", or "no slot". Mirrors the `NULL_PAGEID`/`NULL_VOLID`/
/// `NULL_SLOTID` convention: any field holding `-1` is unset.
pub const NULL_FIELD: i32 = -1;

/// Volume + page identifier. Total order is (volid, pageid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vpid {
    pub volid: i16,
    pub pageid: i32,
}

impl Vpid {
    pub const NULL: Vpid = Vpid {
        volid: NULL_FIELD as i16,
        pageid: NULL_FIELD,
    };

    pub fn is_null(&self) -> bool {
        self.pageid == NULL_FIELD
    }
}

impl PartialOrd for Vpid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Vpid {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.volid, self.pageid).cmp(&(other.volid, other.pageid))
    }
}

/// Volume + file identifier, the unit a heap or a B+tree is allocated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vfid {
    pub volid: i16,
    pub fileid: i32,
}

impl Vfid {
    pub const NULL: Vfid = Vfid {
        volid: NULL_FIELD as i16,
        fileid: NULL_FIELD,
    };

    pub fn is_null(&self) -> bool {
        self.fileid == NULL_FIELD
    }
}

/// Object identifier: volume, page, and slot within the page's heap.
///
/// Ordering is (volid, pageid, slotid) and is used only for deterministic
/// iteration (e.g. sorting a lockset before logging it); it carries no
/// semantic meaning about object age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Oid {
    pub volid: i16,
    pub pageid: i32,
    pub slotid: i16,
}

impl Oid {
    pub const NULL: Oid = Oid {
        volid: NULL_FIELD as i16,
        pageid: NULL_FIELD,
        slotid: NULL_FIELD as i16,
    };

    pub fn is_null(&self) -> bool {
        self.pageid == NULL_FIELD && self.slotid == NULL_FIELD as i16
    }

    pub fn new(volid: i16, pageid: i32, slotid: i16) -> Self {
        Self {
            volid,
            pageid,
            slotid,
        }
    }
}

impl Default for Oid {
    fn default() -> Self {
        Self::NULL
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.volid, self.pageid, self.slotid).cmp(&(other.volid, other.pageid, other.slotid))
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}|{}", self.volid, self.pageid, self.slotid)
    }
}

/// Heap file identifier: the file plus its first page, used to address a
/// class's instance storage as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hfid {
    pub vfid: Vfid,
    pub hpgid: i32,
}

impl Hfid {
    pub const NULL: Hfid = Hfid {
        vfid: Vfid::NULL,
        hpgid: NULL_FIELD,
    };

    pub fn is_null(&self) -> bool {
        self.vfid.is_null()
    }
}

/// B+tree identifier: the file plus its root page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Btid {
    pub vfid: Vfid,
    pub root_pageid: i32,
}

impl Btid {
    pub const NULL: Btid = Btid {
        vfid: Vfid::NULL,
        root_pageid: NULL_FIELD,
    };

    pub fn is_null(&self) -> bool {
        self.vfid.is_null()
    }
}

/// A totally-ordered, opaque log position. Only used here to order
/// savepoints within a transaction; the log itself is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Lsa {
    pub pageid: i64,
    pub offset: i32,
}

impl Lsa {
    pub const NULL: Lsa = Lsa {
        pageid: -1,
        offset: -1,
    };

    pub fn is_null(&self) -> bool {
        self.pageid < 0
    }
}

/// Class object id newtype, used to keep "an OID that names a class" and
/// "an OID that names an instance" distinguishable at call sites.
pub type ClassOid = Oid;

/// Attribute id within a class's attribute list.
pub type AttrId = i32;

/// Transaction identifier.
pub type TranIndex = i32;
