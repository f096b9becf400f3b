//! Readers and writers for the fixed-offset fields of §3's page layout.
//!
//! Every function here is a pure transform over a caller-owned byte
//! buffer: no I/O, no allocation beyond the decoded struct itself, and no
//! opinion about page latching (the caller is assumed to hold whatever
//! lock protects concurrent access to the buffer). Offset violations are
//! caller bugs and are asserted, not returned as `Result` — matching the
//! "little semantic work, no runtime error" failure model of the
//! original codec.

use byteorder::{BigEndian, ByteOrder};
use locator_core::{Oid, Vfid, Vpid};

use crate::offsets::*;

/// Which kind of node a page header describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Leaf,
    NonLeaf,
}

impl NodeType {
    fn from_raw(raw: i16) -> Self {
        if raw == 0 {
            NodeType::Leaf
        } else {
            NodeType::NonLeaf
        }
    }

    fn to_raw(self) -> i16 {
        match self {
            NodeType::Leaf => 0,
            NodeType::NonLeaf => 1,
        }
    }
}

/// The header fields common to every node page, decoded from bytes 0..12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeader {
    pub node_type: NodeType,
    pub key_count: i16,
    pub max_key_len: i16,
    pub next_vpid: Vpid,
}

/// The root page's header: the node header plus tree-wide counters,
/// uniqueness flags, the overflow file reference, and (out of band,
/// decoded separately) the serialized key-type domain starting at
/// `ROOT_HEADER_FIXED_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootHeader {
    pub node: NodeHeader,
    pub num_oids: i32,
    pub num_nulls: i32,
    pub num_keys: i32,
    pub unique: bool,
    pub reverse: bool,
    pub rev_level: i32,
    pub ovfid: Vfid,
}

impl RootHeader {
    /// `num_oids == num_nulls + num_keys`, the uniqueness invariant tested
    /// by verification.
    pub fn is_count_consistent(&self) -> bool {
        self.num_oids == self.num_nulls + self.num_keys
    }
}

/// Fixed prefix of a leaf-page record: the overflow chain pointer for
/// large keys (null when the key is stored inline) and the key's encoded
/// length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafRecordPrefix {
    pub ovfl_vpid: Vpid,
    pub key_len: i16,
}

/// Fixed prefix of a non-leaf-page record: the downward child pointer and
/// the key's encoded length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonLeafRecordPrefix {
    pub child_vpid: Vpid,
    pub key_len: i16,
}

/// Header of an overflow-key page: just the chain pointer to the next
/// overflow page for this key (null on the last page of the chain).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverflowKeyHeader {
    pub next_vpid: Vpid,
}

fn read_vpid(buf: &[u8], offset: usize) -> Vpid {
    debug_assert!(buf.len() >= offset + VPID_SIZE, "vpid read out of range");
    let volid = BigEndian::read_i16(&buf[offset..]);
    let pageid = BigEndian::read_i32(&buf[offset + SHORT_SIZE..]);
    Vpid { volid, pageid }
}

fn write_vpid(buf: &mut [u8], offset: usize, v: Vpid) {
    debug_assert!(buf.len() >= offset + VPID_SIZE, "vpid write out of range");
    BigEndian::write_i16(&mut buf[offset..], v.volid);
    BigEndian::write_i32(&mut buf[offset + SHORT_SIZE..], v.pageid);
}

fn read_vfid(buf: &[u8], offset: usize) -> Vfid {
    debug_assert!(buf.len() >= offset + VFID_SIZE, "vfid read out of range");
    let fileid = BigEndian::read_i32(&buf[offset..]);
    let volid = BigEndian::read_i16(&buf[offset + INT_SIZE..]);
    Vfid { volid, fileid }
}

fn write_vfid(buf: &mut [u8], offset: usize, v: Vfid) {
    debug_assert!(buf.len() >= offset + VFID_SIZE, "vfid write out of range");
    BigEndian::write_i32(&mut buf[offset..], v.fileid);
    BigEndian::write_i16(&mut buf[offset + INT_SIZE..], v.volid);
}

/// Read the field common to leaf and non-leaf pages starting at byte 0.
pub fn read_node_header(buf: &[u8]) -> NodeHeader {
    debug_assert!(buf.len() >= NODE_HEADER_SIZE, "page too short for node header");
    NodeHeader {
        node_type: NodeType::from_raw(BigEndian::read_i16(&buf[NODE_TYPE_OFFSET..])),
        key_count: BigEndian::read_i16(&buf[NODE_KEY_CNT_OFFSET..]),
        max_key_len: BigEndian::read_i16(&buf[NODE_MAX_KEY_LEN_OFFSET..]),
        next_vpid: read_vpid(buf, NODE_NEXT_VPID_OFFSET),
    }
}

/// Write the node header fields at byte 0. The caller's buffer must be at
/// least `NODE_HEADER_SIZE` bytes (callers writing a root page additionally
/// need `ROOT_HEADER_FIXED_SIZE` for the extended fields).
pub fn write_node_header(buf: &mut [u8], header: &NodeHeader) {
    debug_assert!(buf.len() >= NODE_HEADER_SIZE, "page too short for node header");
    BigEndian::write_i16(&mut buf[NODE_TYPE_OFFSET..], header.node_type.to_raw());
    BigEndian::write_i16(&mut buf[NODE_KEY_CNT_OFFSET..], header.key_count);
    BigEndian::write_i16(&mut buf[NODE_MAX_KEY_LEN_OFFSET..], header.max_key_len);
    write_vpid(buf, NODE_NEXT_VPID_OFFSET, header.next_vpid);
}

/// Read a root page's full fixed-size header (node header plus the
/// tree-wide counters and overflow reference). Does not decode the
/// variable-length key-type domain that follows at
/// `ROOT_HEADER_FIXED_SIZE` — callers read that separately with whatever
/// domain codec the catalog uses.
pub fn read_root_header(buf: &[u8]) -> RootHeader {
    debug_assert!(
        buf.len() >= ROOT_HEADER_FIXED_SIZE,
        "page too short for root header"
    );
    RootHeader {
        node: read_node_header(buf),
        num_oids: BigEndian::read_i32(&buf[ROOT_NUM_OIDS_OFFSET..]),
        num_nulls: BigEndian::read_i32(&buf[ROOT_NUM_NULLS_OFFSET..]),
        num_keys: BigEndian::read_i32(&buf[ROOT_NUM_KEYS_OFFSET..]),
        unique: BigEndian::read_i32(&buf[ROOT_UNIQUE_OFFSET..]) != 0,
        reverse: BigEndian::read_i32(&buf[ROOT_REVERSE_OFFSET..]) != 0,
        rev_level: BigEndian::read_i32(&buf[ROOT_REV_LEVEL_OFFSET..]),
        ovfid: read_vfid(buf, ROOT_OVFID_OFFSET),
    }
}

/// Write a root page's fixed-size header. The reserved halfword at
/// `ROOT_RESERVED_OFFSET` is zeroed; the variable-length key-type domain
/// at `ROOT_HEADER_FIXED_SIZE` is left untouched.
pub fn write_root_header(buf: &mut [u8], header: &RootHeader) {
    debug_assert!(
        buf.len() >= ROOT_HEADER_FIXED_SIZE,
        "page too short for root header"
    );
    write_node_header(buf, &header.node);
    BigEndian::write_i32(&mut buf[ROOT_NUM_OIDS_OFFSET..], header.num_oids);
    BigEndian::write_i32(&mut buf[ROOT_NUM_NULLS_OFFSET..], header.num_nulls);
    BigEndian::write_i32(&mut buf[ROOT_NUM_KEYS_OFFSET..], header.num_keys);
    BigEndian::write_i32(&mut buf[ROOT_UNIQUE_OFFSET..], header.unique as i32);
    BigEndian::write_i32(&mut buf[ROOT_REVERSE_OFFSET..], header.reverse as i32);
    BigEndian::write_i32(&mut buf[ROOT_REV_LEVEL_OFFSET..], header.rev_level);
    write_vfid(buf, ROOT_OVFID_OFFSET, header.ovfid);
    BigEndian::write_i16(&mut buf[ROOT_RESERVED_OFFSET..], 0);
}

/// Read a leaf record's fixed prefix at `offset`.
pub fn read_leaf_record_prefix(buf: &[u8], offset: usize) -> LeafRecordPrefix {
    debug_assert!(
        buf.len() >= offset + LEAF_RECORD_PREFIX_SIZE,
        "leaf record prefix out of range"
    );
    LeafRecordPrefix {
        ovfl_vpid: read_vpid(buf, offset),
        key_len: BigEndian::read_i16(&buf[offset + VPID_SIZE..]),
    }
}

/// Write a leaf record's fixed prefix at `offset`.
pub fn write_leaf_record_prefix(buf: &mut [u8], offset: usize, prefix: &LeafRecordPrefix) {
    debug_assert!(
        buf.len() >= offset + LEAF_RECORD_PREFIX_SIZE,
        "leaf record prefix out of range"
    );
    write_vpid(buf, offset, prefix.ovfl_vpid);
    BigEndian::write_i16(&mut buf[offset + VPID_SIZE..], prefix.key_len);
}

/// Read a non-leaf record's fixed prefix at `offset`.
pub fn read_non_leaf_record_prefix(buf: &[u8], offset: usize) -> NonLeafRecordPrefix {
    debug_assert!(
        buf.len() >= offset + NON_LEAF_RECORD_PREFIX_SIZE,
        "non-leaf record prefix out of range"
    );
    NonLeafRecordPrefix {
        child_vpid: read_vpid(buf, offset),
        key_len: BigEndian::read_i16(&buf[offset + VPID_SIZE..]),
    }
}

/// Write a non-leaf record's fixed prefix at `offset`.
pub fn write_non_leaf_record_prefix(buf: &mut [u8], offset: usize, prefix: &NonLeafRecordPrefix) {
    debug_assert!(
        buf.len() >= offset + NON_LEAF_RECORD_PREFIX_SIZE,
        "non-leaf record prefix out of range"
    );
    write_vpid(buf, offset, prefix.child_vpid);
    BigEndian::write_i16(&mut buf[offset + VPID_SIZE..], prefix.key_len);
}

/// Read an overflow-key page's header (just the forward chain pointer).
pub fn read_overflow_header(buf: &[u8]) -> OverflowKeyHeader {
    debug_assert!(
        buf.len() >= OVERFLOW_HEADER_SIZE,
        "page too short for overflow header"
    );
    OverflowKeyHeader {
        next_vpid: read_vpid(buf, OVERFLOW_NEXT_VPID_OFFSET),
    }
}

/// Write an overflow-key page's header.
pub fn write_overflow_header(buf: &mut [u8], header: &OverflowKeyHeader) {
    debug_assert!(
        buf.len() >= OVERFLOW_HEADER_SIZE,
        "page too short for overflow header"
    );
    write_vpid(buf, OVERFLOW_NEXT_VPID_OFFSET, header.next_vpid);
}

/// Pack an `Oid` into its on-disk representation at `offset`, used by the
/// leaf entry body (the fixed prefix is followed by the key, then the
/// instance `OID`, per `LEAFENTSZ`).
pub fn write_oid(buf: &mut [u8], offset: usize, oid: Oid) {
    debug_assert!(buf.len() >= offset + OID_SIZE, "oid write out of range");
    BigEndian::write_i16(&mut buf[offset..], oid.volid);
    BigEndian::write_i32(&mut buf[offset + SHORT_SIZE..], oid.pageid);
    BigEndian::write_i16(&mut buf[offset + SHORT_SIZE + INT_SIZE..], oid.slotid);
}

/// Unpack an `Oid` from its on-disk representation at `offset`.
pub fn read_oid(buf: &[u8], offset: usize) -> Oid {
    debug_assert!(buf.len() >= offset + OID_SIZE, "oid read out of range");
    Oid {
        volid: BigEndian::read_i16(&buf[offset..]),
        pageid: BigEndian::read_i32(&buf[offset + SHORT_SIZE..]),
        slotid: BigEndian::read_i16(&buf[offset + SHORT_SIZE + INT_SIZE..]),
    }
}
