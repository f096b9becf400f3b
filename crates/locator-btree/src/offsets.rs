//! Fixed byte offsets for the B+tree page layout, mirroring
//! `btree_load.h`'s `BTREE_NODE_TYPE_OFFSET` / `BTREE_NUM_OIDS_OFFSET` /
//! ... chain of `#define`s.
//!
//! Offsets are computed from field sizes rather than hand-duplicated, so a
//! field reorder cannot silently desync a reader from a writer.

/// Current on-disk revision of the page layout. Bump this whenever a field
/// is added, removed, or resized; `rev_level` on the root header records
/// which revision produced a given tree.
pub const BTREE_CURRENT_REV_LEVEL: i32 = 2;

/// Maximum alignment boundary record payloads are padded to.
pub const MAX_ALIGN: usize = 8;

pub(crate) const SHORT_SIZE: usize = 2;
pub(crate) const INT_SIZE: usize = 4;
/// `(volid: i16, pageid: i32)` packed with no padding.
pub(crate) const VPID_SIZE: usize = SHORT_SIZE + INT_SIZE;
/// `(fileid: i32, volid: i16)`, matching the disk layout's field order.
pub(crate) const VFID_SIZE: usize = INT_SIZE + SHORT_SIZE;

// --- Node header (common to leaf and non-leaf pages) ---
pub const NODE_TYPE_OFFSET: usize = 0;
pub const NODE_KEY_CNT_OFFSET: usize = NODE_TYPE_OFFSET + SHORT_SIZE;
pub const NODE_MAX_KEY_LEN_OFFSET: usize = NODE_KEY_CNT_OFFSET + SHORT_SIZE;
pub const NODE_NEXT_VPID_OFFSET: usize = NODE_MAX_KEY_LEN_OFFSET + SHORT_SIZE;

/// Size of the fields every node (leaf or non-leaf) page header carries.
pub const NODE_HEADER_SIZE: usize = NODE_NEXT_VPID_OFFSET + VPID_SIZE;

// --- Root header, extending the node header ---
pub const ROOT_NUM_OIDS_OFFSET: usize = NODE_HEADER_SIZE;
pub const ROOT_NUM_NULLS_OFFSET: usize = ROOT_NUM_OIDS_OFFSET + INT_SIZE;
pub const ROOT_NUM_KEYS_OFFSET: usize = ROOT_NUM_NULLS_OFFSET + INT_SIZE;
pub const ROOT_UNIQUE_OFFSET: usize = ROOT_NUM_KEYS_OFFSET + INT_SIZE;
pub const ROOT_REVERSE_OFFSET: usize = ROOT_UNIQUE_OFFSET + INT_SIZE;
pub const ROOT_REV_LEVEL_OFFSET: usize = ROOT_REVERSE_OFFSET + INT_SIZE;
pub const ROOT_OVFID_OFFSET: usize = ROOT_REV_LEVEL_OFFSET + INT_SIZE;
pub const ROOT_RESERVED_OFFSET: usize = ROOT_OVFID_OFFSET + VFID_SIZE;
pub const ROOT_KEY_TYPE_OFFSET: usize = ROOT_RESERVED_OFFSET + SHORT_SIZE;

/// Size of the root header's fixed-width fields, not counting the
/// variable-length serialized key-type domain that follows at
/// `ROOT_KEY_TYPE_OFFSET`.
pub const ROOT_HEADER_FIXED_SIZE: usize = ROOT_KEY_TYPE_OFFSET;

// --- Per-record fixed prefixes ---
/// `{ ovfl_vpid: Vpid, key_len: i16 }`, padded to `MAX_ALIGN`.
pub const LEAF_RECORD_PREFIX_SIZE: usize = VPID_SIZE + SHORT_SIZE;
/// `{ child_vpid: Vpid, key_len: i16 }`, padded to `MAX_ALIGN`.
pub const NON_LEAF_RECORD_PREFIX_SIZE: usize = VPID_SIZE + SHORT_SIZE;

// --- Overflow-key page header ---
/// The overflow page's own chain pointer lives at offset 0.
pub const OVERFLOW_NEXT_VPID_OFFSET: usize = 0;
pub const OVERFLOW_HEADER_SIZE: usize = VPID_SIZE;

/// Round `n` up to the next multiple of `MAX_ALIGN`.
pub const fn align(n: usize) -> usize {
    (n + MAX_ALIGN - 1) / MAX_ALIGN * MAX_ALIGN
}

/// The largest key length storable inline in a page of `pagesize` bytes;
/// longer keys are redirected through the overflow file. Matches
/// `BTREE_MAX_KEYLEN_INPAGE`.
pub const fn max_inline_key_len(pagesize: usize) -> usize {
    pagesize / 8
}

/// Upper bound on the bytes a leaf entry with a `key_len`-byte key
/// consumes, matching `LEAFENTSZ(n)`.
pub const fn leaf_entry_size(key_len: usize) -> usize {
    LEAF_RECORD_PREFIX_SIZE + MAX_ALIGN + OID_SIZE + MAX_ALIGN + key_len
}

/// Upper bound on the bytes a non-leaf entry with a `key_len`-byte key
/// consumes, matching `NLEAFENTSZ(n)`.
pub const fn non_leaf_entry_size(key_len: usize) -> usize {
    NON_LEAF_RECORD_PREFIX_SIZE + MAX_ALIGN + key_len
}

/// Disk size of a packed `OID` (volid + pageid + slotid).
pub const OID_SIZE: usize = SHORT_SIZE + INT_SIZE + SHORT_SIZE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_header_size_matches_spec_layout() {
        // +0 short, +2 short, +4 short, +6 short+int -> 12 bytes total.
        assert_eq!(NODE_HEADER_SIZE, 12);
    }

    #[test]
    fn root_header_fixed_size_matches_spec_layout() {
        // 12 (node header) + 4*5 (num_oids..rev_level) + 6 (ovfid) + 2 (reserved) = 44
        assert_eq!(ROOT_HEADER_FIXED_SIZE, 44);
    }

    #[test]
    fn align_rounds_up_to_max_align() {
        assert_eq!(align(0), 0);
        assert_eq!(align(1), 8);
        assert_eq!(align(8), 8);
        assert_eq!(align(9), 16);
    }
}
