//! The B+tree on-disk page layout and record codec.
//!
//! This crate is intentionally narrow: it knows the byte offsets of node,
//! root, and overflow-key page headers and per-record prefixes (§3 of the
//! covered specification), and nothing about how pages are latched,
//! allocated, or traversed — that's the B+tree runtime, an external
//! collaborator (`locator_core::contracts::BTreeRuntime`). The index
//! maintainer (`locator-engine`) uses this crate only when it must reason
//! about whether a derived key fits inline or needs the overflow file.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod offsets;

pub use codec::{
    read_leaf_record_prefix, read_node_header, read_non_leaf_record_prefix, read_oid,
    read_overflow_header, read_root_header, write_leaf_record_prefix, write_node_header,
    write_non_leaf_record_prefix, write_oid, write_overflow_header, write_root_header,
    LeafRecordPrefix, NodeHeader, NodeType, NonLeafRecordPrefix, OverflowKeyHeader, RootHeader,
};
pub use offsets::{
    align, leaf_entry_size, max_inline_key_len, non_leaf_entry_size, BTREE_CURRENT_REV_LEVEL,
    LEAF_RECORD_PREFIX_SIZE, MAX_ALIGN, NODE_HEADER_SIZE, NON_LEAF_RECORD_PREFIX_SIZE,
    ROOT_HEADER_FIXED_SIZE,
};
