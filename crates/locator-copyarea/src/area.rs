//! The copy area itself: a self-describing buffer of object slots plus
//! their serialized record payloads.
//!
//! The wire layout is a `MANYOBJS` header followed by `num_objs` fixed
//! slots growing down from the top of the buffer and record payloads
//! growing up from the bottom; the two regions never overlap. We keep
//! the header/slots and the payload bytes as separate `Vec`s internally
//! (simpler to grow and to reason about in Rust) and compose them into
//! the wire buffer only in `to_wire_bytes`, which is where the two
//! regions are actually laid out back-to-back the way a client expects.

use byteorder::{BigEndian, WriteBytesExt};
use locator_core::{ClassOid, Hfid, Oid};

/// One object's requested or completed operation, carried by its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    FetchVerifyChn,
    FetchDeleted,
    FetchDecacheLock,
    FlushInsert,
    FlushUpdate,
    FlushDelete,
}

impl Operation {
    fn to_raw(self) -> u8 {
        match self {
            Operation::Fetch => 0,
            Operation::FetchVerifyChn => 1,
            Operation::FetchDeleted => 2,
            Operation::FetchDecacheLock => 3,
            Operation::FlushInsert => 4,
            Operation::FlushUpdate => 5,
            Operation::FlushDelete => 6,
        }
    }
}

/// One `ONEOBJ` slot: the object it names, whether the class has indexes,
/// its heap file, its payload's length and offset in the record-data
/// region, and the requested/completed operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OneObj {
    pub oid: Oid,
    pub has_index: bool,
    pub hfid: Hfid,
    pub operation: Operation,
    payload: Vec<u8>,
}

impl OneObj {
    /// Length of this slot's record payload, 8-byte aligned per the wire
    /// format's record-padding rule.
    pub fn padded_len(&self) -> usize {
        crate::align8(self.payload.len())
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// The `MANYOBJS` header: object count, the batch's class (when every
/// slot names instances of one class, as in a multi-row `force` batch),
/// and the multi-update bracket flags the force engine reads to decide
/// single-row vs. multi-row accumulation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManyObjsHeader {
    pub class_oid: Option<ClassOid>,
    pub start_multi_update: bool,
    pub end_multi_update: bool,
}

/// Outcome of an attempted append: either it fit, or it didn't and the
/// caller must grow the area's budget to at least `required` bytes and
/// retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Fit,
    DoesntFit { required: usize },
}

/// Per-slot fixed-size overhead budgeted against the area, standing in
/// for the `ONEOBJ` struct's packed size on the wire: oid (8) + has_index
/// (1, padded) + hfid (8) + length (4) + offset (4) + operation (1,
/// padded), rounded to `MAX_ALIGN`.
const SLOT_HEADER_SIZE: usize = 32;

/// A copy area under construction: the `MANYOBJS` header, its slots, and
/// each slot's payload bytes.
#[derive(Debug, Clone, Default)]
pub struct CopyArea {
    pub header: ManyObjsHeader,
    slots: Vec<OneObj>,
}

impl CopyArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_objs(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[OneObj] {
        &self.slots
    }

    /// Bytes this area would currently occupy on the wire: slot headers
    /// growing down plus padded payloads growing up.
    pub fn used_bytes(&self) -> usize {
        self.slots
            .iter()
            .map(|s| SLOT_HEADER_SIZE + s.padded_len())
            .sum()
    }

    /// Append one object's slot and payload if it fits within `budget`
    /// bytes total. Returns `DoesntFit` with the byte count the caller
    /// must grow to, without mutating the area.
    pub fn try_append(
        &mut self,
        oid: Oid,
        has_index: bool,
        hfid: Hfid,
        operation: Operation,
        payload: &[u8],
        budget: usize,
    ) -> AppendOutcome {
        let additional = SLOT_HEADER_SIZE + crate::align8(payload.len());
        let required = self.used_bytes() + additional;
        if required > budget {
            return AppendOutcome::DoesntFit { required };
        }
        self.slots.push(OneObj {
            oid,
            has_index,
            hfid,
            operation,
            payload: payload.to_vec(),
        });
        AppendOutcome::Fit
    }

    /// The ordering guarantee for `fetch(oid, class_oid)`: when both an
    /// instance and its class are present in the area, the class's slot
    /// is moved to the front even though it was appended after the
    /// instance.
    pub fn move_to_front(&mut self, oid: Oid) {
        if let Some(pos) = self.slots.iter().position(|s| s.oid == oid) {
            if pos != 0 {
                let slot = self.slots.remove(pos);
                self.slots.insert(0, slot);
            }
        }
    }

    /// Notification/decache sub-protocol: if `oid` already
    /// has a slot, promote it in place to `FetchDecacheLock` rather than
    /// duplicating it. Otherwise append a zero-payload decache slot if
    /// room remains; returns `false` if there isn't room for even one
    /// more slot, signalling the caller rather than erroring.
    pub fn notify_decache(&mut self, oid: Oid, hfid: Hfid, budget: usize) -> bool {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.oid == oid) {
            slot.operation = Operation::FetchDecacheLock;
            return true;
        }
        if self.used_bytes() + SLOT_HEADER_SIZE > budget {
            return false;
        }
        self.slots.push(OneObj {
            oid,
            has_index: false,
            hfid,
            operation: Operation::FetchDecacheLock,
            payload: Vec::new(),
        });
        true
    }

    /// Drop every slot matching a null-sentinel OID, used by
    /// `fetch_all_references` to re-compact the lockset after a scan
    /// completes.
    pub fn retain_non_null(&mut self) {
        self.slots.retain(|s| !s.oid.is_null());
    }

    /// Serialize the area to its wire form: the `MANYOBJS` header, the
    /// slot table growing down, and the payload region growing up,
    /// meeting in the middle with no overlap.
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        let mut header_region = Vec::new();
        header_region
            .write_i32::<BigEndian>(self.slots.len() as i32)
            .unwrap();
        let (class_volid, class_pageid, class_slotid) = match self.header.class_oid {
            Some(oid) => (oid.volid, oid.pageid, oid.slotid),
            None => (-1, -1, -1),
        };
        header_region.write_i16::<BigEndian>(class_volid).unwrap();
        header_region
            .write_i32::<BigEndian>(class_pageid)
            .unwrap();
        header_region
            .write_i16::<BigEndian>(class_slotid)
            .unwrap();
        header_region
            .write_u8(self.header.start_multi_update as u8)
            .unwrap();
        header_region
            .write_u8(self.header.end_multi_update as u8)
            .unwrap();

        let mut record_region = Vec::new();
        for slot in &self.slots {
            header_region.write_i16::<BigEndian>(slot.oid.volid).unwrap();
            header_region
                .write_i32::<BigEndian>(slot.oid.pageid)
                .unwrap();
            header_region
                .write_i16::<BigEndian>(slot.oid.slotid)
                .unwrap();
            header_region.write_u8(slot.has_index as u8).unwrap();
            header_region
                .write_i16::<BigEndian>(slot.hfid.vfid.volid)
                .unwrap();
            header_region
                .write_i32::<BigEndian>(slot.hfid.vfid.fileid)
                .unwrap();
            header_region
                .write_i32::<BigEndian>(slot.hfid.hpgid)
                .unwrap();
            header_region
                .write_i32::<BigEndian>(slot.payload.len() as i32)
                .unwrap();
            header_region
                .write_i32::<BigEndian>(record_region.len() as i32)
                .unwrap();
            header_region.write_u8(slot.operation.to_raw()).unwrap();

            record_region.extend_from_slice(&slot.payload);
            let pad = slot.padded_len() - slot.payload.len();
            record_region.extend(std::iter::repeat(0u8).take(pad));
        }

        header_region.extend_from_slice(&record_region);
        header_region
    }
}
