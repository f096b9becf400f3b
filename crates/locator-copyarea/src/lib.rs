//! The elastic copy-area wire format used to ship objects and flush
//! batches between server and client.
//!
//! This crate owns the buffer shape and its grow-and-retry sizing
//! discipline; it has no opinion about *which* objects end up in an
//! area — that's the fetch/force engines in `locator-engine`.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod area;
mod grow;

pub use area::{AppendOutcome, CopyArea, ManyObjsHeader, OneObj, Operation};
pub use grow::grow_and_retry;

/// Round `n` up to an 8-byte boundary, matching the B+tree codec's
/// `MAX_ALIGN` and the wire format's record padding rule.
pub fn align8(n: usize) -> usize {
    (n + 7) / 8 * 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use locator_core::{Hfid, Oid, Vfid};

    fn hfid() -> Hfid {
        Hfid {
            vfid: Vfid { volid: 0, fileid: 1 },
            hpgid: 0,
        }
    }

    #[test]
    fn append_fits_within_budget() {
        let mut area = CopyArea::new();
        let outcome = area.try_append(
            Oid::new(0, 1, 0),
            false,
            hfid(),
            Operation::Fetch,
            b"hello",
            4096,
        );
        assert_eq!(outcome, AppendOutcome::Fit);
        assert_eq!(area.num_objs(), 1);
    }

    #[test]
    fn append_reports_required_bytes_when_over_budget() {
        let mut area = CopyArea::new();
        let payload = vec![0u8; 1000];
        let outcome = area.try_append(Oid::new(0, 1, 0), false, hfid(), Operation::Fetch, &payload, 16);
        match outcome {
            AppendOutcome::DoesntFit { required } => assert!(required > 1000),
            AppendOutcome::Fit => panic!("expected DoesntFit"),
        }
        assert_eq!(area.num_objs(), 0, "failed append must not mutate the area");
    }

    #[test]
    fn grow_and_retry_eventually_fits_a_large_record() {
        let page = 256usize;
        let record = vec![7u8; page * 3 + 17];
        let area = grow_and_retry(page, |budget| {
            let mut area = CopyArea::new();
            match area.try_append(Oid::new(0, 1, 0), false, hfid(), Operation::Fetch, &record, budget) {
                AppendOutcome::Fit => Ok(area),
                AppendOutcome::DoesntFit { required } => Err(required),
            }
        });
        assert_eq!(area.num_objs(), 1);
        assert!(area.used_bytes() >= record.len());
    }

    #[test]
    fn fetch_places_class_before_instance_when_both_present() {
        let mut area = CopyArea::new();
        let instance_oid = Oid::new(0, 10, 0);
        let class_oid = Oid::new(0, 1, 0);
        area.try_append(instance_oid, true, hfid(), Operation::Fetch, b"inst", 4096);
        area.try_append(class_oid, false, hfid(), Operation::Fetch, b"class", 4096);
        area.move_to_front(class_oid);
        assert_eq!(area.slots()[0].oid, class_oid);
        assert_eq!(area.slots()[1].oid, instance_oid);
    }

    #[test]
    fn decache_notification_collapses_into_existing_slot() {
        let mut area = CopyArea::new();
        let oid = Oid::new(0, 5, 0);
        area.try_append(oid, false, hfid(), Operation::Fetch, b"x", 4096);
        assert!(area.notify_decache(oid, hfid(), 4096));
        assert_eq!(area.num_objs(), 1);
        assert_eq!(area.slots()[0].operation, Operation::FetchDecacheLock);
    }

    #[test]
    fn decache_notification_appends_when_oid_absent() {
        let mut area = CopyArea::new();
        let oid = Oid::new(0, 9, 0);
        assert!(area.notify_decache(oid, hfid(), 4096));
        assert_eq!(area.num_objs(), 1);
    }

    #[test]
    fn decache_notification_signals_when_no_room() {
        let mut area = CopyArea::new();
        let oid = Oid::new(0, 9, 0);
        assert!(!area.notify_decache(oid, hfid(), 4));
        assert_eq!(area.num_objs(), 0);
    }

    #[test]
    fn retain_non_null_drops_sentinel_slots() {
        let mut area = CopyArea::new();
        area.try_append(Oid::NULL, false, hfid(), Operation::Fetch, b"", 4096);
        area.try_append(Oid::new(0, 1, 0), false, hfid(), Operation::Fetch, b"x", 4096);
        area.retain_non_null();
        assert_eq!(area.num_objs(), 1);
    }

    #[test]
    fn empty_area_scan_has_zero_objects() {
        let area = CopyArea::new();
        assert_eq!(area.num_objs(), 0);
        let bytes = area.to_wire_bytes();
        assert!(bytes.len() >= 4);
    }

    #[test]
    fn wire_bytes_round_trip_object_count() {
        use byteorder::ByteOrder;
        let mut area = CopyArea::new();
        area.try_append(Oid::new(0, 1, 0), false, hfid(), Operation::Fetch, b"a", 4096);
        area.try_append(Oid::new(0, 2, 0), false, hfid(), Operation::Fetch, b"bb", 4096);
        let bytes = area.to_wire_bytes();
        let num_objs = byteorder::BigEndian::read_i32(&bytes[0..4]);
        assert_eq!(num_objs, 2);
    }
}
