//! Fetch engine: single-object fetch with cache-coherence
//! short-circuiting, paginated class scans, lockset fetch, the
//! depth-bounded reference-graph walk, class-only fetch, existence
//! checks, and OID assignment.
//!
//! `HeapApi`/`CatalogApi` expose no per-object revision counter, so the
//! cache-coherence number ("fetch returns no payload exactly when both
//! the instance and its class are current at the client") is modeled
//! here as a content hash of the record: two fetches of an unchanged
//! record hash identically, which is exactly the property a
//! client-side CHN cache needs, without requiring the heap to track an
//! explicit counter.

use std::sync::Arc;

use locator_core::{
    CatalogApi, ClassOid, HeapApi, Hfid, LockApi, LockMode, LocatorError, LocatorResult, Oid,
    Record, TranIndex, Value,
};
use locator_copyarea::{grow_and_retry, CopyArea, Operation};
use rustc_hash::FxHashMap;

use crate::config::LocatorConfig;

/// A client-side cache-coherence number: a hash of a record's content.
/// Equal content hashes to an equal `Chn`; this is sufficient to decide
/// "is the client's cached copy still current" without a real storage
/// layer maintaining an incrementing counter.
pub type Chn = u64;

/// Hash a record's content into a `Chn`.
pub fn record_chn(record: &Record) -> Chn {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    record.class_oid.hash(&mut hasher);
    for (attr, value) in &record.attributes {
        attr.hash(&mut hasher);
        hash_value(value, &mut hasher);
    }
    hasher.finish()
}

fn hash_value(value: &Value, hasher: &mut impl std::hash::Hasher) {
    use std::hash::Hash;
    match value {
        Value::Null => 0u8.hash(hasher),
        Value::Int(i) => {
            1u8.hash(hasher);
            i.hash(hasher);
        }
        Value::BigInt(i) => {
            2u8.hash(hasher);
            i.hash(hasher);
        }
        Value::Real(r) => {
            3u8.hash(hasher);
            r.to_bits().hash(hasher);
        }
        Value::Text(s) => {
            4u8.hash(hasher);
            s.hash(hasher);
        }
        Value::Bytes(b) => {
            5u8.hash(hasher);
            b.hash(hasher);
        }
        Value::Oid(o) => {
            6u8.hash(hasher);
            o.hash(hasher);
        }
    }
}

/// Opaque on-wire encoding of a record's typed attributes. The real
/// heap's physical record format is out of scope here; the
/// copy area treats payloads as opaque bytes, so this crate uses
/// `Record`'s own `serde` impl as a deterministic stand-in, shared with
/// `force`'s `decode_record` counterpart.
pub(crate) fn encode_record(record: &Record) -> Vec<u8> {
    serde_json::to_vec(record).expect("Record serialization is infallible")
}

fn downgrade_intention_lock(mode: LockMode) -> LockMode {
    match mode {
        LockMode::IntentShared => LockMode::Shared,
        LockMode::IntentExclusive | LockMode::SharedIntentExclusive => LockMode::Exclusive,
        other => other,
    }
}

/// One entry of a lockset to be fetched together (built by
/// `fetch_lockset`). `class_index` is `-1` until resolved to an index
/// into `Lockset::classes`.
#[derive(Debug, Clone)]
pub struct LocksetObject {
    pub oid: Oid,
    pub class_index: i32,
}

/// A caller-assembled set of objects (and their classes) to fetch in one
/// round trip, mirroring a query's final projection list.
#[derive(Debug, Clone, Default)]
pub struct Lockset {
    pub classes: Vec<ClassOid>,
    pub objects: Vec<LocksetObject>,
    /// If true, a class resolution failure aborts the whole lockset
    /// fetch instead of leaving that entry unresolved.
    pub quit_on_errors: bool,
}

impl Lockset {
    pub fn new(quit_on_errors: bool) -> Self {
        Self {
            classes: Vec::new(),
            objects: Vec::new(),
            quit_on_errors,
        }
    }

    pub fn add_object(&mut self, oid: Oid) {
        self.objects.push(LocksetObject {
            oid,
            class_index: -1,
        });
    }
}

/// One page of a paginated class scan (`fetch_all`).
#[derive(Debug, Clone)]
pub struct FetchAllPage {
    pub area: CopyArea,
    pub last_oid: Option<Oid>,
    pub scan_ended: bool,
}

/// Fetch-path operations, generic over the heap, lock manager, and
/// catalog collaborators.
pub struct FetchEngine<H, L, C> {
    heap: Arc<H>,
    lock: Arc<L>,
    catalog: Arc<C>,
    config: LocatorConfig,
}

impl<H, L, C> FetchEngine<H, L, C>
where
    H: HeapApi,
    L: LockApi,
    C: CatalogApi,
{
    pub fn new(heap: Arc<H>, lock: Arc<L>, catalog: Arc<C>, config: LocatorConfig) -> Self {
        Self {
            heap,
            lock,
            catalog,
            config,
        }
    }

    /// `fetch`. Returns `None` when both the instance and
    /// its class are already current at the client.
    pub fn fetch(
        &self,
        tran: TranIndex,
        oid: Oid,
        client_chn: Option<Chn>,
        class_chn: Option<Chn>,
        requested_lock: LockMode,
        class_oid: Option<ClassOid>,
        prefetch: Option<u32>,
    ) -> LocatorResult<Option<CopyArea>> {
        let resolved_class = match class_oid {
            Some(c) => c,
            None => self
                .heap
                .get_class_oid(oid)?
                .ok_or(LocatorError::ObjectNotFound(oid))?,
        };
        let root_oid = Oid::NULL;
        let effective_lock = if resolved_class != root_oid {
            let downgraded = downgrade_intention_lock(requested_lock);
            if downgraded != requested_lock {
                tracing::debug!(?requested_lock, ?downgraded, ?oid, "downgraded intention lock for instance fetch");
            }
            downgraded
        } else {
            requested_lock
        };
        self.lock.lock_object(tran, oid, resolved_class, effective_lock)?;
        let result = self.fetch_locked(oid, client_chn, resolved_class, class_chn, prefetch);
        self.lock.unlock_object(tran, oid);
        result
    }

    fn fetch_locked(
        &self,
        oid: Oid,
        client_chn: Option<Chn>,
        class_oid: ClassOid,
        class_chn: Option<Chn>,
        prefetch: Option<u32>,
    ) -> LocatorResult<Option<CopyArea>> {
        let record = self.heap.get(oid)?.ok_or(LocatorError::ObjectNotFound(oid))?;
        let instance_fresh = client_chn == Some(record_chn(&record));

        let class_record = self.heap.get(class_oid)?;
        let class_fresh = class_record
            .as_ref()
            .map(|cr| class_chn == Some(record_chn(cr)))
            .unwrap_or(false);

        if instance_fresh && class_fresh {
            return Ok(None);
        }

        let hfid = self
            .catalog
            .get_class_info(class_oid)?
            .map(|c| c.hfid)
            .unwrap_or(Hfid::NULL);

        let depth = prefetch.unwrap_or(self.config.prefetch_depth_default);
        let neighbors = if depth > 0 {
            self.neighbor_oids(&record, depth)?
        } else {
            Vec::new()
        };

        let area = grow_and_retry(self.config.page_size, |budget| {
            let mut area = CopyArea::new();
            if !instance_fresh {
                match area.try_append(oid, false, hfid, Operation::Fetch, &encode_record(&record), budget) {
                    locator_copyarea::AppendOutcome::Fit => {}
                    locator_copyarea::AppendOutcome::DoesntFit { required } => return Err(required),
                }
            }
            if !class_fresh {
                if let Some(cr) = &class_record {
                    match area.try_append(class_oid, false, Hfid::NULL, Operation::Fetch, &encode_record(cr), budget) {
                        locator_copyarea::AppendOutcome::Fit => {}
                        locator_copyarea::AppendOutcome::DoesntFit { required } => return Err(required),
                    }
                }
            }
            for (n_oid, n_hfid, n_record) in &neighbors {
                let _ = area.try_append(*n_oid, false, *n_hfid, Operation::Fetch, &encode_record(n_record), budget);
            }
            Ok(area)
        });

        let mut area = area;
        if area.num_objs() > 1 {
            area.move_to_front(class_oid);
        }
        Ok(Some(area))
    }

    /// Best-effort neighbor discovery for prefetch: every `Value::Oid`
    /// attribute of `record` names a neighbor, walked up to `depth`
    /// levels. A missing neighbor is silently skipped rather than
    /// failing the whole fetch (prefetch is an optimization, not a
    /// correctness requirement).
    fn neighbor_oids(&self, record: &Record, depth: u32) -> LocatorResult<Vec<(Oid, Hfid, Record)>> {
        let mut out = Vec::new();
        let mut frontier: Vec<Oid> = record
            .attributes
            .iter()
            .filter_map(|(_, v)| match v {
                Value::Oid(o) if !o.is_null() => Some(*o),
                _ => None,
            })
            .collect();
        let mut seen: FxHashMap<Oid, ()> = FxHashMap::default();
        for _ in 0..depth {
            let mut next_frontier = Vec::new();
            for oid in frontier {
                if seen.contains_key(&oid) {
                    continue;
                }
                seen.insert(oid, ());
                let Some(neighbor_record) = self.heap.get(oid)? else {
                    continue;
                };
                let class_oid = neighbor_record.class_oid;
                let hfid = self
                    .catalog
                    .get_class_info(class_oid)?
                    .map(|c| c.hfid)
                    .unwrap_or(Hfid::NULL);
                next_frontier.extend(neighbor_record.attributes.iter().filter_map(|(_, v)| match v {
                    Value::Oid(o) if !o.is_null() => Some(*o),
                    _ => None,
                }));
                out.push((oid, hfid, neighbor_record));
            }
            frontier = next_frontier;
        }
        Ok(out)
    }

    /// `fetch_all`: one page of a paginated class scan.
    /// `class_oid` is accepted to mirror the call's real signature
    /// (the class locks the scan, even though only `hfid` drives it).
    pub fn fetch_all(
        &self,
        _class_oid: ClassOid,
        hfid: Hfid,
        after: Option<Oid>,
    ) -> LocatorResult<FetchAllPage> {
        let mut resolved: Vec<(Oid, Record)> = Vec::new();
        let mut cursor = after;
        loop {
            let Some(oid) = self.heap.next(hfid, cursor)? else {
                let area = self.build_scan_area(&resolved, hfid);
                return Ok(FetchAllPage {
                    area,
                    last_oid: cursor,
                    scan_ended: true,
                });
            };
            cursor = Some(oid);
            let Some(record) = self.heap.get(oid)? else {
                continue;
            };
            resolved.push((oid, record));
            if resolved.len() >= 256 {
                let area = self.build_scan_area(&resolved, hfid);
                return Ok(FetchAllPage {
                    area,
                    last_oid: cursor,
                    scan_ended: false,
                });
            }
        }
    }

    fn build_scan_area(&self, resolved: &[(Oid, Record)], hfid: Hfid) -> CopyArea {
        grow_and_retry(self.config.page_size, |budget| {
            let mut area = CopyArea::new();
            for (oid, record) in resolved {
                match area.try_append(*oid, false, hfid, Operation::Fetch, &encode_record(record), budget) {
                    locator_copyarea::AppendOutcome::Fit => {}
                    locator_copyarea::AppendOutcome::DoesntFit { required } => return Err(required),
                }
            }
            Ok(area)
        })
    }

    /// `fetch_lockset`: resolve each object's class if
    /// unknown, lock everything, then build one area carrying the
    /// classes (deduplicated) before the instances.
    pub fn fetch_lockset(&self, tran: TranIndex, lockset: &mut Lockset, lock_mode: LockMode) -> LocatorResult<CopyArea> {
        for obj in &mut lockset.objects {
            if obj.class_index >= 0 {
                continue;
            }
            match self.heap.get_class_oid(obj.oid)? {
                Some(class_oid) => {
                    let idx = match lockset.classes.iter().position(|c| *c == class_oid) {
                        Some(idx) => idx,
                        None => {
                            lockset.classes.push(class_oid);
                            lockset.classes.len() - 1
                        }
                    };
                    obj.class_index = idx as i32;
                }
                None if lockset.quit_on_errors => {
                    return Err(LocatorError::ObjectNotFound(obj.oid));
                }
                None => {}
            }
        }

        let mut to_lock = Vec::new();
        for obj in &lockset.objects {
            if obj.class_index < 0 {
                continue;
            }
            let class_oid = lockset.classes[obj.class_index as usize];
            let effective = if class_oid != Oid::NULL {
                downgrade_intention_lock(lock_mode)
            } else {
                lock_mode
            };
            to_lock.push((obj.oid, class_oid, effective));
        }
        self.lock.lock_objects(tran, &to_lock)?;

        let mut class_records = Vec::new();
        for class_oid in &lockset.classes {
            if let Some(record) = self.heap.get(*class_oid)? {
                class_records.push((*class_oid, record));
            }
        }
        let mut instance_records = Vec::new();
        for obj in &lockset.objects {
            if obj.class_index < 0 {
                continue;
            }
            if let Some(record) = self.heap.get(obj.oid)? {
                let class_oid = lockset.classes[obj.class_index as usize];
                let hfid = self
                    .catalog
                    .get_class_info(class_oid)?
                    .map(|c| c.hfid)
                    .unwrap_or(Hfid::NULL);
                instance_records.push((obj.oid, hfid, record));
            }
        }

        let area = grow_and_retry(self.config.page_size, |budget| {
            let mut area = CopyArea::new();
            for (class_oid, record) in &class_records {
                match area.try_append(*class_oid, false, Hfid::NULL, Operation::Fetch, &encode_record(record), budget) {
                    locator_copyarea::AppendOutcome::Fit => {}
                    locator_copyarea::AppendOutcome::DoesntFit { required } => return Err(required),
                }
            }
            for (oid, hfid, record) in &instance_records {
                match area.try_append(*oid, false, *hfid, Operation::Fetch, &encode_record(record), budget) {
                    locator_copyarea::AppendOutcome::Fit => {}
                    locator_copyarea::AppendOutcome::DoesntFit { required } => return Err(required),
                }
            }
            Ok(area)
        });

        for obj in &lockset.objects {
            self.lock.unlock_object(tran, obj.oid);
        }

        Ok(area)
    }

    /// `fetch_all_references`: a depth-bounded DFS over
    /// `Value::Oid` attributes starting at `root_oid`, deduplicating by
    /// OID (a node reached by a shorter path replaces a longer one) using
    /// an arena-backed index so revisits don't re-walk already-settled
    /// subtrees. `prune_level <= 0` means unlimited depth.
    pub fn fetch_all_references(
        &self,
        tran: TranIndex,
        root_oid: Oid,
        prune_level: i32,
        inst_lock: LockMode,
        class_lock: LockMode,
    ) -> LocatorResult<CopyArea> {
        let unlimited = prune_level <= 0;
        let mut arena: locator_core::Arena<(Oid, i32)> = locator_core::Arena::new();
        let mut index_of: FxHashMap<Oid, usize> = FxHashMap::default();
        let root_idx = arena.push((root_oid, 0));
        index_of.insert(root_oid, root_idx);
        let mut stack = vec![root_idx];
        let mut visit_order: Vec<Oid> = Vec::new();
        let mut visited: FxHashMap<Oid, ()> = FxHashMap::default();

        while let Some(idx) = stack.pop() {
            let (oid, depth) = *arena.get(idx).expect("arena index always valid");
            if !unlimited && depth > prune_level {
                continue;
            }
            let Some(class_oid) = self.heap.get_class_oid(oid)? else {
                continue;
            };
            self.lock.lock_object(tran, oid, class_oid, inst_lock)?;
            self.lock.lock_class(tran, class_oid, class_lock)?;
            let Some(record) = self.heap.get(oid)? else {
                continue;
            };
            if visited.insert(oid, ()).is_none() {
                visit_order.push(oid);
            }

            if unlimited || depth < prune_level {
                for (_, value) in &record.attributes {
                    let Value::Oid(refd) = value else { continue };
                    if refd.is_null() {
                        continue;
                    }
                    let new_depth = depth + 1;
                    match index_of.get(refd) {
                        Some(&existing_idx) => {
                            let (_, existing_depth) = *arena.get(existing_idx).unwrap();
                            if new_depth < existing_depth {
                                *arena.get_mut(existing_idx).unwrap() = (*refd, new_depth);
                                stack.push(existing_idx);
                            }
                        }
                        None => {
                            let new_idx = arena.push((*refd, new_depth));
                            index_of.insert(*refd, new_idx);
                            stack.push(new_idx);
                        }
                    }
                }
            }
        }

        let mut resolved = Vec::with_capacity(visit_order.len());
        for oid in &visit_order {
            let class_oid = self.heap.get_class_oid(*oid)?.unwrap_or(Oid::NULL);
            let hfid = self
                .catalog
                .get_class_info(class_oid)?
                .map(|c| c.hfid)
                .unwrap_or(Hfid::NULL);
            if let Some(record) = self.heap.get(*oid)? {
                resolved.push((*oid, hfid, record));
            }
        }

        let mut area = grow_and_retry(self.config.page_size, |budget| {
            let mut area = CopyArea::new();
            for (oid, hfid, record) in &resolved {
                match area.try_append(*oid, false, *hfid, Operation::Fetch, &encode_record(record), budget) {
                    locator_copyarea::AppendOutcome::Fit => {}
                    locator_copyarea::AppendOutcome::DoesntFit { required } => return Err(required),
                }
            }
            Ok(area)
        });
        area.retain_non_null();

        for oid in &visit_order {
            self.lock.unlock_object(tran, *oid);
        }
        Ok(area)
    }

    /// `fetch_class_only`: fetch just a class's own
    /// instance data, skipping any instance-level work.
    pub fn fetch_class_only(
        &self,
        tran: TranIndex,
        class_oid: ClassOid,
        class_chn: Option<Chn>,
        lock_mode: LockMode,
    ) -> LocatorResult<Option<CopyArea>> {
        self.lock.lock_class(tran, class_oid, lock_mode)?;
        let result = (|| -> LocatorResult<Option<CopyArea>> {
            let Some(record) = self.heap.get(class_oid)? else {
                return Err(LocatorError::ObjectNotFound(class_oid));
            };
            if class_chn == Some(record_chn(&record)) {
                return Ok(None);
            }
            let area = grow_and_retry(self.config.page_size, |budget| {
                let mut area = CopyArea::new();
                match area.try_append(class_oid, false, Hfid::NULL, Operation::Fetch, &encode_record(&record), budget) {
                    locator_copyarea::AppendOutcome::Fit => Ok(area),
                    locator_copyarea::AppendOutcome::DoesntFit { required } => Err(required),
                }
            });
            Ok(Some(area))
        })();
        self.lock.unlock_class(tran, class_oid);
        result
    }

    /// `does_exist`: lock then probe the heap.
    pub fn does_exist(&self, tran: TranIndex, oid: Oid, class_oid: ClassOid, lock_mode: LockMode) -> LocatorResult<bool> {
        self.lock.lock_object(tran, oid, class_oid, lock_mode)?;
        let exists = self.heap.does_exist(oid);
        self.lock.unlock_object(tran, oid);
        exists
    }

    /// `assign_oid`: the heap assigns a fresh OID on
    /// insert; this just names the call site the force engine uses.
    pub fn assign_oid(&self, hfid: Hfid, class_oid: ClassOid, record: &Record) -> LocatorResult<Oid> {
        self.heap.insert(hfid, class_oid, record)
    }

    /// `assign_oid_batch`: OID assignment for a whole
    /// multi-row insert batch, in order.
    pub fn assign_oid_batch(&self, rows: &[(Hfid, ClassOid, Record)]) -> LocatorResult<Vec<Oid>> {
        rows.iter()
            .map(|(hfid, class_oid, record)| self.heap.insert(*hfid, *class_oid, record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locator_core::Vfid;
    use locator_testkit::{InMemoryCatalog, InMemoryHeap, InMemoryLockManager};

    fn hfid(n: i32) -> Hfid {
        Hfid {
            vfid: Vfid { volid: 0, fileid: n },
            hpgid: 0,
        }
    }

    fn engine() -> (
        FetchEngine<InMemoryHeap, InMemoryLockManager, InMemoryCatalog>,
        Arc<InMemoryHeap>,
    ) {
        let heap = Arc::new(InMemoryHeap::new());
        let lock = Arc::new(InMemoryLockManager::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let engine = FetchEngine::new(heap.clone(), lock, catalog, LocatorConfig::default());
        (engine, heap)
    }

    #[test]
    fn record_chn_is_stable_for_equal_content() {
        let r1 = Record::new(Oid::new(0, 1, 0)).with_attr(1, Value::Int(5));
        let r2 = Record::new(Oid::new(0, 1, 0)).with_attr(1, Value::Int(5));
        assert_eq!(record_chn(&r1), record_chn(&r2));
    }

    #[test]
    fn record_chn_differs_when_content_differs() {
        let r1 = Record::new(Oid::new(0, 1, 0)).with_attr(1, Value::Int(5));
        let r2 = Record::new(Oid::new(0, 1, 0)).with_attr(1, Value::Int(6));
        assert_ne!(record_chn(&r1), record_chn(&r2));
    }

    #[test]
    fn fetch_returns_payload_when_client_has_no_cached_chn() {
        let (engine, heap) = engine();
        let class_oid = Oid::new(0, 9000, 0);
        heap.seed(hfid(1), class_oid, Record::new(Oid::NULL));
        let oid = heap.insert(hfid(1), class_oid, &Record::new(class_oid).with_attr(1, Value::Int(1))).unwrap();

        let area = engine
            .fetch(1, oid, None, None, LockMode::Shared, Some(class_oid), Some(0))
            .unwrap();
        assert!(area.is_some());
    }

    #[test]
    fn fetch_returns_none_when_instance_and_class_are_current() {
        let (engine, heap) = engine();
        let class_oid = Oid::new(0, 9000, 0);
        let class_record = Record::new(Oid::NULL);
        heap.seed(hfid(1), class_oid, class_record.clone());
        let record = Record::new(class_oid).with_attr(1, Value::Int(1));
        let oid = heap.insert(hfid(1), class_oid, &record).unwrap();

        let area = engine
            .fetch(
                1,
                oid,
                Some(record_chn(&record)),
                Some(record_chn(&class_record)),
                LockMode::Shared,
                Some(class_oid),
                Some(0),
            )
            .unwrap();
        assert!(area.is_none());
    }

    #[test]
    fn fetch_all_pages_through_a_class_scan() {
        let (engine, heap) = engine();
        let class_oid = Oid::new(0, 9000, 0);
        for i in 0..3 {
            heap.insert(hfid(1), class_oid, &Record::new(class_oid).with_attr(1, Value::Int(i))).unwrap();
        }
        let page = engine.fetch_all(class_oid, hfid(1), None).unwrap();
        assert!(page.scan_ended);
        assert_eq!(page.area.num_objs(), 3);
    }

    #[test]
    fn does_exist_reflects_heap_state() {
        let (engine, heap) = engine();
        let class_oid = Oid::new(0, 9000, 0);
        let oid = heap.insert(hfid(1), class_oid, &Record::new(class_oid)).unwrap();
        assert!(engine.does_exist(1, oid, class_oid, LockMode::Shared).unwrap());
        heap.delete(oid).unwrap();
        assert!(!engine.does_exist(1, oid, class_oid, LockMode::Shared).unwrap());
    }

    #[test]
    fn fetch_all_references_walks_oid_attributes_and_dedupes() {
        let (engine, heap) = engine();
        let class_oid = Oid::new(0, 9000, 0);
        let leaf = heap.insert(hfid(1), class_oid, &Record::new(class_oid)).unwrap();
        let mid_a = heap
            .insert(hfid(1), class_oid, &Record::new(class_oid).with_attr(1, Value::Oid(leaf)))
            .unwrap();
        let root = heap
            .insert(hfid(1), class_oid, &Record::new(class_oid).with_attr(1, Value::Oid(mid_a)))
            .unwrap();

        let area = engine
            .fetch_all_references(1, root, 0, LockMode::Shared, LockMode::Shared)
            .unwrap();
        assert_eq!(area.num_objs(), 3);
    }

    #[test]
    fn fetch_lockset_resolves_classes_and_orders_them_first() {
        let (engine, heap) = engine();
        let class_oid = Oid::new(0, 9000, 0);
        heap.seed(hfid(1), class_oid, Record::new(Oid::NULL));
        let a = heap.insert(hfid(1), class_oid, &Record::new(class_oid)).unwrap();
        let b = heap.insert(hfid(1), class_oid, &Record::new(class_oid)).unwrap();

        let mut lockset = Lockset::new(true);
        lockset.add_object(a);
        lockset.add_object(b);
        let area = engine.fetch_lockset(1, &mut lockset, LockMode::Shared).unwrap();
        assert_eq!(area.num_objs(), 3); // one class slot + two instances
        assert_eq!(area.slots()[0].oid, class_oid);
    }
}
