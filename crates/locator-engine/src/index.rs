//! Index maintainer and foreign-key enforcer: key
//! derivation, `add_or_remove_index`/`update_index`, FK presence
//! checking, PK delete/update enforcement, object-cache repair, and the
//! uniqueness-check verification scan.
//!
//! The referencing side of a foreign key isn't discoverable from
//! `CatalogApi` alone (it exposes one class's own descriptor, not a
//! database-wide "who references this PK" query), so the maintainer
//! keeps its own small FK graph — `(pk_btid) -> [(referencing class,
//! fk index descriptor)]` — populated by `register_referencing_fk` the
//! way a real catalog load would populate it once at class-creation
//! time.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use locator_core::{
    key_is_null, BtreeInconsistencyKind, BTreeRuntime, Btid, CatalogApi, ClassInfo, ClassOid,
    HeapApi, Hfid, IndexDescriptor, IndexKind, LocatorError, LocatorResult, Oid, ReferentialAction,
    Record, Value,
};
use locator_concurrency::ScanCacheStats;
use parking_lot::RwLock;

/// Delegate the index maintainer calls back into for FK-cascade row
/// operations for CASCADE/SET NULL. Implemented by the
/// force engine so a cascading delete/update re-enters the same
/// per-row machinery a top-level `FLUSH_DELETE`/`FLUSH_UPDATE` would.
pub trait CascadeDelegate {
    fn cascade_delete(&self, oid: Oid) -> LocatorResult<()>;
    fn cascade_update(&self, oid: Oid, new_record: &Record) -> LocatorResult<()>;
}

/// Outcome of a full uniqueness-check scan across one or more indexes,
/// produced by `verify_all_indexes`.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub mismatches: Vec<LocatorError>,
    pub repaired: u32,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Key derivation, B+tree maintenance, and FK enforcement for one
/// locator instance, generic over the B+tree runtime, heap, and catalog
/// collaborators.
pub struct IndexMaintainer<B, H, C> {
    btree: Arc<B>,
    heap: Arc<H>,
    catalog: Arc<C>,
    fk_graph: RwLock<FxHashMap<Btid, Vec<(ClassOid, IndexDescriptor)>>>,
}

impl<B, H, C> IndexMaintainer<B, H, C>
where
    B: BTreeRuntime,
    H: HeapApi,
    C: CatalogApi,
{
    pub fn new(btree: Arc<B>, heap: Arc<H>, catalog: Arc<C>) -> Self {
        Self {
            btree,
            heap,
            catalog,
            fk_graph: RwLock::new(FxHashMap::default()),
        }
    }

    /// Register that `fk_index` (on `referencing_class`) carries a
    /// foreign key into the primary key backed by `pk_btid`, so PK
    /// delete/update enforcement and object-cache repair know to
    /// consider it.
    pub fn register_referencing_fk(
        &self,
        pk_btid: Btid,
        referencing_class: ClassOid,
        fk_index: IndexDescriptor,
    ) {
        self.fk_graph
            .write()
            .entry(pk_btid)
            .or_default()
            .push((referencing_class, fk_index));
    }

    /// Derive a B+tree key from a record for one index descriptor.
    pub fn derive_key(record: &Record, index: &IndexDescriptor) -> Vec<Value> {
        record.derive_key(&index.attr_ids)
    }

    /// `add_or_remove_index`. Walks every index on the
    /// class, skipping any BTID already touched earlier in this call
    /// (several logical constraints can share one physical tree).
    #[allow(clippy::too_many_arguments)]
    pub fn add_or_remove_index(
        &self,
        class_info: &ClassInfo,
        record: &Record,
        inst_oid: Oid,
        class_oid: ClassOid,
        is_insert: bool,
        mut scan_stats: Option<&mut ScanCacheStats>,
        delegate: &dyn CascadeDelegate,
    ) -> LocatorResult<()> {
        let mut touched = Vec::with_capacity(class_info.indexes.len());
        for index in &class_info.indexes {
            if touched.contains(&index.btid) {
                continue;
            }
            touched.push(index.btid);

            let key = Self::derive_key(record, index);
            let is_unique = matches!(index.kind, IndexKind::Unique | IndexKind::PrimaryKey);

            if is_insert {
                let is_new_key = self.btree.insert(index.btid, &key, inst_oid)?;
                if is_unique {
                    if let Some(stats) = scan_stats.as_deref_mut() {
                        stats.record_key(index.btid, key_is_null(&key), is_new_key);
                    }
                }
            } else {
                self.btree.delete(index.btid, &key, inst_oid)?;
                if is_unique {
                    if let Some(stats) = scan_stats.as_deref_mut() {
                        stats.remove_key(index.btid, key_is_null(&key));
                    }
                }
            }

            if matches!(index.kind, IndexKind::PrimaryKey) {
                if is_insert {
                    self.object_cache_repair(index.btid, &key, inst_oid, delegate)?;
                } else {
                    self.pk_delete_enforcement(index.btid, &key, delegate)?;
                }
            }
        }
        Ok(())
    }

    /// `update_index`. Only touches indexes whose
    /// attribute set intersects `affected_attr_ids` when that filter is
    /// supplied; skips any index whose derived key is unchanged under
    /// multi-column null semantics.
    pub fn update_index(
        &self,
        oid: Oid,
        old_record: &Record,
        new_record: &Record,
        class_info: &ClassInfo,
        affected_attr_ids: Option<&[locator_core::AttrId]>,
    ) -> LocatorResult<()> {
        for index in &class_info.indexes {
            if let Some(affected) = affected_attr_ids {
                if !index.attr_ids.iter().any(|a| affected.contains(a)) {
                    continue;
                }
            }
            let old_key = Self::derive_key(old_record, index);
            let new_key = Self::derive_key(new_record, index);
            if keys_equal(&old_key, &new_key) {
                continue;
            }
            self.btree.delete(index.btid, &old_key, oid)?;
            self.btree.insert(index.btid, &new_key, oid)?;
        }
        Ok(())
    }

    /// FK presence check on insert/update. Rewrites
    /// `record`'s cache attribute for any FK index whose definition
    /// requests object caching.
    pub fn fk_presence_check(
        &self,
        record: &mut Record,
        class_info: &ClassInfo,
        is_replication_applier: bool,
    ) -> LocatorResult<()> {
        for index in &class_info.indexes {
            let Some(fk) = &index.fk else { continue };
            let key = Self::derive_key(record, index);
            if key_is_null(&key) {
                continue;
            }
            match self.btree.find_unique(fk.ref_pk_btid, &key)? {
                Some(pk_oid) => {
                    if let Some(attr) = fk.cache_attr_id {
                        record.set(attr, Value::Oid(pk_oid));
                    }
                }
                None if is_replication_applier => {}
                None => {
                    tracing::warn!(fk = %fk.name, "foreign key value not found in referenced index");
                    return Err(LocatorError::FkValueNotFound {
                        fk_name: fk.name.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    /// PK-delete enforcement: for every FK referencing
    /// `pk_btid`, act according to its `delete_action`.
    pub fn pk_delete_enforcement(
        &self,
        pk_btid: Btid,
        deleted_key: &[Value],
        delegate: &dyn CascadeDelegate,
    ) -> LocatorResult<()> {
        if key_is_null(deleted_key) {
            return Ok(());
        }
        let referencing = self.fk_graph.read().get(&pk_btid).cloned().unwrap_or_default();
        for (_, fk_index) in referencing {
            let fk = fk_index.fk.as_ref().expect("referencing index must carry fk metadata");
            match fk.delete_action {
                ReferentialAction::Restrict | ReferentialAction::NoAction => {
                    let hits = self.btree.find_all(fk_index.btid, deleted_key)?;
                    if !hits.is_empty() {
                        tracing::warn!(fk = %fk.name, referencing = hits.len(), "pk delete restricted by live references");
                        return Err(LocatorError::FkRestrict {
                            fk_name: fk.name.clone(),
                            btid: fk_index.btid,
                        });
                    }
                }
                ReferentialAction::Cascade => {
                    let hits = self.btree.find_all(fk_index.btid, deleted_key)?;
                    if !hits.is_empty() {
                        tracing::debug!(fk = %fk.name, rows = hits.len(), "cascading pk delete to referencing rows");
                    }
                    for oid in hits {
                        delegate.cascade_delete(oid)?;
                    }
                }
                ReferentialAction::SetNull => {
                    for oid in self.btree.find_all(fk_index.btid, deleted_key)? {
                        let mut rec = self
                            .heap
                            .get(oid)?
                            .ok_or(LocatorError::ObjectNotFound(oid))?;
                        for attr in &fk_index.attr_ids {
                            rec.set(*attr, Value::Null);
                        }
                        delegate.cascade_update(oid, &rec)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// PK-update enforcement: for every FK referencing `pk_btid` whose
    /// key actually changed, `CASCADE` is unreachable and unconditionally
    /// refused (see DESIGN.md for why), matching the un-clarified
    /// original behavior rather than inventing cascading-update
    /// semantics.
    pub fn pk_update_enforcement(
        &self,
        pk_btid: Btid,
        old_key: &[Value],
        new_key: &[Value],
        delegate: &dyn CascadeDelegate,
    ) -> LocatorResult<()> {
        if keys_equal(old_key, new_key) {
            return Ok(());
        }
        if key_is_null(old_key) {
            return Ok(());
        }
        let referencing = self.fk_graph.read().get(&pk_btid).cloned().unwrap_or_default();
        for (_, fk_index) in referencing {
            let fk = fk_index.fk.as_ref().expect("referencing index must carry fk metadata");
            match fk.update_action {
                ReferentialAction::Restrict | ReferentialAction::NoAction => {
                    let hits = self.btree.find_all(fk_index.btid, old_key)?;
                    if !hits.is_empty() {
                        return Err(LocatorError::FkRestrict {
                            fk_name: fk.name.clone(),
                            btid: fk_index.btid,
                        });
                    }
                }
                ReferentialAction::Cascade => {
                    tracing::warn!(fk = %fk.name, "pk update cascade is unreachable, refusing");
                    return Err(LocatorError::FkRestrict {
                        fk_name: fk.name.clone(),
                        btid: fk_index.btid,
                    });
                }
                ReferentialAction::SetNull => {
                    for oid in self.btree.find_all(fk_index.btid, old_key)? {
                        let mut rec = self
                            .heap
                            .get(oid)?
                            .ok_or(LocatorError::ObjectNotFound(oid))?;
                        for attr in &fk_index.attr_ids {
                            rec.set(*attr, Value::Null);
                        }
                        delegate.cascade_update(oid, &rec)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Object-cache repair: rewrite every referencing
    /// row's cache attribute to point at `new_pk_oid`.
    pub fn object_cache_repair(
        &self,
        pk_btid: Btid,
        new_pk_key: &[Value],
        new_pk_oid: Oid,
        delegate: &dyn CascadeDelegate,
    ) -> LocatorResult<()> {
        if key_is_null(new_pk_key) {
            return Ok(());
        }
        let referencing = self.fk_graph.read().get(&pk_btid).cloned().unwrap_or_default();
        for (_, fk_index) in referencing {
            let Some(fk) = &fk_index.fk else { continue };
            let Some(cache_attr) = fk.cache_attr_id else { continue };
            for oid in self.btree.find_all(fk_index.btid, new_pk_key)? {
                let mut rec = self
                    .heap
                    .get(oid)?
                    .ok_or(LocatorError::ObjectNotFound(oid))?;
                rec.set(cache_attr, Value::Oid(new_pk_oid));
                delegate.cascade_update(oid, &rec)?;
            }
        }
        Ok(())
    }

    /// Self-repair: insert a missing `(key, oid)` pair found by a
    /// heap->tree verification pass.
    pub fn repair_by_insert(&self, btid: Btid, key: &[Value], oid: Oid) -> LocatorResult<()> {
        self.btree.insert(btid, key, oid)?;
        Ok(())
    }

    /// Self-repair: delete a stale `(key, oid)` pair found by a
    /// tree->heap verification pass.
    pub fn repair_by_delete(&self, btid: Btid, key: &[Value], oid: Oid) -> LocatorResult<()> {
        self.btree.delete(btid, key, oid)
    }

    /// `rebuild_fk_object_cache`: rewrite
    /// every row of `class_info`'s class whose FK indexes request object
    /// caching, driven by a full class scan rather than a single row.
    pub fn rebuild_fk_object_cache(
        &self,
        class_info: &ClassInfo,
        hfid: Hfid,
        delegate: &dyn CascadeDelegate,
    ) -> LocatorResult<u32> {
        let mut rewritten = 0;
        let mut cursor = None;
        loop {
            let Some(oid) = self.heap.next(hfid, cursor)? else {
                break;
            };
            cursor = Some(oid);
            let mut record = match self.heap.get(oid)? {
                Some(r) => r,
                None => continue,
            };
            let mut changed = false;
            for index in &class_info.indexes {
                let Some(fk) = &index.fk else { continue };
                let Some(cache_attr) = fk.cache_attr_id else { continue };
                let key = Self::derive_key(&record, index);
                if key_is_null(&key) {
                    continue;
                }
                if let Some(pk_oid) = self.btree.find_unique(fk.ref_pk_btid, &key)? {
                    record.set(cache_attr, Value::Oid(pk_oid));
                    changed = true;
                }
            }
            if changed {
                delegate.cascade_update(oid, &record)?;
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }

    /// `remove_class_from_index`: drop every
    /// entry this class contributed to `index`, used when altering a
    /// class hierarchy so the class no longer shares the index.
    pub fn remove_class_from_index(
        &self,
        hfid: Hfid,
        index: &IndexDescriptor,
    ) -> LocatorResult<u32> {
        let mut removed = 0;
        let mut cursor = None;
        loop {
            let Some(oid) = self.heap.next(hfid, cursor)? else {
                break;
            };
            cursor = Some(oid);
            let Some(record) = self.heap.get(oid)? else {
                continue;
            };
            let key = Self::derive_key(&record, index);
            self.btree.delete(index.btid, &key, oid)?;
            removed += 1;
        }
        Ok(removed)
    }

    /// `verify_all_indexes`: the uniqueness-check scan over every index
    /// a class carries. Heap->tree: every live record's key must probe
    /// a hit in every index covering its class. Tree->heap is
    /// approximated by a count cross-check (`heap_count ==
    /// tree_oid_count + tree_null_count`, `tree_oid_count ==
    /// tree_null_count + tree_key_count`) since the B+tree contract here
    /// has no full-scan API to walk leaf entries directly.
    pub fn verify_all_indexes(
        &self,
        class_info: &ClassInfo,
        hfid: Hfid,
        repair: bool,
    ) -> LocatorResult<VerificationReport> {
        let mut report = VerificationReport::default();
        let mut cursor = None;
        loop {
            let Some(oid) = self.heap.next(hfid, cursor)? else {
                break;
            };
            cursor = Some(oid);
            let Some(record) = self.heap.get(oid)? else {
                continue;
            };
            for index in &class_info.indexes {
                let key = Self::derive_key(&record, index);
                let hit = if matches!(index.kind, IndexKind::Unique | IndexKind::PrimaryKey) {
                    self.btree.find_unique(index.btid, &key)?.is_some()
                } else {
                    self.btree.find_all(index.btid, &key)?.contains(&oid)
                };
                if !hit {
                    if repair {
                        self.repair_by_insert(index.btid, &key, oid)?;
                        report.repaired += 1;
                    } else {
                        report.mismatches.push(LocatorError::InconsistentBtreeEntry {
                            btid: index.btid,
                            kind: BtreeInconsistencyKind::HeapEntryMissingFromTree,
                        });
                    }
                }
            }
        }

        for index in &class_info.indexes {
            if !matches!(index.kind, IndexKind::Unique | IndexKind::PrimaryKey) {
                continue;
            }
            let oid_count = self.btree.oid_count(index.btid)?;
            let null_count = self.btree.null_count(index.btid)?;
            let key_count = self.btree.key_count(index.btid)?;
            if oid_count != null_count + key_count {
                tracing::warn!(?index.btid, oid_count, null_count, key_count, "unique index count mismatch");
                report.mismatches.push(LocatorError::InconsistentBtreeEntry {
                    btid: index.btid,
                    kind: BtreeInconsistencyKind::CountMismatch,
                });
            }
        }

        Ok(report)
    }
}

fn keys_equal(a: &[Value], b: &[Value]) -> bool {
    if key_is_null(a) && key_is_null(b) {
        return true;
    }
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use locator_core::{ForeignKeyDef, Vfid};
    use locator_testkit::{InMemoryBTree, InMemoryCatalog, InMemoryHeap};

    struct TestDelegate {
        heap: Arc<InMemoryHeap>,
    }

    impl CascadeDelegate for TestDelegate {
        fn cascade_delete(&self, oid: Oid) -> LocatorResult<()> {
            self.heap.delete(oid)
        }
        fn cascade_update(&self, oid: Oid, new_record: &Record) -> LocatorResult<()> {
            self.heap.update(oid, new_record)
        }
    }

    fn hfid(n: i32) -> Hfid {
        Hfid {
            vfid: Vfid { volid: 0, fileid: n },
            hpgid: 0,
        }
    }

    fn btid(n: i32) -> Btid {
        Btid {
            vfid: Vfid { volid: 0, fileid: n },
            root_pageid: 1,
        }
    }

    fn maintainer() -> (
        IndexMaintainer<InMemoryBTree, InMemoryHeap, InMemoryCatalog>,
        Arc<InMemoryHeap>,
        Arc<InMemoryBTree>,
    ) {
        let btree = Arc::new(InMemoryBTree::new());
        let heap = Arc::new(InMemoryHeap::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let maint = IndexMaintainer::new(btree.clone(), heap.clone(), catalog);
        (maint, heap, btree)
    }

    #[test]
    fn add_or_remove_index_inserts_then_removes_entry() {
        let (maint, heap, btree) = maintainer();
        let class_oid = Oid::new(0, 1, 0);
        let index = IndexDescriptor {
            btid: btid(1),
            attr_ids: vec![1],
            kind: IndexKind::NonUnique,
            fk: None,
        };
        let info = ClassInfo {
            class_oid,
            hfid: hfid(1),
            indexes: vec![index],
            tot_objects: 0,
        };
        let record = Record::new(class_oid).with_attr(1, Value::Int(5));
        let oid = Oid::new(0, 2, 0);
        let delegate = TestDelegate { heap };

        maint
            .add_or_remove_index(&info, &record, oid, class_oid, true, None, &delegate)
            .unwrap();
        assert_eq!(btree.find_all(btid(1), &[Value::Int(5)]).unwrap(), vec![oid]);

        maint
            .add_or_remove_index(&info, &record, oid, class_oid, false, None, &delegate)
            .unwrap();
        assert!(btree.find_all(btid(1), &[Value::Int(5)]).unwrap().is_empty());
    }

    #[test]
    fn fk_presence_check_rewrites_cache_attr_on_hit_and_rejects_miss() {
        let (maint, heap, btree) = maintainer();
        let pk_oid = Oid::new(0, 10, 0);
        btree.insert(btid(1), &[Value::Int(7)], pk_oid).unwrap();

        let fk_index = IndexDescriptor {
            btid: btid(2),
            attr_ids: vec![1],
            kind: IndexKind::ForeignKey,
            fk: Some(ForeignKeyDef {
                name: "fk_child_parent".into(),
                ref_class_oid: Oid::new(0, 99, 0),
                ref_pk_btid: btid(1),
                delete_action: ReferentialAction::Restrict,
                update_action: ReferentialAction::Restrict,
                cache_attr_id: Some(2),
            }),
        };
        let info = ClassInfo {
            class_oid: Oid::new(0, 1, 0),
            hfid: hfid(1),
            indexes: vec![fk_index],
            tot_objects: 0,
        };

        let mut hit = Record::new(info.class_oid).with_attr(1, Value::Int(7));
        maint.fk_presence_check(&mut hit, &info, false).unwrap();
        assert_eq!(hit.get(2), Some(&Value::Oid(pk_oid)));

        let mut miss = Record::new(info.class_oid).with_attr(1, Value::Int(404));
        assert!(matches!(
            maint.fk_presence_check(&mut miss, &info, false),
            Err(LocatorError::FkValueNotFound { .. })
        ));

        let _ = heap; // heap unused by this FK-only check
    }

    #[test]
    fn pk_delete_enforcement_restrict_refuses_live_references() {
        let (maint, _heap, btree) = maintainer();
        let pk_btid = btid(1);
        let fk_index = IndexDescriptor {
            btid: btid(2),
            attr_ids: vec![1],
            kind: IndexKind::ForeignKey,
            fk: Some(ForeignKeyDef {
                name: "fk_orders_customer".into(),
                ref_class_oid: Oid::new(0, 99, 0),
                ref_pk_btid: pk_btid,
                delete_action: ReferentialAction::Restrict,
                update_action: ReferentialAction::Restrict,
                cache_attr_id: None,
            }),
        };
        maint.register_referencing_fk(pk_btid, Oid::new(0, 2, 0), fk_index.clone());
        btree.insert(fk_index.btid, &[Value::Int(7)], Oid::new(0, 3, 0)).unwrap();

        let delegate = TestDelegate { heap: Arc::new(InMemoryHeap::new()) };
        let err = maint
            .pk_delete_enforcement(pk_btid, &[Value::Int(7)], &delegate)
            .unwrap_err();
        assert!(matches!(err, LocatorError::FkRestrict { .. }));
    }

    #[test]
    fn pk_delete_enforcement_cascade_deletes_referencing_rows() {
        let (maint, heap, btree) = maintainer();
        let pk_btid = btid(1);
        let fk_index = IndexDescriptor {
            btid: btid(2),
            attr_ids: vec![1],
            kind: IndexKind::ForeignKey,
            fk: Some(ForeignKeyDef {
                name: "fk_orders_customer".into(),
                ref_class_oid: Oid::new(0, 99, 0),
                ref_pk_btid: pk_btid,
                delete_action: ReferentialAction::Cascade,
                update_action: ReferentialAction::Restrict,
                cache_attr_id: None,
            }),
        };
        maint.register_referencing_fk(pk_btid, Oid::new(0, 2, 0), fk_index.clone());

        let child_class = Oid::new(0, 2, 0);
        let child = heap
            .insert(hfid(2), child_class, &Record::new(child_class).with_attr(1, Value::Int(7)))
            .unwrap();
        btree.insert(fk_index.btid, &[Value::Int(7)], child).unwrap();

        let delegate = TestDelegate { heap: heap.clone() };
        maint
            .pk_delete_enforcement(pk_btid, &[Value::Int(7)], &delegate)
            .unwrap();
        assert!(!heap.does_exist(child).unwrap());
    }

    #[test]
    fn pk_update_enforcement_cascade_is_unconditionally_refused() {
        let (maint, _heap, _btree) = maintainer();
        let pk_btid = btid(1);
        let fk_index = IndexDescriptor {
            btid: btid(2),
            attr_ids: vec![1],
            kind: IndexKind::ForeignKey,
            fk: Some(ForeignKeyDef {
                name: "fk_orders_customer".into(),
                ref_class_oid: Oid::new(0, 99, 0),
                ref_pk_btid: pk_btid,
                delete_action: ReferentialAction::Restrict,
                update_action: ReferentialAction::Cascade,
                cache_attr_id: None,
            }),
        };
        maint.register_referencing_fk(pk_btid, Oid::new(0, 2, 0), fk_index);
        let delegate = TestDelegate { heap: Arc::new(InMemoryHeap::new()) };
        let err = maint
            .pk_update_enforcement(pk_btid, &[Value::Int(7)], &[Value::Int(8)], &delegate)
            .unwrap_err();
        assert!(matches!(err, LocatorError::FkRestrict { .. }));
    }

    #[test]
    fn verify_all_indexes_finds_then_repairs_missing_entry() {
        let (maint, heap, _btree) = maintainer();
        let class_oid = Oid::new(0, 1, 0);
        let index = IndexDescriptor {
            btid: btid(1),
            attr_ids: vec![1],
            kind: IndexKind::NonUnique,
            fk: None,
        };
        let info = ClassInfo {
            class_oid,
            hfid: hfid(1),
            indexes: vec![index.clone()],
            tot_objects: 0,
        };
        heap.insert(hfid(1), class_oid, &Record::new(class_oid).with_attr(1, Value::Int(9)))
            .unwrap();

        let report = maint.verify_all_indexes(&info, hfid(1), false).unwrap();
        assert!(!report.is_clean());

        let repaired = maint.verify_all_indexes(&info, hfid(1), true).unwrap();
        assert_eq!(repaired.repaired, 1);

        let clean = maint.verify_all_indexes(&info, hfid(1), false).unwrap();
        assert!(clean.is_clean());
    }
}

