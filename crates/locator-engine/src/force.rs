//! Force engine: per-slot `FLUSH_INSERT`/`FLUSH_UPDATE`/
//! `FLUSH_DELETE` dispatch over one copy area, multi-row unique-stat
//! aggregation via `ForceScanCache`, and the class-hierarchy helpers
//! `resolve_subclass_hierarchy`/`remove_class_from_index`.
//!
//! A class is itself an instance of a meta-class, addressed by the
//! well-known [`ROOT_CLASS_OID`] constant — the root OID identifies
//! the meta-class whose instances are user classes; its name lives at
//! [`CLASS_NAME_ATTR`] so `force` can tell a class-defining slot from
//! an ordinary instance slot and route it to the classname registry
//! instead of the index maintainer.

use std::sync::Arc;

use locator_concurrency::TransactionContext;
use locator_core::{
    AttrId, CatalogApi, ClassInfo, ClassOid, DurableHash, HeapApi, Hfid, IndexKind, LockApi,
    LocatorError, LocatorResult, Oid, Record, TranIndex, Value,
};
use locator_classname::ClassnameRegistry;
use locator_copyarea::{CopyArea, Operation};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::config::LocatorConfig;
use crate::index::{CascadeDelegate, IndexMaintainer};

/// The meta-class all user-defined classes are instances of.
pub const ROOT_CLASS_OID: Oid = Oid::NULL;

/// The attribute a class-defining record carries its own name in.
pub const CLASS_NAME_ATTR: AttrId = 0;

/// Per-batch scan-cache guard.
/// Accumulates unique-index statistics locally for the duration of one
/// `force` call, then merges them into the transaction-wide table on
/// drop — mirroring `locator_start_force_scan_cache`/`_end` always
/// running in matched pairs, even on an early return.
pub struct ForceScanCache<'a> {
    ctx: &'a mut TransactionContext,
    stats: locator_concurrency::ScanCacheStats,
}

impl<'a> ForceScanCache<'a> {
    pub fn open(ctx: &'a mut TransactionContext) -> Self {
        Self {
            ctx,
            stats: locator_concurrency::ScanCacheStats::new(),
        }
    }

    pub fn stats_mut(&mut self) -> &mut locator_concurrency::ScanCacheStats {
        &mut self.stats
    }
}

impl Drop for ForceScanCache<'_> {
    fn drop(&mut self) {
        self.ctx.merge_scan_cache(&self.stats);
    }
}

/// Decodes a flush slot's payload back into a typed [`Record`], the
/// symmetric counterpart of `fetch`'s `encode_record`.
fn decode_record(payload: &[u8]) -> LocatorResult<Record> {
    serde_json::from_slice(payload).map_err(|e| LocatorError::CorruptPage {
        detail: format!("flush slot payload is not a recognizable record encoding: {e}"),
    })
}

/// Force-path operations, generic over the durable classname hash, lock
/// manager, heap, catalog, and B+tree collaborators.
pub struct ForceEngine<DH, L, H, C, B> {
    classname: Arc<ClassnameRegistry<DH, L>>,
    index: IndexMaintainer<B, H, C>,
    heap: Arc<H>,
    lock: Arc<L>,
    catalog: Arc<C>,
    config: LocatorConfig,
    subclasses: RwLock<FxHashMap<ClassOid, Vec<ClassOid>>>,
}

impl<DH, L, H, C, B> ForceEngine<DH, L, H, C, B>
where
    DH: DurableHash,
    L: LockApi,
    H: HeapApi,
    C: CatalogApi,
    B: locator_core::BTreeRuntime,
{
    pub fn new(
        classname: Arc<ClassnameRegistry<DH, L>>,
        btree: Arc<B>,
        heap: Arc<H>,
        lock: Arc<L>,
        catalog: Arc<C>,
        config: LocatorConfig,
    ) -> Self {
        let index = IndexMaintainer::new(btree, heap.clone(), catalog.clone());
        Self {
            classname,
            index,
            heap,
            lock,
            catalog,
            config,
            subclasses: RwLock::new(FxHashMap::default()),
        }
    }

    /// Expose the index maintainer for callers that need to register the
    /// FK graph or run verification scans directly.
    pub fn index_maintainer(&self) -> &IndexMaintainer<B, H, C> {
        &self.index
    }

    /// Record that `child` is a direct subclass of `parent`, standing in
    /// for a catalog hierarchy query `CatalogApi` doesn't expose
    /// (`resolve_subclass_hierarchy` below walks this map).
    pub fn register_subclass(&self, parent: ClassOid, child: ClassOid) {
        self.subclasses.write().entry(parent).or_default().push(child);
    }

    /// `resolve_subclass_hierarchy`: every class transitively reachable
    /// from `root` through registered subclass edges, `root` included.
    pub fn resolve_subclass_hierarchy(&self, root: ClassOid) -> Vec<ClassOid> {
        let graph = self.subclasses.read();
        let mut out = vec![root];
        let mut frontier = vec![root];
        while let Some(next) = frontier.pop() {
            if let Some(children) = graph.get(&next) {
                for child in children {
                    if !out.contains(child) {
                        out.push(*child);
                        frontier.push(*child);
                    }
                }
            }
        }
        out
    }

    /// `remove_class_from_index`: drop the index entries one class
    /// contributed, delegating to the index maintainer.
    pub fn remove_class_from_index(&self, hfid: Hfid, index: &locator_core::IndexDescriptor) -> LocatorResult<u32> {
        self.index.remove_class_from_index(hfid, index)
    }

    /// `force(copy_area)`: dispatch every slot, in order, merging
    /// unique-index stats once at batch end and surfacing a
    /// `UniqueViolation` if the merged stats for any touched index are
    /// inconsistent.
    pub fn force(&self, tran: TranIndex, ctx: &mut TransactionContext, area: &CopyArea) -> LocatorResult<()> {
        let mut scan = ForceScanCache::open(ctx);
        for slot in area.slots() {
            match slot.operation {
                Operation::FlushInsert => self.flush_insert(tran, slot, &mut scan)?,
                Operation::FlushUpdate => self.flush_update(tran, slot, &mut scan)?,
                Operation::FlushDelete => self.flush_delete(tran, slot, &mut scan)?,
                _ => {
                    return Err(LocatorError::InvalidOperation {
                        detail: format!("force does not accept operation {:?}", slot.operation),
                    })
                }
            }
        }
        drop(scan);

        let bad = ctx.inconsistent_indexes();
        if let Some(btid) = bad.into_iter().next() {
            tracing::warn!(tran, ?btid, "unique constraint violated at statement end");
            return Err(LocatorError::UniqueViolation { btid });
        }
        Ok(())
    }

    fn flush_insert(
        &self,
        _tran: TranIndex,
        slot: &locator_copyarea::OneObj,
        scan: &mut ForceScanCache,
    ) -> LocatorResult<()> {
        let mut record = decode_record(slot.payload())?;
        let class_oid = record.class_oid;

        if class_oid == ROOT_CLASS_OID {
            let inst_oid = self.heap.insert(slot.hfid, class_oid, &record)?;
            if let Some(Value::Text(name)) = record.get(CLASS_NAME_ATTR) {
                tracing::info!(class = %name, ?inst_oid, "class installed with permanent oid");
                self.classname.assign_permanent_oid(name, inst_oid);
            }
            self.catalog.update_class_info(ClassInfo {
                class_oid: inst_oid,
                hfid: slot.hfid,
                indexes: Vec::new(),
                tot_objects: 0,
            })?;
            return Ok(());
        }

        let class_info = self.catalog.get_class_info(class_oid)?;
        if let Some(info) = &class_info {
            if self.config.fk_checks_enabled && info.indexes.iter().any(|i| i.fk.is_some()) {
                self.index.fk_presence_check(&mut record, info, false)?;
            }
        }

        let inst_oid = self.heap.insert(slot.hfid, class_oid, &record)?;

        if let Some(info) = &class_info {
            self.index
                .add_or_remove_index(info, &record, inst_oid, class_oid, true, Some(scan.stats_mut()), self)?;
            let mut updated = info.clone();
            updated.tot_objects += 1;
            self.catalog.update_class_info(updated)?;
        }
        Ok(())
    }

    fn flush_update(
        &self,
        tran: TranIndex,
        slot: &locator_copyarea::OneObj,
        _scan: &mut ForceScanCache,
    ) -> LocatorResult<()> {
        let mut new_record = decode_record(slot.payload())?;
        let class_oid = new_record.class_oid;

        if class_oid == ROOT_CLASS_OID {
            let old = self.heap.get(slot.oid)?;
            self.heap.update(slot.oid, &new_record)?;
            if let (Some(Value::Text(old_name)), Some(Value::Text(new_name))) = (
                old.as_ref().and_then(|r| r.get(CLASS_NAME_ATTR)),
                new_record.get(CLASS_NAME_ATTR),
            ) {
                if old_name != new_name {
                    self.classname.rename(tran, old_name, new_name, slot.oid)?;
                }
            }
            return Ok(());
        }

        if let Some(info) = self.catalog.get_class_info(class_oid)? {
            if let Some(old_record) = self.heap.get(slot.oid)? {
                if self.config.fk_checks_enabled && info.indexes.iter().any(|i| i.fk.is_some()) {
                    self.index.fk_presence_check(&mut new_record, &info, false)?;
                }
                for index in &info.indexes {
                    if matches!(index.kind, IndexKind::PrimaryKey) {
                        let old_key = IndexMaintainer::<B, H, C>::derive_key(&old_record, index);
                        let new_key = IndexMaintainer::<B, H, C>::derive_key(&new_record, index);
                        self.index.pk_update_enforcement(index.btid, &old_key, &new_key, self)?;
                    }
                }
                self.index.update_index(slot.oid, &old_record, &new_record, &info, None)?;
            }
        }
        self.heap.update(slot.oid, &new_record)
    }

    fn flush_delete(
        &self,
        tran: TranIndex,
        slot: &locator_copyarea::OneObj,
        scan: &mut ForceScanCache,
    ) -> LocatorResult<()> {
        let pre = self.heap.get(slot.oid)?.ok_or(LocatorError::ObjectNotFound(slot.oid))?;

        if pre.class_oid == ROOT_CLASS_OID {
            if let Some(Value::Text(name)) = pre.get(CLASS_NAME_ATTR) {
                self.classname.delete(tran, name)?;
            }
            self.heap.delete(slot.oid)?;
            return Ok(());
        }

        if let Some(info) = self.catalog.get_class_info(pre.class_oid)? {
            self.index
                .add_or_remove_index(&info, &pre, slot.oid, pre.class_oid, false, Some(scan.stats_mut()), self)?;
            let mut updated = info.clone();
            updated.tot_objects = (updated.tot_objects - 1).max(0);
            self.catalog.update_class_info(updated)?;
        }
        self.heap.delete(slot.oid)
    }
}

impl<DH, L, H, C, B> CascadeDelegate for ForceEngine<DH, L, H, C, B>
where
    DH: DurableHash,
    L: LockApi,
    H: HeapApi,
    C: CatalogApi,
    B: locator_core::BTreeRuntime,
{
    fn cascade_delete(&self, oid: Oid) -> LocatorResult<()> {
        let pre = self.heap.get(oid)?.ok_or(LocatorError::ObjectNotFound(oid))?;
        if let Some(info) = self.catalog.get_class_info(pre.class_oid)? {
            self.index.add_or_remove_index(&info, &pre, oid, pre.class_oid, false, None, self)?;
        }
        self.heap.delete(oid)
    }

    fn cascade_update(&self, oid: Oid, new_record: &Record) -> LocatorResult<()> {
        if let Some(info) = self.catalog.get_class_info(new_record.class_oid)? {
            if let Some(old) = self.heap.get(oid)? {
                self.index.update_index(oid, &old, new_record, &info, None)?;
            }
        }
        self.heap.update(oid, new_record)
    }
}
