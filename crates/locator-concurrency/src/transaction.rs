//! Per-transaction state owned exclusively by its transaction index: the
//! savepoint list and the per-transaction unique-index statistics table.

use locator_core::{Btid, Lsa, TranIndex};
use rustc_hash::FxHashMap;

/// The `(num_nulls, num_keys, num_oids)` counters accumulated for one
/// unique index across a multi-row batch. The uniqueness invariant at
/// statement end is `num_oids == num_nulls + num_keys`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniqueStats {
    pub num_nulls: i64,
    pub num_keys: i64,
    pub num_oids: i64,
}

impl UniqueStats {
    /// `num_oids == num_nulls + num_keys`.
    pub fn is_consistent(&self) -> bool {
        self.num_oids == self.num_nulls + self.num_keys
    }

    /// Fold in another accumulator's counts, e.g. merging a scan cache's
    /// local tally into the transaction-wide table at statement end.
    pub fn merge(&mut self, other: UniqueStats) {
        self.num_nulls += other.num_nulls;
        self.num_keys += other.num_keys;
        self.num_oids += other.num_oids;
    }

    /// `key_is_new` must be the B+tree's report of whether `key` had no
    /// prior entry: only a genuinely new non-null key grows `num_keys`,
    /// so a duplicate key bumps `num_oids` alone and the statement-end
    /// invariant can actually catch it.
    pub fn record_key(&mut self, key_is_null: bool, key_is_new: bool) {
        self.num_oids += 1;
        if key_is_null {
            self.num_nulls += 1;
        } else if key_is_new {
            self.num_keys += 1;
        }
    }

    pub fn remove_key(&mut self, key_is_null: bool) {
        self.num_oids -= 1;
        if key_is_null {
            self.num_nulls -= 1;
        } else {
            self.num_keys -= 1;
        }
    }
}

/// A scan cache's local, thread-local accumulator: built up during one
/// `force` batch without touching the transaction-wide table, then
/// merged in once at end-of-batch.
#[derive(Debug, Clone, Default)]
pub struct ScanCacheStats {
    per_index: FxHashMap<Btid, UniqueStats>,
}

impl ScanCacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_key(&mut self, btid: Btid, key_is_null: bool, key_is_new: bool) {
        self.per_index.entry(btid).or_default().record_key(key_is_null, key_is_new);
    }

    pub fn remove_key(&mut self, btid: Btid, key_is_null: bool) {
        self.per_index.entry(btid).or_default().remove_key(key_is_null);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Btid, &UniqueStats)> {
        self.per_index.iter()
    }
}

/// Per-transaction state: savepoints (in LSA order) and the merged
/// unique-index statistics table. Owned exclusively by the transaction
/// it belongs to; no cross-thread sharing.
#[derive(Debug, Clone)]
pub struct TransactionContext {
    tran_index: TranIndex,
    savepoints: Vec<Lsa>,
    unique_stats: FxHashMap<Btid, UniqueStats>,
    transient_classname_count: i32,
}

impl TransactionContext {
    pub fn new(tran_index: TranIndex) -> Self {
        Self {
            tran_index,
            savepoints: Vec::new(),
            unique_stats: FxHashMap::default(),
            transient_classname_count: 0,
        }
    }

    pub fn tran_index(&self) -> TranIndex {
        self.tran_index
    }

    /// Record a new savepoint, returning its LSA for callers that want to
    /// stamp the classname registry via `on_savepoint`.
    pub fn take_savepoint(&mut self, lsa: Lsa) {
        self.savepoints.push(lsa);
    }

    pub fn last_savepoint(&self) -> Option<Lsa> {
        self.savepoints.last().copied()
    }

    /// Drop every savepoint at or after `target` (inclusive), mirroring
    /// the classname registry's own rollback semantics so both stay in
    /// sync on partial rollback.
    pub fn rollback_savepoints_to(&mut self, target: Option<Lsa>) {
        match target {
            None => self.savepoints.clear(),
            Some(sp) => self.savepoints.retain(|s| *s <= sp),
        }
    }

    pub fn note_transient_classname_reserved(&mut self) {
        self.transient_classname_count += 1;
    }

    pub fn note_transient_classname_resolved(&mut self) {
        self.transient_classname_count -= 1;
    }

    pub fn transient_classname_count(&self) -> i32 {
        self.transient_classname_count
    }

    /// Merge a scan cache's local tally into the transaction-wide table,
    /// called once at end-of-batch.
    pub fn merge_scan_cache(&mut self, scan_cache: &ScanCacheStats) {
        for (btid, stats) in scan_cache.iter() {
            self.unique_stats.entry(*btid).or_default().merge(*stats);
        }
    }

    pub fn stats_for(&self, btid: Btid) -> UniqueStats {
        self.unique_stats.get(&btid).copied().unwrap_or_default()
    }

    /// Every unique index touched this transaction whose counts are
    /// inconsistent (`num_oids != num_nulls + num_keys`).
    pub fn inconsistent_indexes(&self) -> Vec<Btid> {
        self.unique_stats
            .iter()
            .filter(|(_, s)| !s.is_consistent())
            .map(|(btid, _)| *btid)
            .collect()
    }
}
