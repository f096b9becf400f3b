//! The action record and its LIFO stack, the unit of state a transient
//! classname entry carries while a transaction has a pending reserve,
//! delete, or rename in flight.

use locator_core::{ClassOid, Lsa};

/// What a transient classname entry currently represents. `Exist` is the
/// durable/committed resting state; every other variant is scoped to the
/// transaction that installed it and is popped or flushed at transaction
/// end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Reserved,
    ReservedRename,
    Deleted,
    DeletedRename,
    Exist,
}

impl ActionKind {
    /// Whether this action is the durable resting state rather than a
    /// transaction-scoped action in flight.
    pub fn is_exist(self) -> bool {
        matches!(self, ActionKind::Exist)
    }
}

/// One action a transaction has taken against a classname, plus whatever
/// action it superseded (`prev`), so a savepoint rollback can restore the
/// entry to exactly the state it had before.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub action: ActionKind,
    pub class_oid: ClassOid,
    /// Savepoint this action is pinned to: `on_rollback` pops actions
    /// whose `savepoint_lsa` is null or `>=` the target savepoint.
    pub savepoint_lsa: Option<Lsa>,
    pub prev: Option<Box<ActionRecord>>,
}

impl ActionRecord {
    pub fn new(action: ActionKind, class_oid: ClassOid) -> Self {
        Self {
            action,
            class_oid,
            savepoint_lsa: None,
            prev: None,
        }
    }

    /// Replace `self` with a new action, pushing the old one onto `prev`
    /// iff it was already stamped with a savepoint (so a rollback to that
    /// savepoint can restore it). An action with no savepoint stamp has
    /// never been observed outside the current statement and can simply
    /// be overwritten.
    pub fn supersede(&mut self, new_action: ActionKind, new_class_oid: ClassOid) {
        if self.savepoint_lsa.is_some() {
            let old = std::mem::replace(
                self,
                ActionRecord::new(new_action, new_class_oid),
            );
            self.prev = Some(Box::new(old));
        } else {
            self.action = new_action;
            self.class_oid = new_class_oid;
        }
    }

    /// Pop the stack until reaching the target savepoint (`None` pops
    /// everything, for a full abort). Returns `true` if any frame
    /// remains, `false` if the stack emptied and the entry should be
    /// destroyed.
    ///
    /// An action is popped when it has never been stamped by a savepoint
    /// (it happened after the target) or when its stamp is strictly
    /// newer than the target; an action stamped exactly at the target
    /// savepoint is the one that was current when that savepoint was
    /// taken and survives the rollback (see `DESIGN.md` for why this
    /// departs from the originating code's `<=` comparison).
    pub fn rollback_to(&mut self, target: Option<Lsa>) -> bool {
        loop {
            let should_pop = match target {
                None => true,
                Some(sp) => self.savepoint_lsa.map_or(true, |my_sp| my_sp > sp),
            };
            if !should_pop {
                return true;
            }
            match self.prev.take() {
                Some(prev) => *self = *prev,
                None => return false,
            }
        }
    }

    /// Collapse the whole stack to a single cached `Exist` entry on
    /// commit, discarding rollback history.
    pub fn collapse_to_exist(&mut self, class_oid: ClassOid) {
        self.action = ActionKind::Exist;
        self.class_oid = class_oid;
        self.savepoint_lsa = None;
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locator_core::Oid;

    #[test]
    fn supersede_without_savepoint_overwrites_in_place() {
        let mut rec = ActionRecord::new(ActionKind::Reserved, Oid::new(0, 1, 0));
        rec.supersede(ActionKind::Deleted, Oid::new(0, 1, 0));
        assert_eq!(rec.action, ActionKind::Deleted);
        assert!(rec.prev.is_none());
    }

    #[test]
    fn supersede_with_savepoint_pushes_prev() {
        let mut rec = ActionRecord::new(ActionKind::Reserved, Oid::new(0, 1, 0));
        rec.savepoint_lsa = Some(Lsa {
            pageid: 10,
            offset: 0,
        });
        rec.supersede(ActionKind::DeletedRename, Oid::new(0, 2, 0));
        assert_eq!(rec.action, ActionKind::DeletedRename);
        assert_eq!(rec.prev.as_ref().unwrap().action, ActionKind::Reserved);
    }

    #[test]
    fn rollback_to_none_empties_stack() {
        let mut rec = ActionRecord::new(ActionKind::Reserved, Oid::new(0, 1, 0));
        rec.savepoint_lsa = Some(Lsa {
            pageid: 5,
            offset: 0,
        });
        assert!(!rec.rollback_to(None));
    }

    #[test]
    fn rollback_to_savepoint_restores_prior_frame() {
        let sp1 = Lsa {
            pageid: 1,
            offset: 0,
        };
        let mut rec = ActionRecord::new(ActionKind::Reserved, Oid::new(0, 1, 0));
        rec.savepoint_lsa = Some(sp1);
        rec.supersede(ActionKind::DeletedRename, Oid::new(0, 1, 0));
        let sp2 = Lsa {
            pageid: 2,
            offset: 0,
        };
        rec.savepoint_lsa = Some(sp2);
        rec.supersede(ActionKind::ReservedRename, Oid::new(0, 3, 0));

        assert!(rec.rollback_to(Some(sp2)));
        assert_eq!(rec.action, ActionKind::DeletedRename);

        assert!(rec.rollback_to(Some(sp1)));
        assert_eq!(rec.action, ActionKind::Reserved);
    }
}
