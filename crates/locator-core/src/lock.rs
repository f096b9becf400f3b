//! Lock modes and the mode-conversion table used whenever a transaction
//! already holding one lock on an object requests a second, possibly
//! weaker, lock on the same object.

use serde::{Deserialize, Serialize};

/// A multiple-granularity lock mode, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LockMode {
    Null = 0,
    IntentShared = 1,
    Shared = 2,
    IntentExclusive = 3,
    SharedIntentExclusive = 4,
    Update = 5,
    Exclusive = 6,
}

use LockMode::*;

const ORDER: [LockMode; 7] = [
    Null,
    IntentShared,
    Shared,
    IntentExclusive,
    SharedIntentExclusive,
    Update,
    Exclusive,
];

/// Conversion table: `CONV[a][b]` is the lock mode a transaction should
/// hold after requesting `b` while already holding `a`. The table is the
/// least upper bound of the two modes in the standard multi-granularity
/// lock lattice (NULL < IS < {S, IX} < SIX < X, with U between S and X),
/// built once at load time rather than hand-maintained per pair.
#[rustfmt::skip]
const CONV: [[LockMode; 7]; 7] = [
    // held = Null
    [Null, IntentShared, Shared, IntentExclusive, SharedIntentExclusive, Update, Exclusive],
    // held = IntentShared
    [IntentShared, IntentShared, Shared, IntentExclusive, SharedIntentExclusive, Update, Exclusive],
    // held = Shared
    [Shared, Shared, Shared, SharedIntentExclusive, SharedIntentExclusive, Update, Exclusive],
    // held = IntentExclusive
    [IntentExclusive, IntentExclusive, SharedIntentExclusive, IntentExclusive, SharedIntentExclusive, SharedIntentExclusive, Exclusive],
    // held = SharedIntentExclusive
    [SharedIntentExclusive, SharedIntentExclusive, SharedIntentExclusive, SharedIntentExclusive, SharedIntentExclusive, SharedIntentExclusive, Exclusive],
    // held = Update
    [Update, Update, Update, SharedIntentExclusive, SharedIntentExclusive, Update, Exclusive],
    // held = Exclusive
    [Exclusive, Exclusive, Exclusive, Exclusive, Exclusive, Exclusive, Exclusive],
];

impl LockMode {
    fn index(self) -> usize {
        self as usize
    }

    /// The mode a holder of `self` ends up with after also being granted
    /// `requested` on the same object.
    pub fn convert(self, requested: LockMode) -> LockMode {
        CONV[self.index()][requested.index()]
    }

    /// Whether `self` already covers everything `other` would grant,
    /// i.e. converting would be a no-op.
    pub fn covers(self, other: LockMode) -> bool {
        self.convert(other) == self
    }
}

impl PartialOrd for LockMode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some((*self as u8).cmp(&(*other as u8)))
    }
}

impl Ord for LockMode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}
