//! Typed attribute values, the locator's stand-in for `DB_VALUE`.
//!
//! The copy-area wire format (see `locator-copyarea`) moves records as
//! opaque bytes; everything in this crate that needs to reason about an
//! attribute's *content* — key derivation, foreign-key comparison,
//! cache-attribute rewriting — works against this typed view instead.

use crate::ids::{AttrId, Oid};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single attribute's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i32),
    BigInt(i64),
    Real(f64),
    Text(String),
    Bytes(Vec<u8>),
    Oid(Oid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Ordering used for key comparison. `Null` sorts before every other
    /// value, matching the B+tree's "nulls are never equal, nulls sort
    /// low" convention used in uniqueness checks.
    pub fn cmp_for_key(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (Int(a), Int(b)) => a.cmp(b),
            (BigInt(a), BigInt(b)) => a.cmp(b),
            (Int(a), BigInt(b)) => (*a as i64).cmp(b),
            (BigInt(a), Int(b)) => a.cmp(&(*b as i64)),
            (Real(a), Real(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Text(a), Text(b)) => a.cmp(b),
            (Bytes(a), Bytes(b)) => a.cmp(b),
            (Oid(a), Oid(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// A decoded heap record: the class it belongs to plus its attribute
/// values. The locator never parses the heap's physical record format
/// (that's the heap's job); it receives this structured view already
/// materialized, the same separation `HEAP_CACHE_ATTRINFO` draws in the
/// original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub class_oid: Oid,
    pub attributes: Vec<(AttrId, Value)>,
}

impl Record {
    pub fn new(class_oid: Oid) -> Self {
        Self {
            class_oid,
            attributes: Vec::new(),
        }
    }

    pub fn with_attr(mut self, id: AttrId, value: Value) -> Self {
        self.attributes.push((id, value));
        self
    }

    pub fn get(&self, attr_id: AttrId) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(id, _)| *id == attr_id)
            .map(|(_, v)| v)
    }

    pub fn set(&mut self, attr_id: AttrId, value: Value) {
        if let Some(slot) = self.attributes.iter_mut().find(|(id, _)| *id == attr_id) {
            slot.1 = value;
        } else {
            self.attributes.push((attr_id, value));
        }
    }

    /// Derive a multi-column key by reading `attr_ids` in order. Per the
    /// multi-column null rule, the key is null (for uniqueness purposes)
    /// if any component is null.
    pub fn derive_key(&self, attr_ids: &[AttrId]) -> Vec<Value> {
        attr_ids
            .iter()
            .map(|id| self.get(*id).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// True iff a derived multi-column key counts as null for uniqueness
/// purposes: any component being null makes the whole key null.
pub fn key_is_null(key: &[Value]) -> bool {
    key.iter().any(|v| v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sorts_before_everything() {
        assert_eq!(Value::Null.cmp_for_key(&Value::Int(0)), Ordering::Less);
        assert_eq!(Value::Int(0).cmp_for_key(&Value::Null), Ordering::Greater);
        assert_eq!(Value::Null.cmp_for_key(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn record_get_set_roundtrip() {
        let mut r = Record::new(Oid::new(0, 1, 0));
        r.set(1, Value::Text("alice".into()));
        assert_eq!(r.get(1), Some(&Value::Text("alice".into())));
        r.set(1, Value::Text("bob".into()));
        assert_eq!(r.get(1), Some(&Value::Text("bob".into())));
        assert_eq!(r.attributes.len(), 1);
    }

    #[test]
    fn multi_column_key_null_if_any_component_null() {
        let mut r = Record::new(Oid::new(0, 1, 0));
        r.set(1, Value::Int(5));
        let key = r.derive_key(&[1, 2]);
        assert!(key_is_null(&key));
        r.set(2, Value::Int(6));
        let key = r.derive_key(&[1, 2]);
        assert!(!key_is_null(&key));
    }

    #[test]
    fn value_serde_roundtrip() {
        let v = Value::Oid(Oid::new(1, 2, 3));
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
