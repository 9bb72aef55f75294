//! Parcel - the data unit flowing through a run.
//!
//! A parcel is an immutable named value with provenance: which node produced
//! it and when. Names are typed keys (`ParcelKey`) rather than raw strings,
//! so the `base[index]` family relationship is structural instead of being
//! re-parsed at every matching site.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Pattern for `base[index]` names, where index is a non-negative integer
static INDEXED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<base>.+)\[(?P<index>\d+)\]$").unwrap());

/// Typed parcel name: a base plus an optional family index.
///
/// `plain("result")` renders as `result`; `indexed("item", 3)` renders as
/// `item[3]`. Parcels sharing a base with distinct indices form a family;
/// families need not be contiguous or fully populated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParcelKey {
    base: Arc<str>,
    index: Option<usize>,
}

impl ParcelKey {
    /// Exact (unindexed) name
    pub fn plain(base: impl Into<Arc<str>>) -> Self {
        Self {
            base: base.into(),
            index: None,
        }
    }

    /// Member `index` of the family `base`
    pub fn indexed(base: impl Into<Arc<str>>, index: usize) -> Self {
        Self {
            base: base.into(),
            index: Some(index),
        }
    }

    /// Parse a rendered name.
    ///
    /// `"item[3]"` becomes an indexed key; anything else (including bracket
    /// text without a valid integer, like `"x[abc]"`) is kept as a plain
    /// name.
    pub fn parse(name: &str) -> Self {
        if let Some(caps) = INDEXED_NAME.captures(name) {
            if let Ok(index) = caps["index"].parse::<usize>() {
                return Self::indexed(caps["base"].to_string(), index);
            }
        }
        Self::plain(name)
    }

    /// The name portion before any index bracket
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The family index, if this key is indexed
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Same base, pinned to the given index
    pub fn with_index(&self, index: usize) -> Self {
        Self {
            base: Arc::clone(&self.base),
            index: Some(index),
        }
    }
}

impl fmt::Display for ParcelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{}]", self.base, i),
            None => f.write_str(&self.base),
        }
    }
}

/// A parcel of data created during one engine run.
///
/// Parcels are single-assignment: once a key exists in the store it is never
/// overwritten, so no mutating operations are exposed here.
#[derive(Debug, Clone)]
pub struct Parcel {
    key: ParcelKey,
    value: Value,
    timestamp_ms: u64,
    producer: Option<Arc<str>>,
}

impl Parcel {
    /// Parcel created by the seeding step (no producer)
    pub fn seed(key: ParcelKey, value: Value) -> Self {
        Self {
            key,
            value,
            timestamp_ms: now_ms(),
            producer: None,
        }
    }

    /// Parcel created by a node execution
    pub fn produced(key: ParcelKey, value: Value, producer: impl Into<Arc<str>>) -> Self {
        Self {
            key,
            value,
            timestamp_ms: now_ms(),
            producer: Some(producer.into()),
        }
    }

    pub fn key(&self) -> &ParcelKey {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Creation time, milliseconds since the Unix epoch
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Id of the node that created this parcel (`None` for seeds)
    pub fn producer(&self) -> Option<&str> {
        self.producer.as_deref()
    }
}

/// Milliseconds since the Unix epoch
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_key_roundtrip() {
        let key = ParcelKey::plain("result");
        assert_eq!(key.base(), "result");
        assert_eq!(key.index(), None);
        assert_eq!(key.to_string(), "result");
        assert_eq!(ParcelKey::parse("result"), key);
    }

    #[test]
    fn indexed_key_roundtrip() {
        let key = ParcelKey::indexed("item", 3);
        assert_eq!(key.base(), "item");
        assert_eq!(key.index(), Some(3));
        assert_eq!(key.to_string(), "item[3]");
        assert_eq!(ParcelKey::parse("item[3]"), key);
    }

    #[test]
    fn parse_is_lenient_on_bad_indices() {
        // Non-integer brackets stay part of a plain name, matching the
        // original string-matching behavior.
        let key = ParcelKey::parse("x[abc]");
        assert!(!key.is_indexed());
        assert_eq!(key.base(), "x[abc]");
    }

    #[test]
    fn parse_large_index() {
        let key = ParcelKey::parse("item[10]");
        assert_eq!(key.index(), Some(10));
    }

    #[test]
    fn with_index_pins_base() {
        let plain = ParcelKey::plain("out");
        assert_eq!(plain.with_index(2), ParcelKey::indexed("out", 2));
    }

    #[test]
    fn keys_order_by_base_then_numeric_index() {
        let mut keys = vec![
            ParcelKey::indexed("item", 10),
            ParcelKey::indexed("item", 2),
            ParcelKey::plain("item"),
        ];
        keys.sort();
        // Plain sorts before indexed; indices compare numerically, so [2]
        // comes before [10].
        assert_eq!(keys[0], ParcelKey::plain("item"));
        assert_eq!(keys[1], ParcelKey::indexed("item", 2));
        assert_eq!(keys[2], ParcelKey::indexed("item", 10));
    }

    #[test]
    fn seed_parcel_has_no_producer() {
        let parcel = Parcel::seed(ParcelKey::plain("input"), json!(42));
        assert_eq!(parcel.producer(), None);
        assert_eq!(parcel.value(), &json!(42));
        assert!(parcel.timestamp_ms() > 0);
    }

    #[test]
    fn produced_parcel_records_node() {
        let parcel = Parcel::produced(ParcelKey::indexed("out", 1), json!("x"), "worker");
        assert_eq!(parcel.producer(), Some("worker"));
        assert_eq!(parcel.key(), &ParcelKey::indexed("out", 1));
    }
}
