//! Run-scoped parcel store.
//!
//! Single DashMap design with lock-free concurrent access. The store is
//! append-only and single-assignment: an insert for an existing key is
//! refused, never merged or overwritten. One store lives for exactly one
//! engine run.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::parcel::{Parcel, ParcelKey};

/// Shared parcel storage for one run (cheap to clone, Arc inside)
#[derive(Clone, Default)]
pub struct ParcelStore {
    parcels: Arc<DashMap<ParcelKey, Parcel>>,
}

impl ParcelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parcel unless its key already exists.
    ///
    /// Returns whether the parcel was actually inserted. First writer wins;
    /// the existing parcel is never replaced. The entry API makes the
    /// check-and-insert atomic.
    pub fn insert(&self, parcel: Parcel) -> bool {
        use dashmap::mapref::entry::Entry;

        match self.parcels.entry(parcel.key().clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(e) => {
                e.insert(parcel);
                true
            }
        }
    }

    /// Get a parcel by key (cloned out)
    pub fn get(&self, key: &ParcelKey) -> Option<Parcel> {
        self.parcels.get(key).map(|p| p.clone())
    }

    /// Get just a parcel's value
    pub fn value(&self, key: &ParcelKey) -> Option<Value> {
        self.parcels.get(key).map(|p| (*p).value().clone())
    }

    pub fn contains(&self, key: &ParcelKey) -> bool {
        self.parcels.contains_key(key)
    }

    /// Check for an exact (unindexed) parcel under `base`
    pub fn contains_plain(&self, base: &str) -> bool {
        self.parcels.contains_key(&ParcelKey::plain(base))
    }

    /// Check whether at least one indexed parcel of `base` exists
    pub fn has_family(&self, base: &str) -> bool {
        self.parcels
            .iter()
            .any(|e| e.key().is_indexed() && e.key().base() == base)
    }

    /// All indices present for the family `base`, ascending and de-duplicated.
    ///
    /// Numeric order, not lexicographic: `[10]` sorts after `[2]`.
    pub fn indices(&self, base: &str) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .parcels
            .iter()
            .filter(|e| e.key().base() == base)
            .filter_map(|e| e.key().index())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Family members of `base` with their indices, ascending by index
    pub fn family(&self, base: &str) -> Vec<(usize, Parcel)> {
        let mut members: Vec<(usize, Parcel)> = self
            .parcels
            .iter()
            .filter(|e| e.key().base() == base)
            .filter_map(|e| e.key().index().map(|i| (i, e.value().clone())))
            .collect();
        members.sort_by_key(|(i, _)| *i);
        members
    }

    /// Snapshot of all keys currently in the store
    pub fn keys(&self) -> Vec<ParcelKey> {
        self.parcels.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }
}

impl std::fmt::Debug for ParcelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParcelStore")
            .field("len", &self.len())
            .finish()
    }
}
