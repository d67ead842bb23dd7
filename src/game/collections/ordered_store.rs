//! Ordered Store: keyed entity storage that iterates in insertion order.
//!
//! # Purpose
//!
//! Simulation systems must visit entities in the same order on every run, so
//! nothing that depends on hash iteration order may leak into a tick. This
//! store keeps a dense `Vec` of entries in insertion order for iteration and
//! an `FxHashMap` from key to slot for O(1) lookup.
//!
//! # Architecture
//!
//! - Insertion appends to the end of the slot arrays.
//! - Removal tombstones the slot (O(1)); iteration skips tombstones.
//! - Once tombstones make up half of the slots (and at least
//!   [`SWEEP_MIN_TOMBSTONES`]), a sweep compacts the arrays in place,
//!   preserving the relative order of live entries.
//!
//! Serialization writes only live `(key, value)` pairs in iteration order, so
//! two stores holding the same entries in the same order serialize to the same
//! bytes no matter when they were last swept.

use std::hash::Hash;

use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// Tombstones tolerated before a sweep is considered.
pub const SWEEP_MIN_TOMBSTONES: usize = 64;

/// Result of an insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Entry was appended at this slot.
    Inserted(usize),
    /// Key already present; the store was not modified.
    AlreadyPresent,
}

/// Occupancy statistics, mostly for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub live: usize,
    pub tombstones: usize,
    pub slots: usize,
}

#[derive(Debug, Clone)]
pub struct OrderedStore<K, V> {
    keys: Vec<K>,
    values: Vec<Option<V>>,
    tombstones: FixedBitSet,
    tombstone_count: usize,
    index: FxHashMap<K, usize>,
}

impl<K, V> Default for OrderedStore<K, V> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
            tombstones: FixedBitSet::new(),
            tombstone_count: 0,
            index: FxHashMap::default(),
        }
    }
}

impl<K, V> OrderedStore<K, V>
where
    K: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut index = FxHashMap::default();
        index.reserve(capacity);
        Self {
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            tombstones: FixedBitSet::with_capacity(capacity),
            tombstone_count: 0,
            index,
        }
    }

    pub fn insert(&mut self, key: K, value: V) -> InsertResult {
        if self.index.contains_key(&key) {
            return InsertResult::AlreadyPresent;
        }
        let slot = self.keys.len();
        self.keys.push(key);
        self.values.push(Some(value));
        if self.tombstones.len() <= slot {
            self.tombstones.grow(slot + 1);
        }
        self.index.insert(key, slot);
        InsertResult::Inserted(slot)
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.index.get(&key).and_then(|&slot| self.values[slot].as_ref())
    }

    pub fn contains(&self, key: K) -> bool {
        self.index.contains_key(&key)
    }

    /// Replace the value stored under `key`, keeping its position.
    /// Returns the previous value, or hands `value` back if the key is absent.
    pub fn replace(&mut self, key: K, value: V) -> Result<V, V> {
        match self.index.get(&key) {
            Some(&slot) => match &mut self.values[slot] {
                Some(existing) => Ok(std::mem::replace(existing, value)),
                None => Err(value),
            },
            None => Err(value),
        }
    }

    /// Tombstone the entry for `key` and return its value.
    pub fn remove(&mut self, key: K) -> Option<V> {
        let slot = self.index.remove(&key)?;
        let value = self.values[slot].take();
        self.tombstones.set(slot, true);
        self.tombstone_count += 1;

        if self.tombstone_count >= SWEEP_MIN_TOMBSTONES && self.tombstone_count * 2 >= self.keys.len() {
            self.sweep();
        }
        value
    }

    /// Compact tombstoned slots, preserving the order of live entries.
    pub fn sweep(&mut self) {
        if self.tombstone_count == 0 {
            return;
        }

        let mut write_idx = 0;
        for read_idx in 0..self.keys.len() {
            if self.tombstones[read_idx] {
                continue;
            }
            if read_idx != write_idx {
                self.keys[write_idx] = self.keys[read_idx];
                self.values.swap(write_idx, read_idx);
                self.index.insert(self.keys[write_idx], write_idx);
            }
            write_idx += 1;
        }

        self.keys.truncate(write_idx);
        self.values.truncate(write_idx);
        self.tombstones.clear();
        self.tombstone_count = 0;
    }

    pub fn len(&self) -> usize {
        self.keys.len() - self.tombstone_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.keys
            .iter()
            .zip(self.values.iter())
            .filter_map(|(key, value)| value.as_ref().map(|value| (*key, value)))
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            live: self.len(),
            tombstones: self.tombstone_count,
            slots: self.keys.len(),
        }
    }
}

impl<K, V> Serialize for OrderedStore<K, V>
where
    K: Copy + Eq + Hash + Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Exact length up front: bincode cannot encode unsized sequences.
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for entry in self.iter() {
            seq.serialize_element(&entry)?;
        }
        seq.end()
    }
}
