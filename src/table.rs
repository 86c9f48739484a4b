//! Per-light sample table
//!
//! Raw estimates land here before filtering: one slot vector per
//! [`LightKey`], one [`LightSample`] per direction index. Slots are stable
//! across frames. A direction that fails to estimate zeroes its slot's
//! energy instead of removing it, so downstream smoothing sees a fade
//! rather than a pop.
//!
//! Author: Moroya Sakamoto

use std::collections::HashMap;

use glam::Vec3;

use crate::types::{LightKey, LightSample};

/// Raw sample storage keyed by light, indexed by direction slot.
#[derive(Debug, Clone, Default)]
pub struct TargetTable {
    entries: HashMap<LightKey, Vec<LightSample>>,
}

impl TargetTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a sample into `key`'s slot `index`.
    ///
    /// Missing slots below `index` are padded with extinguished records at
    /// the sample's position so slot count only ever grows monotonically
    /// within a frame.
    pub fn set(&mut self, key: LightKey, index: usize, sample: LightSample) {
        let slots = self.entries.entry(key).or_default();
        while slots.len() <= index {
            slots.push(LightSample::extinguished(sample.position));
        }
        slots[index] = sample;
    }

    /// Zero the energy of `key`'s slot `index`, keeping the slot alive.
    ///
    /// An existing record keeps its position, normal and radius so the
    /// filter fades it in place; a missing slot is created extinguished at
    /// `fallback_position`.
    pub fn zero(&mut self, key: LightKey, index: usize, fallback_position: Vec3) {
        let slots = self.entries.entry(key).or_default();
        if index < slots.len() {
            slots[index].energy = 0.0;
        } else {
            while slots.len() <= index {
                slots.push(LightSample::extinguished(fallback_position));
            }
        }
    }

    /// Drop slots at and beyond `len` for `key`.
    ///
    /// Used when a light's configured direction count shrinks, so stale
    /// high indices do not linger in the filter.
    pub fn truncate(&mut self, key: LightKey, len: usize) {
        if let Some(slots) = self.entries.get_mut(&key) {
            slots.truncate(len);
        }
    }

    /// Samples for a key, if any.
    pub fn get(&self, key: LightKey) -> Option<&[LightSample]> {
        self.entries.get(&key).map(|v| v.as_slice())
    }

    /// A single slot, if both the key and the index exist.
    pub fn slot(&self, key: LightKey, index: usize) -> Option<&LightSample> {
        self.entries.get(&key).and_then(|v| v.get(index))
    }

    /// Remove a key and its slots outright.
    pub fn remove(&mut self, key: LightKey) {
        self.entries.remove(&key);
    }

    /// Keep only keys for which `pred` returns true.
    pub fn retain<F: FnMut(&LightKey) -> bool>(&mut self, mut pred: F) {
        self.entries.retain(|k, _| pred(k));
    }

    /// Drop all keys and slots.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of keys currently stored.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of slots across all keys.
    pub fn sample_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// True when no key is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate keys and their slot vectors.
    pub fn iter(&self) -> impl Iterator<Item = (LightKey, &[LightSample])> {
        self.entries.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Iterate every slot as `(key, index, sample)`.
    pub fn flatten(&self) -> impl Iterator<Item = (LightKey, usize, &LightSample)> {
        self.entries
            .iter()
            .flat_map(|(k, v)| v.iter().enumerate().map(move |(i, s)| (*k, i, s)))
    }

    /// Stored keys.
    pub fn keys(&self) -> impl Iterator<Item = LightKey> + '_ {
        self.entries.keys().copied()
    }
}
