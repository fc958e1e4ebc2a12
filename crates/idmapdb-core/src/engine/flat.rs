//! Exact brute-force engine over squared Euclidean distance.

use super::{Engine, SENTINEL_DISTANCE, SENTINEL_ID};
use crate::distance::squared_euclidean;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// Exact k-NN engine backed by a flat, row-major vector buffer.
///
/// Entries live in parallel arrays: `ids[slot]` names the entry stored at
/// `vectors[slot * dimension .. (slot + 1) * dimension]`. Removal
/// swap-removes the slot, so slot order is not stable across removals;
/// external IDs are. A slot map gives O(1) removal lookup.
#[derive(Debug)]
pub struct FlatEngine {
    /// Vector dimension
    dimension: usize,
    /// External ID per slot
    ids: Vec<i64>,
    /// Row-major vector buffer, `ids.len() * dimension` floats
    vectors: Vec<f32>,
    /// External ID -> slot
    slots: FxHashMap<i64, usize>,
}

impl FlatEngine {
    /// Creates an empty engine accepting vectors of `dimension`.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ids: Vec::new(),
            vectors: Vec::new(),
            slots: FxHashMap::default(),
        }
    }

    /// Rebuilds an engine from snapshot parts, restoring the slot map.
    ///
    /// The persistence layer validates `ids.len() * dimension ==
    /// vectors.len()` before calling.
    pub(crate) fn from_parts(dimension: usize, ids: Vec<i64>, vectors: Vec<f32>) -> Self {
        debug_assert_eq!(ids.len() * dimension, vectors.len());
        let slots = ids
            .iter()
            .enumerate()
            .map(|(slot, &id)| (id, slot))
            .collect();
        Self {
            dimension,
            ids,
            vectors,
            slots,
        }
    }

    /// Returns the snapshot parts `(dimension, ids, vectors)`.
    pub(crate) fn as_parts(&self) -> (usize, &[i64], &[f32]) {
        (self.dimension, &self.ids, &self.vectors)
    }

    #[inline]
    fn vector_at(&self, slot: usize) -> &[f32] {
        &self.vectors[slot * self.dimension..(slot + 1) * self.dimension]
    }

    /// Scans all entries and returns the `k` closest to `query`.
    fn search_one(&self, query: &[f32], k: usize) -> (Vec<i64>, Vec<f32>) {
        let mut ranked: Vec<(f32, i64)> = self
            .ids
            .iter()
            .enumerate()
            .map(|(slot, &id)| (squared_euclidean(query, self.vector_at(slot)), id))
            .collect();
        ranked.sort_unstable_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        ranked.truncate(k);

        let mut ids: Vec<i64> = ranked.iter().map(|&(_, id)| id).collect();
        let mut distances: Vec<f32> = ranked.iter().map(|&(d, _)| d).collect();
        ids.resize(k, SENTINEL_ID);
        distances.resize(k, SENTINEL_DISTANCE);
        (ids, distances)
    }
}

impl Engine for FlatEngine {
    fn add_with_ids(&mut self, vectors: &[Vec<f32>], ids: &[i64]) {
        debug_assert_eq!(vectors.len(), ids.len());

        self.vectors.reserve(vectors.len() * self.dimension);
        for (vector, &id) in vectors.iter().zip(ids) {
            debug_assert_eq!(vector.len(), self.dimension);
            self.slots.insert(id, self.ids.len());
            self.ids.push(id);
            self.vectors.extend_from_slice(vector);
        }
    }

    fn remove_ids(&mut self, ids: &[i64]) -> usize {
        let mut removed = 0;
        for &id in ids {
            let Some(slot) = self.slots.remove(&id) else {
                continue;
            };
            // Swap-remove both the ID column and the vector row, then fix
            // up the slot map for the entry that moved into the hole.
            let last = self.ids.len() - 1;
            self.ids.swap_remove(slot);
            let row = slot * self.dimension;
            let last_row = last * self.dimension;
            for offset in 0..self.dimension {
                self.vectors.swap(row + offset, last_row + offset);
            }
            self.vectors.truncate(last_row);
            if slot != last {
                self.slots.insert(self.ids[slot], slot);
            }
            removed += 1;
        }
        removed
    }

    fn search(&self, queries: &[Vec<f32>], k: usize) -> (Vec<Vec<i64>>, Vec<Vec<f32>>) {
        let mut all_ids = Vec::with_capacity(queries.len());
        let mut all_distances = Vec::with_capacity(queries.len());
        for query in queries {
            debug_assert_eq!(query.len(), self.dimension);
            let (ids, distances) = self.search_one(query, k);
            all_ids.push(ids);
            all_distances.push(distances);
        }
        (all_ids, all_distances)
    }

    fn ntotal(&self) -> usize {
        self.ids.len()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
