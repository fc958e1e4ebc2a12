//! ID-stable vector index.
//!
//! [`IdMapIndex`] keeps a stable external integer ID per stored vector
//! across updates and restarts. Plain inserts are assigned sequential IDs
//! from the current entry count; updates keep the caller's ID by removing
//! the old entry and reinserting the new vector under the same ID.
//!
//! # Example
//!
//! ```rust,ignore
//! use idmapdb_core::IdMapIndex;
//!
//! let mut index = IdMapIndex::open("./data/vectors.index", 32)?;
//! let id = index.insert_one(&embedding)?;
//! let (ids, distances) = index.find_one(&embedding, 10)?;
//! assert_eq!(ids[0], id); // exact self-match, distance 0
//! index.save()?;
//! ```

use crate::engine::{self, Engine, FlatEngine};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Default number of results returned by searches.
pub const DEFAULT_N_RESULTS: usize = 10;

/// Vector index with stable external IDs and snapshot persistence.
///
/// All mutation takes `&mut self`. The update path is remove-then-reinsert
/// (the engine has no in-place mutation), so a reader running concurrently
/// could in principle observe the entry absent mid-update; the exclusive
/// borrow rules that out in-process. Callers sharing an index across
/// threads must serialize access externally.
pub struct IdMapIndex {
    /// Snapshot path, retained for [`IdMapIndex::save`]
    path: PathBuf,
    /// The underlying search engine
    engine: FlatEngine,
}

impl IdMapIndex {
    /// Opens the index at `path`.
    ///
    /// If the file exists it is loaded as an engine snapshot and the stored
    /// dimension wins; otherwise a fresh empty index of `dimension` is
    /// created. Nothing is written to disk until [`IdMapIndex::save`] or
    /// [`IdMapIndex::persist`] is called.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing snapshot cannot be read or decoded.
    pub fn open<P: AsRef<Path>>(path: P, dimension: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let engine = if path.is_file() {
            let engine = engine::read_index(&path)?;
            tracing::info!(
                path = %path.display(),
                entries = engine.ntotal(),
                dimension = engine.dimension(),
                "loaded index snapshot"
            );
            engine
        } else {
            FlatEngine::new(dimension)
        };

        Ok(Self { path, engine })
    }

    /// Inserts a vector and returns its assigned ID.
    ///
    /// The ID is the current entry count, so plain inserts are sequential
    /// and monotonic: updates remove then reinsert under the same ID and
    /// never lower the count, so vacated IDs are not handed out again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the vector length differs
    /// from the index dimension.
    pub fn insert_one(&mut self, vector: &[f32]) -> Result<i64> {
        self.check_vector(vector)?;

        let id = self.engine.ntotal() as i64;
        self.engine.add_with_ids(&[vector.to_vec()], &[id]);
        tracing::debug!(id, "inserted vector");

        Ok(id)
    }

    /// Inserts a batch of vectors and returns their assigned IDs.
    ///
    /// IDs form a contiguous block starting at the pre-call entry count,
    /// one per input row, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if any row's length differs
    /// from the index dimension.
    pub fn insert_many(&mut self, vectors: &[Vec<f32>]) -> Result<Vec<i64>> {
        self.check_batch(vectors)?;

        let start = self.engine.ntotal() as i64;
        let ids: Vec<i64> = (start..start + vectors.len() as i64).collect();
        self.engine.add_with_ids(vectors, &ids);
        tracing::debug!(count = ids.len(), start, "inserted vector batch");

        Ok(ids)
    }

    /// Replaces the vector stored under `id` and returns `id` unchanged.
    ///
    /// Removing a missing ID is a no-op, so this also works as an insert
    /// with an explicit ID. Subsequent searches treat `id` as pointing at
    /// `new_vector`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the vector length differs
    /// from the index dimension.
    pub fn update_one(&mut self, new_vector: &[f32], id: i64) -> Result<i64> {
        self.check_vector(new_vector)?;

        self.engine.remove_ids(&[id]);
        self.engine.add_with_ids(&[new_vector.to_vec()], &[id]);
        tracing::debug!(id, "updated vector");

        Ok(id)
    }

    /// Batched form of [`IdMapIndex::update_one`].
    ///
    /// All `ids` are removed first, then all `new_vectors` are added under
    /// them in one pass. Returns `ids` unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `new_vectors` and `ids` differ
    /// in length, [`Error::DimensionMismatch`] if any row is misshaped.
    pub fn update_many(&mut self, new_vectors: &[Vec<f32>], ids: &[i64]) -> Result<Vec<i64>> {
        if new_vectors.len() != ids.len() {
            return Err(Error::LengthMismatch {
                vectors: new_vectors.len(),
                ids: ids.len(),
            });
        }
        self.check_batch(new_vectors)?;

        self.engine.remove_ids(ids);
        self.engine.add_with_ids(new_vectors, ids);
        tracing::debug!(count = ids.len(), "updated vector batch");

        Ok(ids.to_vec())
    }

    /// Returns up to `n_results` nearest stored vectors to `vector`.
    ///
    /// Result sequences are parallel and sorted by increasing distance,
    /// closest first; an exact match scores distance 0. When fewer than
    /// `n_results` entries exist the engine's sentinel padding (ID `-1`,
    /// max distance) is passed through unmodified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the query length differs
    /// from the index dimension.
    pub fn find_one(&self, vector: &[f32], n_results: usize) -> Result<(Vec<i64>, Vec<f32>)> {
        self.check_vector(vector)?;

        let (mut ids, mut distances) = self.engine.search(&[vector.to_vec()], n_results);
        Ok((ids.swap_remove(0), distances.swap_remove(0)))
    }

    /// Batched form of [`IdMapIndex::find_one`].
    ///
    /// One result row per query, each an independent search.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if any query is misshaped.
    pub fn find_many(
        &self,
        vectors: &[Vec<f32>],
        n_results: usize,
    ) -> Result<(Vec<Vec<i64>>, Vec<Vec<f32>>)> {
        self.check_batch(vectors)?;

        Ok(self.engine.search(vectors, n_results))
    }

    /// Persists the full index state to the path given at open time.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn save(&self) -> Result<()> {
        self.persist(&self.path)
    }

    /// Persists the full index state to an explicit path.
    ///
    /// Parent directories are created as needed; an existing file at the
    /// path is overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or the snapshot write fails.
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        engine::write_index(&self.engine, path)?;
        tracing::info!(
            path = %path.display(),
            entries = self.len(),
            "persisted index snapshot"
        );

        Ok(())
    }

    /// Current entry count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engine.ntotal()
    }

    /// Returns true if the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimension accepted by this index.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.engine.dimension()
    }

    /// Snapshot path this index was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_vector(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.dimension(),
                actual: vector.len(),
            });
        }
        Ok(())
    }

    fn check_batch(&self, vectors: &[Vec<f32>]) -> Result<()> {
        for vector in vectors {
            self.check_vector(vector)?;
        }
        Ok(())
    }
}
