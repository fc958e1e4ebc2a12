//! # `idmapdb` Core
//!
//! Local vector similarity index with stable external IDs and a JSON
//! payload mapper.
//!
//! Two independent components share one integer ID space:
//!
//! - [`IdMapIndex`] owns the vectors: insert, update-in-place (by ID),
//!   k-NN search, and snapshot persistence. Plain inserts get sequential
//!   IDs; updates keep the caller's ID across the replace.
//! - [`IndicesMapper`] owns the payloads: arbitrary values keyed by the
//!   same IDs, persisted as human-readable JSON with a tagged encoding
//!   that round-trips numeric arrays (shape included).
//!
//! The two never reference each other. The caller inserts a vector, gets
//! an ID back, stores the payload under that ID, and dereferences search
//! hits through the mapper.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use idmapdb_core::{IdMapIndex, IndicesMapper, NdArray};
//!
//! let mut index = IdMapIndex::open("./data/vectors.index", 32)?;
//! let mut mapper = IndicesMapper::open("./data/payloads.json")?;
//!
//! let id = index.insert_one(&embedding)?;
//! mapper.set(id, "original document text");
//!
//! let (ids, distances) = index.find_one(&query, 10)?;
//! let payload = mapper.get(ids[0])?;
//!
//! index.save()?;
//! mapper.save()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod distance;
#[cfg(test)]
mod distance_tests;
pub mod engine;
pub mod error;
pub mod index;
#[cfg(test)]
mod index_tests;
pub mod mapper;
pub mod value;

pub use config::{ConfigError, LoggingConfig, SearchConfig, StorageConfig, StoreConfig};
pub use engine::{Engine, FlatEngine, SENTINEL_DISTANCE, SENTINEL_ID};
pub use error::{Error, Result};
pub use index::{IdMapIndex, DEFAULT_N_RESULTS};
pub use mapper::IndicesMapper;
pub use value::{NdArray, Value};
