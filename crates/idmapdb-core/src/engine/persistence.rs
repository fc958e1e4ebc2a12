//! Engine-native snapshot persistence.
//!
//! A snapshot captures the complete entry set. The format is owned by the
//! engine; callers treat the file as an opaque blob.
//!
//! # Snapshot Format
//!
//! ```text
//! [Magic: "IDMF" 4 bytes]
//! [Version: 1 byte]
//! [Body: bincode (dimension: u64, ids: Vec<i64>, vectors: Vec<f32>)]
//! ```

use super::flat::FlatEngine;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

/// Snapshot file magic bytes.
pub(crate) const SNAPSHOT_MAGIC: &[u8; 4] = b"IDMF";

/// Current snapshot format version.
pub(crate) const SNAPSHOT_VERSION: u8 = 1;

/// Writes a full engine snapshot to `path`, overwriting any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_index(engine: &FlatEngine, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(SNAPSHOT_MAGIC)?;
    writer.write_all(&[SNAPSHOT_VERSION])?;

    let (dimension, ids, vectors) = engine.as_parts();
    bincode::serialize_into(&mut writer, &(dimension as u64, ids, vectors))
        .map_err(|e| Error::Serialization(e.to_string()))?;

    writer.flush()?;
    Ok(())
}

/// Reads a full engine snapshot from `path`.
///
/// # Errors
///
/// Returns [`Error::EngineCorrupted`] if the header or body cannot be
/// interpreted, and [`Error::Io`] if the file cannot be read at all.
pub fn read_index(path: &Path) -> Result<FlatEngine> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    read_header(&mut reader, &mut magic)?;
    if &magic != SNAPSHOT_MAGIC {
        return Err(Error::EngineCorrupted(format!(
            "bad magic bytes {magic:02x?}"
        )));
    }

    let mut version = [0u8; 1];
    read_header(&mut reader, &mut version)?;
    if version[0] != SNAPSHOT_VERSION {
        return Err(Error::EngineCorrupted(format!(
            "unsupported snapshot version {}",
            version[0]
        )));
    }

    let (dimension, ids, vectors): (u64, Vec<i64>, Vec<f32>) =
        bincode::deserialize_from(&mut reader)
            .map_err(|e| Error::EngineCorrupted(e.to_string()))?;
    let dimension = dimension as usize;

    if ids.len() * dimension != vectors.len() {
        return Err(Error::EngineCorrupted(format!(
            "{} ids with dimension {} do not match {} floats",
            ids.len(),
            dimension,
            vectors.len()
        )));
    }

    Ok(FlatEngine::from_parts(dimension, ids, vectors))
}

/// Reads a fixed-size header field, mapping EOF to a corruption error.
fn read_header<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            Error::EngineCorrupted("truncated snapshot header".to_string())
        } else {
            Error::Io(e)
        }
    })
}
