//! ID-to-payload mapper with JSON persistence.
//!
//! [`IndicesMapper`] associates arbitrary payload [`Value`]s with the same
//! integer ID space the vector index hands out. The two components never
//! reference each other; the caller composes them, and only the caller
//! guarantees that an ID present in both names the same logical entity.
//!
//! The persisted form is a single UTF-8 JSON object whose keys are the
//! decimal string form of each ID. Array-valued entries use the tagged
//! encoding from [`crate::value`] so they reload with their exact shape.

use crate::error::{Error, Result};
use crate::value::Value;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Order-preserving map from normalized ID keys to payload values.
///
/// Keys are always the string form of the ID: `set(5, ..)` and `get("5")`
/// address the same entry. Mutations are in-memory only until
/// [`IndicesMapper::save`] is called; there is no autosave.
#[derive(Debug)]
pub struct IndicesMapper {
    /// File path, retained for [`IndicesMapper::save`]
    path: PathBuf,
    /// Normalized key -> payload
    entries: IndexMap<String, Value>,
}

impl IndicesMapper {
    /// Opens the mapper at `path`, loading and decoding the file if it
    /// exists and starting empty otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read, is not a JSON
    /// object, or carries a malformed array directive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.is_file() {
            let entries = Self::load_entries(&path)?;
            tracing::info!(
                path = %path.display(),
                entries = entries.len(),
                "loaded mapper file"
            );
            entries
        } else {
            IndexMap::new()
        };

        Ok(Self { path, entries })
    }

    /// Returns the payload stored under `id`.
    ///
    /// Integer and string IDs observe identical lookup behavior: both
    /// normalize to the decimal string form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the normalized key is absent.
    pub fn get<K: Display>(&self, id: K) -> Result<&Value> {
        let key = id.to_string();
        self.entries
            .get(&key)
            .ok_or(Error::KeyNotFound(key))
    }

    /// Stores `value` under `id`, overwriting any previous payload.
    pub fn set<K: Display, V: Into<Value>>(&mut self, id: K, value: V) {
        self.entries.insert(id.to_string(), value.into());
    }

    /// Returns true if a payload is stored under `id`.
    #[must_use]
    pub fn contains<K: Display>(&self, id: K) -> bool {
        self.entries.contains_key(&id.to_string())
    }

    /// Number of stored payloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no payloads are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File path this mapper was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the whole mapping to the retained path.
    ///
    /// The parent directory is created if absent; an existing file is
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation, encoding, or the write
    /// fails. On error the previous on-disk state is assumed unmodified.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut root = serde_json::Map::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            root.insert(key.clone(), value.to_json()?);
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &JsonValue::Object(root))?;
        writer.flush()?;
        tracing::info!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "saved mapper file"
        );

        Ok(())
    }

    fn load_entries(path: &Path) -> Result<IndexMap<String, Value>> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let root: JsonValue = serde_json::from_reader(reader)?;

        let JsonValue::Object(object) = root else {
            return Err(Error::Serialization(
                "mapper file root must be a JSON object".to_string(),
            ));
        };

        let mut entries = IndexMap::with_capacity(object.len());
        for (key, json) in object {
            entries.insert(key, Value::from_json(&json)?);
        }
        Ok(entries)
    }
}
