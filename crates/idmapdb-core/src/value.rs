//! Payload values and the tagged array JSON codec.
//!
//! JSON has no native multi-dimensional array type, so numeric arrays are
//! persisted as tagged objects whose nesting depth equals the array shape:
//!
//! ```json
//! {"__type__": "numpy_array", "__value__": [[1.0, 2.0], [3.0, 4.0]]}
//! ```
//!
//! Decoding is a single recursive pass over the parsed JSON tree: any
//! object carrying exactly the two keys above is an array reconstruction
//! directive; every other object decodes literally. The round-trip law
//! `Value::from_json(&v.to_json()?)? == v` holds for every value, shape
//! included.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

/// Tag key marking an encoded array object.
const TAG_KEY: &str = "__type__";

/// Content key carrying the nested-list representation.
const VALUE_KEY: &str = "__value__";

/// Tag value identifying a numeric array.
const ARRAY_TAG: &str = "numpy_array";

/// Fixed-shape numeric array payload.
///
/// Elements are stored row-major in a flat `f64` buffer; the shape is kept
/// separately so a `(3, 4)` array reloads as `(3, 4)`, never `(12,)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    /// Dimension sizes, outermost first
    shape: Vec<usize>,
    /// Row-major element buffer, `shape.iter().product()` long
    data: Vec<f64>,
}

impl NdArray {
    /// Creates an array from a shape and a row-major element buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the shape is empty or its
    /// element count does not match the buffer length.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        if shape.is_empty() {
            return Err(Error::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(Error::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Creates a one-dimensional array from a flat buffer.
    #[must_use]
    pub fn from_flat(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Dimension sizes, outermost first.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Row-major element buffer.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Total element count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the array holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the element at a full multi-dimensional index, or `None` if
    /// the index rank or any coordinate is out of range.
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (&coord, &size) in index.iter().zip(&self.shape) {
            if coord >= size {
                return None;
            }
            flat = flat * size + coord;
        }
        self.data.get(flat).copied()
    }

    /// Renders the nested-list JSON representation.
    fn to_nested_json(&self) -> Result<JsonValue> {
        fn nest(shape: &[usize], data: &[f64]) -> Result<JsonValue> {
            match shape {
                [] => unreachable!("constructor rejects rank-0 arrays"),
                [_] => data
                    .iter()
                    .map(|&v| finite_number(v))
                    .collect::<Result<_>>()
                    .map(JsonValue::Array),
                [_, rest @ ..] => {
                    let stride: usize = rest.iter().product();
                    data.chunks(stride)
                        .map(|chunk| nest(rest, chunk))
                        .collect::<Result<_>>()
                        .map(JsonValue::Array)
                }
            }
        }
        nest(&self.shape, &self.data)
    }

    /// Rebuilds an array from a nested-list JSON representation.
    ///
    /// The nesting must be rectangular and every leaf numeric; anything
    /// else makes the directive unsatisfiable.
    fn from_nested_json(json: &JsonValue) -> Result<Self> {
        fn collect(
            json: &JsonValue,
            depth: usize,
            shape: &mut Vec<usize>,
            data: &mut Vec<f64>,
        ) -> Result<()> {
            match json {
                JsonValue::Array(items) => {
                    if depth == shape.len() {
                        if !data.is_empty() {
                            return Err(ragged());
                        }
                        shape.push(items.len());
                    } else if shape[depth] != items.len() {
                        return Err(ragged());
                    }
                    for item in items {
                        collect(item, depth + 1, shape, data)?;
                    }
                    Ok(())
                }
                JsonValue::Number(n) => {
                    if depth != shape.len() {
                        return Err(ragged());
                    }
                    data.push(n.as_f64().ok_or_else(|| {
                        Error::Serialization(format!("array leaf {n} is not representable as f64"))
                    })?);
                    Ok(())
                }
                other => Err(Error::Serialization(format!(
                    "array leaf must be a number, got {other}"
                ))),
            }
        }

        fn ragged() -> Error {
            Error::Serialization("tagged array value is not a rectangular nested list".to_string())
        }

        if !json.is_array() {
            return Err(Error::Serialization(
                "tagged array value must be a nested list".to_string(),
            ));
        }
        let mut shape = Vec::new();
        let mut data = Vec::new();
        collect(json, 0, &mut shape, &mut data)?;
        Self::new(shape, data)
    }
}

/// A payload value stored in the mapper.
///
/// Dynamic payloads are modeled as a closed set of variants rather than
/// runtime type inspection; arrays carry their shape so they survive a
/// save/load cycle exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Native integer.
    Int(i64),
    /// Native float.
    Float(f64),
    /// Text.
    Text(String),
    /// Fixed-shape numeric array, encoded with the tagged scheme.
    Array(NdArray),
    /// Plain JSON list of values.
    Sequence(Vec<Value>),
    /// Plain JSON object of values, insertion order preserved.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Encodes the value into its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if a float is non-finite (JSON has
    /// no representation for NaN or infinities).
    pub fn to_json(&self) -> Result<JsonValue> {
        match self {
            Self::Null => Ok(JsonValue::Null),
            Self::Bool(b) => Ok(JsonValue::Bool(*b)),
            Self::Int(i) => Ok(JsonValue::Number(Number::from(*i))),
            Self::Float(f) => finite_number(*f),
            Self::Text(s) => Ok(JsonValue::String(s.clone())),
            Self::Array(array) => {
                let mut tagged = JsonMap::with_capacity(2);
                tagged.insert(TAG_KEY.to_string(), JsonValue::String(ARRAY_TAG.to_string()));
                tagged.insert(VALUE_KEY.to_string(), array.to_nested_json()?);
                Ok(JsonValue::Object(tagged))
            }
            Self::Sequence(items) => items
                .iter()
                .map(Self::to_json)
                .collect::<Result<_>>()
                .map(JsonValue::Array),
            Self::Map(entries) => {
                let mut object = JsonMap::with_capacity(entries.len());
                for (key, value) in entries {
                    object.insert(key.clone(), value.to_json()?);
                }
                Ok(JsonValue::Object(object))
            }
        }
    }

    /// Decodes a parsed JSON tree into a value, interpreting tagged array
    /// objects.
    ///
    /// An object with exactly the keys `__type__: "numpy_array"` and
    /// `__value__` is an array reconstruction directive; all other objects
    /// decode literally. Integral JSON numbers decode as [`Value::Int`],
    /// the rest as [`Value::Float`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if an array directive carries a
    /// ragged or non-numeric nested list.
    pub fn from_json(json: &JsonValue) -> Result<Self> {
        match json {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(b) => Ok(Self::Bool(*b)),
            JsonValue::Number(n) => Ok(decode_number(n)),
            JsonValue::String(s) => Ok(Self::Text(s.clone())),
            JsonValue::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<_>>()
                .map(Self::Sequence),
            JsonValue::Object(object) => {
                if let Some(nested) = array_directive(object) {
                    return NdArray::from_nested_json(nested).map(Self::Array);
                }
                let mut entries = IndexMap::with_capacity(object.len());
                for (key, value) in object {
                    entries.insert(key.clone(), Self::from_json(value)?);
                }
                Ok(Self::Map(entries))
            }
        }
    }

    /// Returns the integer content, if this is a [`Value::Int`].
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float content of a [`Value::Int`] or [`Value::Float`].
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the text content, if this is a [`Value::Text`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the array content, if this is a [`Value::Array`].
    #[must_use]
    pub fn as_array(&self) -> Option<&NdArray> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }
}

/// Matches the exact tag-and-value-key shape of an encoded array.
///
/// Objects with extra keys, or a different tag, are plain data.
fn array_directive(object: &JsonMap<String, JsonValue>) -> Option<&JsonValue> {
    if object.len() != 2 {
        return None;
    }
    match object.get(TAG_KEY) {
        Some(JsonValue::String(tag)) if tag == ARRAY_TAG => object.get(VALUE_KEY),
        _ => None,
    }
}

fn decode_number(n: &Number) -> Value {
    n.as_i64()
        .map_or_else(|| Value::Float(n.as_f64().unwrap_or_default()), Value::Int)
}

fn finite_number(f: f64) -> Result<JsonValue> {
    Number::from_f64(f)
        .map(JsonValue::Number)
        .ok_or_else(|| Error::Serialization(format!("non-finite float {f} has no JSON form")))
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<NdArray> for Value {
    fn from(v: NdArray) -> Self {
        Self::Array(v)
    }
}
