//! Tagged value tree for parsed documents.
//!
//! [`Value`] is a closed sum over the seven document kinds. Objects are
//! backed by a `BTreeMap`, so keys iterate in lexicographic order rather than
//! in the order they appeared in the source text.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::slice;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use thiserror::Error;

/// Object storage: unique keys in lexicographic order.
pub type Map = BTreeMap<String, Value>;

/// Errors raised when a value is accessed as the wrong shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("key not found: \"{0}\"")]
    KeyNotFound(String),

    #[error("index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{0} value is not iterable")]
    NotIterable(&'static str),
}

/// A document value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    /// Name of this value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    fn mismatch(&self, expected: &'static str) -> ValueError {
        ValueError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    // ------------------------------------------------------------------
    // Indexing
    // ------------------------------------------------------------------

    /// Look up `key` in an object.
    pub fn get(&self, key: &str) -> Result<&Value, ValueError> {
        self.as_object()?
            .get(key)
            .ok_or_else(|| ValueError::KeyNotFound(key.to_string()))
    }

    /// Look up `key` in an object, treating an absent key as `None`.
    ///
    /// Still fails with `TypeMismatch` when `self` is not an object.
    pub fn find(&self, key: &str) -> Result<Option<&Value>, ValueError> {
        Ok(self.as_object()?.get(key))
    }

    /// True when `self` is an object holding `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        match self {
            Value::Object(map) => map.contains_key(key),
            _ => false,
        }
    }

    /// Element `index` of an array.
    pub fn at(&self, index: usize) -> Result<&Value, ValueError> {
        let items = self.as_array()?;
        items.get(index).ok_or(ValueError::IndexOutOfRange {
            index,
            len: items.len(),
        })
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut Value, ValueError> {
        match self {
            Value::Object(map) => map
                .get_mut(key)
                .ok_or_else(|| ValueError::KeyNotFound(key.to_string())),
            other => Err(other.mismatch("object")),
        }
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut Value, ValueError> {
        match self {
            Value::Array(items) => {
                let len = items.len();
                items
                    .get_mut(index)
                    .ok_or(ValueError::IndexOutOfRange { index, len })
            }
            other => Err(other.mismatch("array")),
        }
    }

    /// Insert or replace `key` in an object, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, ValueError> {
        match self {
            Value::Object(map) => Ok(map.insert(key.into(), value.into())),
            other => Err(other.mismatch("object")),
        }
    }

    /// Number of elements in an array or entries in an object.
    pub fn len(&self) -> Result<usize, ValueError> {
        match self {
            Value::Array(items) => Ok(items.len()),
            Value::Object(map) => Ok(map.len()),
            other => Err(ValueError::NotIterable(other.kind())),
        }
    }

    pub fn is_empty(&self) -> Result<bool, ValueError> {
        self.len().map(|n| n == 0)
    }

    // ------------------------------------------------------------------
    // Coercions
    // ------------------------------------------------------------------

    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn as_i64(&self) -> Result<i64, ValueError> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.mismatch("int")),
        }
    }

    /// Non-negative integer, e.g. an index or a count.
    pub fn as_usize(&self) -> Result<usize, ValueError> {
        match self {
            Value::Int(i) => usize::try_from(*i).map_err(|_| self.mismatch("unsigned int")),
            other => Err(other.mismatch("unsigned int")),
        }
    }

    /// Floating-point value. Integers widen, since documents write `1` for `1.0`.
    pub fn as_f64(&self) -> Result<f64, ValueError> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            other => Err(other.mismatch("number")),
        }
    }

    pub fn as_f32(&self) -> Result<f32, ValueError> {
        self.as_f64().map(|f| f as f32)
    }

    pub fn as_str(&self) -> Result<&str, ValueError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn as_array(&self) -> Result<&[Value], ValueError> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(other.mismatch("array")),
        }
    }

    pub fn as_object(&self) -> Result<&Map, ValueError> {
        match self {
            Value::Object(map) => Ok(map),
            other => Err(other.mismatch("object")),
        }
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Iterate the elements of an array or the values of an object.
    ///
    /// Object entries come out in key order and carry their key; array
    /// entries carry `None`. Scalars fail with `NotIterable`.
    pub fn iter(&self) -> Result<Iter<'_>, ValueError> {
        match self {
            Value::Array(items) => Ok(Iter::Array(items.iter())),
            Value::Object(map) => Ok(Iter::Object(map.iter())),
            other => Err(ValueError::NotIterable(other.kind())),
        }
    }
}

/// One element produced by [`Iter`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entry<'a> {
    pub key: Option<&'a str>,
    pub value: &'a Value,
}

/// Cursor over an array or an object.
#[derive(Clone, Debug)]
pub enum Iter<'a> {
    Array(slice::Iter<'a, Value>),
    Object(btree_map::Iter<'a, String, Value>),
}

impl<'a> Iterator for Iter<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Iter::Array(it) => it.next().map(|value| Entry { key: None, value }),
            Iter::Object(it) => it.next().map(|(key, value)| Entry {
                key: Some(key.as_str()),
                value,
            }),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Iter::Array(it) => it.size_hint(),
            Iter::Object(it) => it.size_hint(),
        }
    }
}

impl ExactSizeIterator for Iter<'_> {}

// ----------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl fmt::Display for Value {
    /// Compact document text; see [`crate::document::to_string`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        super::writer::write_compact(f, self)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}
