//! The addressable record type and its path operations.

use indexmap::IndexMap;

use crate::error::Error;
use crate::path;
use crate::value::Value;

/// Errors raised by record access and mutation.
#[derive(Debug, Clone)]
pub enum RecordError {
    /// Single-key access or removal on an absent key
    MissingKey(String),

    /// A sequence was indexed with a segment that is not an integer
    InvalidIndex(String),

    /// A sequence was indexed past its end during `set`
    IndexOutOfRange { index: i64, len: usize },

    /// A path descended through a scalar value during `set`
    NotTraversable { segment: String, kind: &'static str },

    /// A conversion expected a mapping at the top level
    NotARecord(&'static str),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::MissingKey(key) => write!(f, "Missing key: '{}'", key),
            RecordError::InvalidIndex(segment) => {
                write!(f, "Invalid index: '{}' is not an integer", segment)
            }
            RecordError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range for sequence of length {}", index, len)
            }
            RecordError::NotTraversable { segment, kind } => {
                write!(f, "Cannot descend through {} at segment '{}'", kind, segment)
            }
            RecordError::NotARecord(kind) => write!(f, "Expected a record, found {}", kind),
        }
    }
}

impl std::error::Error for RecordError {}

/// An ordered mapping from string keys to [`Value`]s, addressable by path.
///
/// Records keep insertion order and support the dotted/bracketed path
/// notation of [`path::split`] for reading and writing nested values.
/// `get` never fails: missing or structurally invalid read paths resolve
/// to `None`. `set` creates intermediate records for missing mapping
/// segments but treats bad sequence indexing as a fatal error, since
/// write paths are under the caller's control.
///
/// # Examples
///
/// ```
/// use sylva::{Record, Value};
/// use serde_json::json;
///
/// let mut record = Record::try_from(json!({"a": {"one": "1"}})).unwrap();
/// assert_eq!(record.get("a.one"), Some(Value::String("1".to_string())));
///
/// record.set("a.two", Value::Integer(2)).unwrap();
/// assert_eq!(record.get("a[two]"), Some(Value::Integer(2)));
/// assert_eq!(record.get("a.three"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    entries: IndexMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is present at the top level.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The value at a single top-level key.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Mutable access to the value at a single top-level key.
    pub fn get_key_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// The value at a single top-level key, failing when absent.
    pub fn require(&self, key: &str) -> Result<&Value, RecordError> {
        self.entries
            .get(key)
            .ok_or_else(|| RecordError::MissingKey(key.to_string()))
    }

    /// Insert or replace the value at a single top-level key.
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Remove a single top-level key, failing when absent.
    ///
    /// The order of the remaining keys is preserved.
    pub fn remove(&mut self, key: &str) -> Result<Value, RecordError> {
        self.entries
            .shift_remove(key)
            .ok_or_else(|| RecordError::MissingKey(key.to_string()))
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.entries.keys()
    }

    /// Iterate over values in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.entries.values()
    }

    // ========================================================================
    // Path operations
    // ========================================================================

    /// Resolve a dotted/bracketed path against this record.
    ///
    /// Returns `None` for any missing or structurally invalid path. When a
    /// path meets a sequence and the following segment is an integer, it
    /// indexes into the sequence (negative indices count from the end).
    /// When the following segment is not an integer, the remaining path is
    /// projected across every element instead:
    ///
    /// ```
    /// use sylva::{Record, Value};
    /// use serde_json::json;
    ///
    /// let record = Record::try_from(json!({"a": [{"one": 1}, {"one": 2}, 3]})).unwrap();
    /// assert_eq!(
    ///     record.get("a.one"),
    ///     Some(Value::List(vec![
    ///         Value::Integer(1),
    ///         Value::Integer(2),
    ///         Value::Null,
    ///     ]))
    /// );
    /// ```
    pub fn get(&self, path: &str) -> Option<Value> {
        self.get_path(&path::split(path))
    }

    /// Resolve a pre-split path against this record.
    ///
    /// The list form bypasses [`path::split`], so segments may contain
    /// characters the textual notation reserves.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<Value> {
        match path {
            [] => None,
            [key] => self.entries.get(key.as_ref()).cloned(),
            [key, rest @ ..] => match self.entries.get(key.as_ref())? {
                Value::Record(child) => child.get_path(rest),
                Value::List(items) => match rest[0].as_ref().parse::<i64>() {
                    Ok(idx) => {
                        let element = items.get(path::resolve_index(idx, items.len())?)?;
                        if rest.len() == 1 {
                            Some(element.clone())
                        } else if let Value::Record(child) = element {
                            child.get_path(&rest[1..])
                        } else {
                            None
                        }
                    }
                    // Non-integer segment: project the remaining path
                    // across every element of the sequence.
                    Err(_) => Some(Value::List(
                        items
                            .iter()
                            .map(|element| match element {
                                Value::Record(child) => {
                                    child.get_path(rest).unwrap_or(Value::Null)
                                }
                                _ => Value::Null,
                            })
                            .collect(),
                    )),
                },
                _ => None,
            },
        }
    }

    /// Write `value` at a dotted/bracketed path.
    ///
    /// Missing mapping segments along the way are created as empty
    /// records. Sequence elements are never created: indexing a sequence
    /// with a non-integer segment, indexing past its end, or descending
    /// through an existing scalar is a [`RecordError`].
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), RecordError> {
        self.set_path(&path::split(path), value)
    }

    /// Write `value` at a pre-split path. See [`Record::set`].
    pub fn set_path<S: AsRef<str>>(&mut self, path: &[S], value: Value) -> Result<(), RecordError> {
        match path {
            [] => Ok(()),
            [key] => {
                self.entries.insert(key.as_ref().to_string(), value);
                Ok(())
            }
            [key, rest @ ..] => {
                let child = self
                    .entries
                    .entry(key.as_ref().to_string())
                    .or_insert_with(|| Value::Record(Record::new()));
                match child {
                    Value::Record(rec) => rec.set_path(rest, value),
                    Value::List(items) => set_in_list(items, rest, value),
                    other => Err(RecordError::NotTraversable {
                        segment: key.as_ref().to_string(),
                        kind: other.type_name(),
                    }),
                }
            }
        }
    }

    /// Merge `other` into this record.
    ///
    /// Per key in `other`: absent keys are set directly; two records merge
    /// recursively; two sequences concatenate (duplicates retained);
    /// anything else overwrites this record's value.
    pub fn merge(&mut self, other: Record) {
        for (key, value) in other.entries {
            match self.entries.get_mut(&key) {
                Some(existing) => match (existing, value) {
                    (Value::Record(mine), Value::Record(theirs)) => mine.merge(theirs),
                    (Value::List(mine), Value::List(theirs)) => mine.extend(theirs),
                    (slot, theirs) => *slot = theirs,
                },
                None => {
                    self.entries.insert(key, value);
                }
            }
        }
    }
}

fn set_in_list<S: AsRef<str>>(
    items: &mut [Value],
    path: &[S],
    value: Value,
) -> Result<(), RecordError> {
    let segment = match path.first() {
        Some(s) => s.as_ref(),
        None => return Ok(()),
    };
    let idx: i64 = segment
        .parse()
        .map_err(|_| RecordError::InvalidIndex(segment.to_string()))?;
    let index = path::resolve_index(idx, items.len()).ok_or(RecordError::IndexOutOfRange {
        index: idx,
        len: items.len(),
    })?;
    if path.len() == 1 {
        items[index] = value;
        return Ok(());
    }
    match &mut items[index] {
        Value::Record(rec) => rec.set_path(&path[1..], value),
        Value::List(inner) => set_in_list(inner, &path[1..], value),
        other => Err(RecordError::NotTraversable {
            segment: segment.to_string(),
            kind: other.type_name(),
        }),
    }
}

impl std::fmt::Display for Record {
    /// Pretty-printed JSON, indent 2.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::Value::from(Value::Record(self.clone()));
        let rendered = serde_json::to_string_pretty(&json).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", rendered)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Record {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, Value)> for Record {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.entries.extend(iter)
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<IndexMap<String, Value>> for Record {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Record { entries }
    }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = RecordError;

    /// Convert a JSON document into a record.
    ///
    /// Nested objects are coerced into records at every level, including
    /// objects inside arrays. Fails when the top level is not an object.
    fn try_from(v: serde_json::Value) -> Result<Self, Self::Error> {
        match Value::from(v) {
            Value::Record(rec) => Ok(rec),
            other => Err(RecordError::NotARecord(other.type_name())),
        }
    }
}

/// Items a record stream can yield.
///
/// Lets the stream adapters consume plain records, borrowed records, and
/// the `Result` items produced by readers through one interface.
pub trait RecordItem {
    fn into_record(self) -> Result<Record, Error>;
}

impl RecordItem for Record {
    fn into_record(self) -> Result<Record, Error> {
        Ok(self)
    }
}

impl RecordItem for &Record {
    fn into_record(self) -> Result<Record, Error> {
        Ok(self.clone())
    }
}

impl RecordItem for Result<Record, Error> {
    fn into_record(self) -> Result<Record, Error> {
        self
    }
}
