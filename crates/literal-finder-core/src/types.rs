//! Core types for finding results.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A scalar value decoded from a literal token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// `true` or `false`.
    Boolean(bool),
    /// String literal contents, quotes stripped and escapes left as written.
    String(String),
    /// Integer literal that fits in 64 signed bits.
    Integer(i64),
    /// Floating point literal.
    Float(f64),
}

impl ScalarValue {
    /// Returns the name of this value's kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
        }
    }

    /// Returns the boolean value, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string value, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this is one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float value, if this is one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Field values extracted from one struct literal.
///
/// Keys are unique. Inserting an existing key replaces its value, so a literal
/// that names a field twice keeps the last one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiteralRecord {
    fields: BTreeMap<String, ScalarValue>,
}

impl LiteralRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the value it replaced.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<ScalarValue>,
    ) -> Option<ScalarValue> {
        self.fields.insert(field.into(), value.into())
    }

    /// Sets a field and returns the record, for building records inline.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Gets a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&ScalarValue> {
        self.fields.get(field)
    }

    /// Returns true if the record has the field.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the literal had no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ScalarValue> {
        self.fields.iter()
    }

    /// Iterates field names in name order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl std::ops::Index<&str> for LiteralRecord {
    type Output = ScalarValue;

    fn index(&self, field: &str) -> &ScalarValue {
        &self.fields[field]
    }
}

impl<'a> IntoIterator for &'a LiteralRecord {
    type Item = (&'a String, &'a ScalarValue);
    type IntoIter = btree_map::Iter<'a, String, ScalarValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl<K: Into<String>, V: Into<ScalarValue>> FromIterator<(K, V)> for LiteralRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Ordered records produced by one finding pass.
///
/// A result set is built once and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<LiteralRecord>,
}

impl ResultSet {
    /// Wraps records in the order given.
    #[must_use]
    pub fn new(records: Vec<LiteralRecord>) -> Self {
        Self { records }
    }

    /// Returns the records as a slice.
    #[must_use]
    pub fn records(&self) -> &[LiteralRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no literal was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Gets a record by position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LiteralRecord> {
        self.records.get(index)
    }

    /// Iterates records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, LiteralRecord> {
        self.records.iter()
    }

    /// Consumes the set and returns its records.
    #[must_use]
    pub fn into_records(self) -> Vec<LiteralRecord> {
        self.records
    }
}

impl std::ops::Index<usize> for ResultSet {
    type Output = LiteralRecord;

    fn index(&self, index: usize) -> &LiteralRecord {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a LiteralRecord;
    type IntoIter = std::slice::Iter<'a, LiteralRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = LiteralRecord;
    type IntoIter = std::vec::IntoIter<LiteralRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File name as given when the source was added.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a new location from span information.
    #[must_use]
    pub fn from_span(file: &Path, span: proc_macro2::Span) -> Self {
        let start = span.start();
        Self {
            file: file.to_path_buf(),
            line: start.line,
            column: start.column + 1,
        }
    }

    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Fully qualified path of the struct type being searched for.
///
/// The first segment is the crate root name (`crate` unless configured
/// otherwise), e.g. `crate::config::Config`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetTypeRef(String);

impl TargetTypeRef {
    /// Validates and wraps a qualified type path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTarget`] if the path is empty or has an
    /// empty or non-identifier segment.
    pub fn new(path: impl Into<String>) -> Result<Self, ConfigError> {
        let path = path.into();
        let trimmed = path.trim();
        let valid = !trimmed.is_empty()
            && trimmed.split("::").all(|segment| {
                let mut chars = segment.chars();
                chars
                    .next()
                    .is_some_and(|c| c == '_' || c.is_alphabetic())
                    && chars.all(|c| c == '_' || c.is_alphanumeric())
            });
        if !valid {
            return Err(ConfigError::InvalidTarget { target: path });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the qualified path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the type name (last segment).
    #[must_use]
    pub fn type_name(&self) -> &str {
        crate::utils::paths::last_segment(&self.0)
    }

    /// Returns true if `qualified` names exactly this type.
    #[must_use]
    pub fn matches(&self, qualified: &str) -> bool {
        self.0 == qualified
    }
}

impl std::fmt::Display for TargetTypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TargetTypeRef {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TargetTypeRef> for String {
    fn from(value: TargetTypeRef) -> Self {
        value.0
    }
}

impl std::str::FromStr for TargetTypeRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
