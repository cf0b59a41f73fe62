//! Error taxonomy for finding passes.

use crate::config::ConfigError;
use crate::types::Location;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a finding pass.
///
/// A pass either returns a complete result or exactly one of these.
#[derive(Debug, Error, Diagnostic)]
pub enum FindError {
    /// IO error reading a source file.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(literal_finder::io))]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Malformed source text.
    #[error("{location}: syntax error: {message}")]
    #[diagnostic(code(literal_finder::syntax))]
    Syntax {
        /// Where the parser gave up.
        location: Location,
        /// Parser message.
        message: String,
    },

    /// Semantic error anywhere in the analyzed sources.
    #[error("{location}: type resolution failed: {message}")]
    #[diagnostic(
        code(literal_finder::type_resolution),
        help("literals are only extracted from sources that resolve cleanly")
    )]
    TypeResolution {
        /// Offending expression or item.
        location: Location,
        /// What could not be resolved.
        message: String,
    },

    /// A matched literal initializes a field by position.
    #[error("{location}: literal of `{type_name}` must use keyed fields (`name: value`)")]
    #[diagnostic(
        code(literal_finder::unkeyed_field),
        help("positional literals silently change meaning when fields are reordered")
    )]
    UnkeyedField {
        /// Positional element.
        location: Location,
        /// Qualified name of the matched type.
        type_name: String,
    },

    /// A matched literal uses a key that is not a bare identifier.
    #[error("{location}: unsupported key `{key}` in literal of `{type_name}`")]
    #[diagnostic(code(literal_finder::unsupported_key))]
    UnsupportedKey {
        /// Offending key.
        location: Location,
        /// Key as written.
        key: String,
        /// Qualified name of the matched type.
        type_name: String,
    },

    /// A field value is not a boolean, string, integer or float literal.
    #[error("{location}: field `{field}` of `{type_name}` is not a scalar literal: found {shape}")]
    #[diagnostic(
        code(literal_finder::unsupported_value),
        help("write the value as a literal so the extracted record equals the source")
    )]
    UnsupportedValue {
        /// Offending value expression.
        location: Location,
        /// Field name (`..` for a struct update base).
        field: String,
        /// Qualified name of the matched type.
        type_name: String,
        /// Description of the expression that was found.
        shape: String,
    },

    /// Records could not be converted to the requested type.
    #[error(transparent)]
    #[diagnostic(code(literal_finder::projection))]
    Projection(#[from] ProjectionError),

    /// Invalid finder configuration.
    #[error(transparent)]
    #[diagnostic(code(literal_finder::config))]
    Config(#[from] ConfigError),
}

impl FindError {
    /// Returns the source location for position-aware errors.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Syntax { location, .. }
            | Self::TypeResolution { location, .. }
            | Self::UnkeyedField { location, .. }
            | Self::UnsupportedKey { location, .. }
            | Self::UnsupportedValue { location, .. } => Some(location),
            Self::Io { .. } | Self::Projection(_) | Self::Config(_) => None,
        }
    }
}

/// Errors converting between records and typed values.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// serde rejected a record for the destination type.
    #[error("record {index}: {source}")]
    Decode {
        /// Position of the record in the result set.
        index: usize,
        /// Underlying serde error.
        source: serde_json::Error,
    },

    /// A record has a field the destination type does not declare.
    #[error("record {index}: unknown field `{field}`")]
    UnknownField {
        /// Position of the record in the result set.
        index: usize,
        /// Field with no destination.
        field: String,
    },

    /// A float that JSON cannot carry (infinite or NaN).
    #[error("record {index}: field `{field}` is not a finite float")]
    NonFiniteFloat {
        /// Position of the record in the result set.
        index: usize,
        /// Offending field.
        field: String,
    },

    /// A typed value did not serialize to a flat object.
    #[error("value {index} is {kind}, expected a struct")]
    NotARecord {
        /// Position of the value.
        index: usize,
        /// JSON kind that was produced instead.
        kind: &'static str,
    },

    /// A typed value has a field that is not a scalar.
    #[error("value {index}: field `{field}` is {kind}, expected a scalar")]
    NonScalar {
        /// Position of the value.
        index: usize,
        /// Offending field.
        field: String,
        /// JSON kind that was produced.
        kind: &'static str,
    },

    /// An unsigned integer above `i64::MAX`.
    #[error("value {index}: field `{field}` does not fit in i64")]
    IntegerOutOfRange {
        /// Position of the value.
        index: usize,
        /// Offending field.
        field: String,
    },

    /// A typed value could not be serialized at all.
    #[error("value {index}: {source}")]
    Encode {
        /// Position of the value.
        index: usize,
        /// Underlying serde error.
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unkeyed_field_message() {
        let err = FindError::UnkeyedField {
            location: Location::new("src/lib.rs", 4, 17),
            type_name: "crate::Foo".to_string(),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"src/lib.rs:4:17: literal of `crate::Foo` must use keyed fields (`name: value`)"
        );
    }

    #[test]
    fn unsupported_value_message() {
        let err = FindError::UnsupportedValue {
            location: Location::new("lib.rs", 2, 30),
            field: "bar".to_string(),
            type_name: "crate::Foo".to_string(),
            shape: "path expression `some_var`".to_string(),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"lib.rs:2:30: field `bar` of `crate::Foo` is not a scalar literal: found path expression `some_var`"
        );
    }

    #[test]
    fn location_is_reported_per_occurrence() {
        let first = FindError::UnkeyedField {
            location: Location::new("a.rs", 1, 1),
            type_name: "crate::Foo".to_string(),
        };
        let second = FindError::UnkeyedField {
            location: Location::new("b.rs", 9, 5),
            type_name: "crate::Foo".to_string(),
        };
        assert_ne!(first.location(), second.location());
    }

    #[test]
    fn projection_error_converts() {
        let err: FindError = ProjectionError::UnknownField {
            index: 0,
            field: "extra".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "record 0: unknown field `extra`");
        assert!(err.location().is_none());
    }
}
