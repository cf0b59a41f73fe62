//! Projection of records into generic or caller-defined shapes.
//!
//! Typed projection goes through `serde_json::Value`: each record becomes a
//! JSON object that serde decodes into the destination type, so field
//! renames, defaults and `Option` fields behave as they do for JSON input.

use literal_finder_core::{LiteralRecord, ProjectionError, ResultSet, ScalarValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Wraps records as a generic result set.
#[must_use]
pub fn project(records: Vec<LiteralRecord>) -> ResultSet {
    ResultSet::new(records)
}

/// Decodes every record of `set` into `T`.
///
/// Missing fields and kind mismatches are reported by serde. A record field
/// that `T` does not carry is an error too: the decoded value is serialized
/// again and its keys must cover the record's.
///
/// # Errors
///
/// Returns the first [`ProjectionError`], naming the offending record.
pub fn project_into<T>(set: &ResultSet) -> Result<Vec<T>, ProjectionError>
where
    T: DeserializeOwned + Serialize,
{
    set.iter()
        .enumerate()
        .map(|(index, record)| {
            let object = record_to_json(index, record)?;
            let value: T = serde_json::from_value(Value::Object(object))
                .map_err(|source| ProjectionError::Decode { index, source })?;
            check_fields(index, record, &value)?;
            Ok(value)
        })
        .collect()
}

/// Converts typed values back to records.
///
/// `None` fields are left out. Values must serialize to flat objects of
/// scalars.
///
/// # Errors
///
/// Returns a [`ProjectionError`] for values that are not structs, fields that
/// are not scalars, or unsigned integers beyond `i64`.
pub fn to_records<T: Serialize>(values: &[T]) -> Result<ResultSet, ProjectionError> {
    let records = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let json = serde_json::to_value(value)
                .map_err(|source| ProjectionError::Encode { index, source })?;
            let Value::Object(object) = json else {
                return Err(ProjectionError::NotARecord {
                    index,
                    kind: json_kind(&json),
                });
            };
            let mut record = LiteralRecord::new();
            for (field, value) in object {
                if let Some(scalar) = json_to_scalar(index, &field, &value)? {
                    record.insert(field, scalar);
                }
            }
            Ok(record)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResultSet::new(records))
}

fn record_to_json(
    index: usize,
    record: &LiteralRecord,
) -> Result<Map<String, Value>, ProjectionError> {
    record
        .iter()
        .map(|(field, value)| {
            let json = match value {
                ScalarValue::Boolean(b) => Value::Bool(*b),
                ScalarValue::String(s) => Value::String(s.clone()),
                ScalarValue::Integer(n) => Value::from(*n),
                ScalarValue::Float(f) => Number::from_f64(*f)
                    .map(Value::Number)
                    .ok_or_else(|| ProjectionError::NonFiniteFloat {
                        index,
                        field: field.clone(),
                    })?,
            };
            Ok((field.clone(), json))
        })
        .collect()
}

fn check_fields<T: Serialize>(
    index: usize,
    record: &LiteralRecord,
    value: &T,
) -> Result<(), ProjectionError> {
    let encoded =
        serde_json::to_value(value).map_err(|source| ProjectionError::Encode { index, source })?;
    let Value::Object(known) = encoded else {
        return Ok(());
    };
    match record.field_names().find(|field| !known.contains_key(*field)) {
        Some(field) => Err(ProjectionError::UnknownField {
            index,
            field: field.to_string(),
        }),
        None => Ok(()),
    }
}

fn json_to_scalar(
    index: usize,
    field: &str,
    value: &Value,
) -> Result<Option<ScalarValue>, ProjectionError> {
    let scalar = match value {
        Value::Null => return Ok(None),
        Value::Bool(b) => ScalarValue::Boolean(*b),
        Value::String(s) => ScalarValue::String(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ScalarValue::Integer(i)
            } else if n.is_u64() {
                return Err(ProjectionError::IntegerOutOfRange {
                    index,
                    field: field.to_string(),
                });
            } else {
                match n.as_f64() {
                    Some(f) => ScalarValue::Float(f),
                    None => {
                        return Err(ProjectionError::NonFiniteFloat {
                            index,
                            field: field.to_string(),
                        })
                    }
                }
            }
        }
        Value::Array(_) | Value::Object(_) => {
            return Err(ProjectionError::NonScalar {
                index,
                field: field.to_string(),
                kind: json_kind(value),
            })
        }
    };
    Ok(Some(scalar))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Endpoint {
        name: String,
        port: i64,
        tls: bool,
        #[serde(default)]
        weight: Option<f64>,
    }

    fn set(records: Vec<LiteralRecord>) -> ResultSet {
        project(records)
    }

    #[test]
    fn test_project_into_struct() {
        let records = set(vec![LiteralRecord::new()
            .with("name", "api")
            .with("port", 443_i64)
            .with("tls", true)]);
        let endpoints: Vec<Endpoint> = project_into(&records).unwrap();
        assert_eq!(
            endpoints,
            vec![Endpoint {
                name: "api".into(),
                port: 443,
                tls: true,
                weight: None,
            }]
        );
    }

    #[test]
    fn test_integer_widens_to_float() {
        let records = set(vec![LiteralRecord::new()
            .with("name", "api")
            .with("port", 1_i64)
            .with("tls", false)
            .with("weight", 2_i64)]);
        let endpoints: Vec<Endpoint> = project_into(&records).unwrap();
        assert_eq!(endpoints[0].weight, Some(2.0));
    }

    #[test]
    fn test_missing_field_names_record() {
        let records = set(vec![
            LiteralRecord::new()
                .with("name", "a")
                .with("port", 1_i64)
                .with("tls", true),
            LiteralRecord::new().with("name", "b"),
        ]);
        let err = project_into::<Endpoint>(&records).unwrap_err();
        assert!(matches!(err, ProjectionError::Decode { index: 1, .. }));
        assert!(err.to_string().contains("missing field `port`"));
    }

    #[test]
    fn test_kind_mismatch() {
        let records = set(vec![LiteralRecord::new()
            .with("name", "a")
            .with("port", "eighty")
            .with("tls", true)]);
        let err = project_into::<Endpoint>(&records).unwrap_err();
        assert!(matches!(err, ProjectionError::Decode { index: 0, .. }));
    }

    #[test]
    fn test_unknown_field() {
        let records = set(vec![LiteralRecord::new()
            .with("name", "a")
            .with("port", 1_i64)
            .with("tls", true)
            .with("retries", 3_i64)]);
        let err = project_into::<Endpoint>(&records).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"record 0: unknown field `retries`");
    }

    #[test]
    fn test_non_finite_float() {
        let records = set(vec![LiteralRecord::new().with("weight", f64::INFINITY)]);
        let err = project_into::<Endpoint>(&records).unwrap_err();
        assert!(matches!(err, ProjectionError::NonFiniteFloat { .. }));
    }

    #[test]
    fn test_to_records_skips_none() {
        let endpoints = vec![Endpoint {
            name: "db".into(),
            port: 5432,
            tls: false,
            weight: None,
        }];
        let records = to_records(&endpoints).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 3);
        assert_eq!(records[0]["port"], ScalarValue::Integer(5432));
    }

    #[test]
    fn test_to_records_rejects_nested_values() {
        #[derive(Serialize)]
        struct Nested {
            tags: Vec<String>,
        }
        let err = to_records(&[Nested { tags: vec![] }]).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"value 0: field `tags` is an array, expected a scalar");

        let err = to_records(&[1_u8]).unwrap_err();
        assert!(matches!(err, ProjectionError::NotARecord { kind: "a number", .. }));
    }

    #[test]
    fn test_to_records_rejects_large_unsigned() {
        #[derive(Serialize)]
        struct Big {
            n: u64,
        }
        let err = to_records(&[Big { n: u64::MAX }]).unwrap_err();
        assert!(matches!(err, ProjectionError::IntegerOutOfRange { .. }));
    }
}
