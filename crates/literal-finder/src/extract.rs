//! Field extraction from matched struct literals.

use crate::decode::decode;
use literal_finder_core::utils::unraw;
use literal_finder_core::{FindError, LiteralRecord, Location};
use quote::ToTokens;
use std::path::Path;
use syn::spanned::Spanned;
use syn::{ExprStruct, Member};

/// Extracts the keyed fields of a struct literal into a record.
///
/// Keys are field names with raw identifiers unescaped (`r#type` becomes
/// `type`). A field named twice keeps its last value.
///
/// # Errors
///
/// - [`FindError::UnkeyedField`] for a positional member (`Foo { 0: x }`)
/// - [`FindError::UnsupportedKey`] for a field carrying attributes, whose
///   presence depends on configuration
/// - [`FindError::UnsupportedValue`] for shorthand fields (`Foo { bar }`),
///   a struct update base (`..base`) or a value that is not a scalar literal
pub fn extract(
    literal: &ExprStruct,
    type_name: &str,
    file: &Path,
) -> Result<LiteralRecord, FindError> {
    let mut record = LiteralRecord::new();

    for field in &literal.fields {
        let key = match &field.member {
            Member::Named(ident) => unraw(ident),
            Member::Unnamed(index) => {
                return Err(FindError::UnkeyedField {
                    location: Location::from_span(file, index.span),
                    type_name: type_name.to_string(),
                });
            }
        };

        if !field.attrs.is_empty() {
            let attrs: Vec<String> = field
                .attrs
                .iter()
                .map(|attr| attr.to_token_stream().to_string())
                .collect();
            return Err(FindError::UnsupportedKey {
                location: Location::from_span(file, field.span()),
                key: format!("{} {key}", attrs.join(" ")),
                type_name: type_name.to_string(),
            });
        }

        if field.colon_token.is_none() {
            return Err(FindError::UnsupportedValue {
                location: Location::from_span(file, field.member.span()),
                field: key.clone(),
                type_name: type_name.to_string(),
                shape: format!("field init shorthand `{key}`"),
            });
        }

        let value = decode(&field.expr).map_err(|unsupported| FindError::UnsupportedValue {
            location: Location::from_span(file, unsupported.span),
            field: key.clone(),
            type_name: type_name.to_string(),
            shape: unsupported.shape,
        })?;
        record.insert(key, value);
    }

    if let Some(dot2) = &literal.dot2_token {
        let (span, shape) = match &literal.rest {
            Some(rest) => (
                rest.span(),
                format!("struct update base `{}`", rest.to_token_stream()),
            ),
            None => (dot2.span(), "default field values `..`".to_string()),
        };
        return Err(FindError::UnsupportedValue {
            location: Location::from_span(file, span),
            field: "..".to_string(),
            type_name: type_name.to_string(),
            shape,
        });
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use literal_finder_core::ScalarValue;

    fn run(code: &str) -> Result<LiteralRecord, FindError> {
        let literal: ExprStruct = syn::parse_str(code).unwrap();
        extract(&literal, "crate::Foo", Path::new("lib.rs"))
    }

    #[test]
    fn test_keyed_fields() {
        let record = run(r#"Foo { name: "api", port: 8080, tls: true, ratio: 0.5 }"#).unwrap();
        assert_eq!(record.len(), 4);
        assert_eq!(record["name"], ScalarValue::from("api"));
        assert_eq!(record["port"], ScalarValue::Integer(8080));
        assert_eq!(record["tls"], ScalarValue::Boolean(true));
        assert_eq!(record["ratio"], ScalarValue::Float(0.5));
    }

    #[test]
    fn test_empty_literal() {
        assert!(run("Foo {}").unwrap().is_empty());
    }

    #[test]
    fn test_raw_identifier_keys() {
        let record = run(r#"Foo { r#type: "tcp" }"#).unwrap();
        assert_eq!(record.get("type"), Some(&ScalarValue::from("tcp")));
    }

    #[test]
    fn test_duplicate_keys_keep_last() {
        let record = run("Foo { a: 1, a: 2 }").unwrap();
        assert_eq!(record["a"], ScalarValue::Integer(2));
    }

    #[test]
    fn test_positional_member() {
        let err = run(r#"Foo { 0: "one" }"#).unwrap_err();
        assert!(matches!(err, FindError::UnkeyedField { .. }));
    }

    #[test]
    fn test_shorthand_field() {
        let err = run("Foo { bar }").unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"lib.rs:1:7: field `bar` of `crate::Foo` is not a scalar literal: found field init shorthand `bar`"
        );
    }

    #[test]
    fn test_non_literal_value() {
        let err = run("Foo { bar: some_var }").unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"lib.rs:1:12: field `bar` of `crate::Foo` is not a scalar literal: found path expression `some_var`"
        );
    }

    #[test]
    fn test_struct_update_base() {
        let err = run("Foo { a: 1, ..Default::default() }").unwrap_err();
        match err {
            FindError::UnsupportedValue { field, shape, .. } => {
                assert_eq!(field, "..");
                assert!(shape.starts_with("struct update base"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_conditional_field() {
        let err = run("Foo { #[cfg(unix)] a: 1 }").unwrap_err();
        match err {
            FindError::UnsupportedKey { key, .. } => {
                assert!(key.contains("cfg"));
                assert!(key.ends_with(" a"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
