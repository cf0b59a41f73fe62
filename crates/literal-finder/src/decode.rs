//! Scalar decoding of literal expressions.
//!
//! | Literal | Value |
//! |---------|-------|
//! | `true`, `false` | [`ScalarValue::Boolean`] |
//! | `"text"`, `r#"text"#` | [`ScalarValue::String`], delimiters stripped, escapes kept |
//! | `42`, `0x2a`, `1_000u16` | [`ScalarValue::Integer`] |
//! | `4.2`, `1e3`, `2.5f32` | [`ScalarValue::Float`], finite only |
//!
//! Everything else, including negative numbers (a unary minus applied to a
//! literal), is unsupported.

use literal_finder_core::ScalarValue;
use proc_macro2::Span;
use quote::ToTokens;
use syn::spanned::Spanned;
use syn::{Expr, Lit};

/// An expression that is not a scalar literal.
#[derive(Debug, Clone)]
pub struct Unsupported {
    /// What was found, e.g. ``path expression `port` ``.
    pub shape: String,
    /// Span of the offending expression.
    pub span: Span,
}

/// Decodes a scalar literal expression.
///
/// Invisible groups (from `macro_rules!` expansion) are looked through.
///
/// # Errors
///
/// Returns [`Unsupported`] for any expression that is not a boolean, string,
/// integer or float literal, and for integers that do not fit in `i64`.
pub fn decode(expr: &Expr) -> Result<ScalarValue, Unsupported> {
    match expr {
        Expr::Group(group) => decode(&group.expr),
        Expr::Lit(lit) => decode_lit(&lit.lit).map_err(|shape| Unsupported {
            shape,
            span: expr.span(),
        }),
        other => Err(Unsupported {
            shape: format!("{} `{}`", expr_kind(other), source_text(other)),
            span: other.span(),
        }),
    }
}

fn decode_lit(lit: &Lit) -> Result<ScalarValue, String> {
    let text = source_text(lit);
    match lit {
        Lit::Bool(b) => Ok(ScalarValue::Boolean(b.value)),
        Lit::Str(s) if s.suffix().is_empty() => Ok(ScalarValue::String(strip_quotes(&text))),
        Lit::Str(_) => Err(format!("suffixed string literal `{text}`")),
        Lit::Int(i) => i
            .base10_parse::<i64>()
            .map(ScalarValue::Integer)
            .map_err(|_| format!("integer literal `{text}` out of range for i64")),
        Lit::Float(f) => match f.base10_parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(ScalarValue::Float(x)),
            Ok(_) => Err(format!("float literal `{text}` out of range for f64")),
            Err(e) => Err(format!("float literal `{text}`: {e}")),
        },
        Lit::ByteStr(_) => Err(format!("byte string literal `{text}`")),
        Lit::CStr(_) => Err(format!("C string literal `{text}`")),
        Lit::Byte(_) => Err(format!("byte literal `{text}`")),
        Lit::Char(_) => Err(format!("character literal `{text}`")),
        _ => Err(format!("literal `{text}`")),
    }
}

/// Removes the delimiters of a string token without interpreting escapes.
fn strip_quotes(token: &str) -> String {
    let body = match token.strip_prefix('r') {
        Some(raw) => {
            let fence = raw.len() - raw.trim_start_matches('#').len();
            &raw[fence..raw.len() - fence]
        }
        None => token,
    };
    body.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(body)
        .to_string()
}

fn source_text(node: &impl ToTokens) -> String {
    node.to_token_stream().to_string()
}

fn expr_kind(expr: &Expr) -> &'static str {
    match expr {
        Expr::Array(_) | Expr::Repeat(_) => "array expression",
        Expr::Binary(_) => "binary expression",
        Expr::Block(_) | Expr::Unsafe(_) | Expr::Const(_) => "block expression",
        Expr::Call(_) => "function call",
        Expr::Cast(_) => "cast expression",
        Expr::Closure(_) => "closure",
        Expr::Field(_) => "field access",
        Expr::If(_) | Expr::Match(_) => "conditional expression",
        Expr::Index(_) => "index expression",
        Expr::Macro(_) => "macro invocation",
        Expr::MethodCall(_) => "method call",
        Expr::Paren(_) => "parenthesized expression",
        Expr::Path(_) => "path expression",
        Expr::Range(_) => "range expression",
        Expr::Reference(_) => "reference expression",
        Expr::Struct(_) => "struct literal",
        Expr::Tuple(_) => "tuple expression",
        Expr::Unary(_) => "unary expression",
        _ => "expression",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(code: &str) -> Expr {
        syn::parse_str(code).unwrap()
    }

    fn shape(code: &str) -> String {
        decode(&parse(code)).unwrap_err().shape
    }

    #[test]
    fn test_booleans() {
        assert_eq!(decode(&parse("true")).unwrap(), ScalarValue::Boolean(true));
        assert_eq!(decode(&parse("false")).unwrap(), ScalarValue::Boolean(false));
    }

    #[test]
    fn test_strings_keep_escapes() {
        assert_eq!(decode(&parse(r#""one""#)).unwrap(), ScalarValue::from("one"));
        assert_eq!(decode(&parse(r#""a\nb""#)).unwrap(), ScalarValue::from(r"a\nb"));
        assert_eq!(decode(&parse(r##"r#"say "hi""#"##)).unwrap(), ScalarValue::from(r#"say "hi""#));
        assert_eq!(decode(&parse(r#"r"plain""#)).unwrap(), ScalarValue::from("plain"));
        assert_eq!(decode(&parse(r#""""#)).unwrap(), ScalarValue::from(""));
    }

    #[test]
    fn test_integers() {
        assert_eq!(decode(&parse("42")).unwrap(), ScalarValue::Integer(42));
        assert_eq!(decode(&parse("0x2a")).unwrap(), ScalarValue::Integer(42));
        assert_eq!(decode(&parse("0o52")).unwrap(), ScalarValue::Integer(42));
        assert_eq!(decode(&parse("0b101010")).unwrap(), ScalarValue::Integer(42));
        assert_eq!(decode(&parse("1_000u16")).unwrap(), ScalarValue::Integer(1000));
        assert_eq!(
            decode(&parse("9223372036854775807")).unwrap(),
            ScalarValue::Integer(i64::MAX)
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(decode(&parse("4.2")).unwrap(), ScalarValue::Float(4.2));
        assert_eq!(decode(&parse("1e3")).unwrap(), ScalarValue::Float(1000.0));
        assert_eq!(decode(&parse("2.5f32")).unwrap(), ScalarValue::Float(2.5));
    }

    #[test]
    fn test_unsupported_shapes() {
        assert_eq!(shape("some_var"), "path expression `some_var`");
        assert_eq!(shape("-1"), "unary expression `- 1`");
        assert_eq!(shape("1 + 2"), "binary expression `1 + 2`");
        assert_eq!(shape("'c'"), "character literal `'c'`");
        assert_eq!(shape(r#"b"bytes""#), r#"byte string literal `b"bytes"`"#);
        assert_eq!(
            shape("9223372036854775808"),
            "integer literal `9223372036854775808` out of range for i64"
        );
        assert_eq!(shape("String::new()"), "function call `String :: new ()`");
        assert_eq!(shape("1e400"), "float literal `1e400` out of range for f64");
    }

    #[test]
    fn test_unsupported_span() {
        let expr = parse("\n\n   port");
        let err = decode(&expr).unwrap_err();
        assert_eq!(err.span.start().line, 3);
    }

    proptest! {
        #[test]
        fn prop_decodes_written_integers(n in 0..=i64::MAX) {
            prop_assert_eq!(decode(&parse(&n.to_string())).unwrap(), ScalarValue::Integer(n));
        }

        #[test]
        fn prop_decodes_written_floats(f in 0.0..1e300f64) {
            let written = format!("{f:?}");
            prop_assert_eq!(decode(&parse(&written)).unwrap(), ScalarValue::Float(f));
        }

        #[test]
        fn prop_decodes_written_strings(s in "[a-zA-Z0-9 _.:/-]*") {
            let written = format!("\"{s}\"");
            prop_assert_eq!(decode(&parse(&written)).unwrap(), ScalarValue::String(s));
        }
    }
}
