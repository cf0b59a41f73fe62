//! Matching resolved expressions against the target type.

use crate::extract::extract;
use literal_finder_core::{
    ExprVisitor, FindError, LiteralRecord, Location, ResolvedExpr, ResultOrder, TargetTypeRef,
};
use syn::spanned::Spanned;
use syn::Expr;
use tracing::trace;

/// A record and where its literal starts.
#[derive(Debug)]
struct Match {
    unit: usize,
    line: usize,
    column: usize,
    record: LiteralRecord,
}

/// Collects a record for every literal of the target type.
///
/// Only expressions whose resolved type is exactly the target take part.
/// Struct literals are extracted; a tuple-struct constructor call is a
/// positional literal and fails the pass.
#[derive(Debug)]
pub struct LiteralMatcher<'a> {
    target: &'a TargetTypeRef,
    matches: Vec<Match>,
}

impl<'a> LiteralMatcher<'a> {
    /// Creates a matcher for `target`.
    #[must_use]
    pub fn new(target: &'a TargetTypeRef) -> Self {
        Self {
            target,
            matches: Vec::new(),
        }
    }

    /// Number of literals matched so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Returns the records in the requested order.
    #[must_use]
    pub fn into_records(mut self, order: ResultOrder) -> Vec<LiteralRecord> {
        if order == ResultOrder::Source {
            self.matches.sort_by_key(|m| (m.unit, m.line, m.column));
        }
        self.matches.into_iter().map(|m| m.record).collect()
    }
}

impl ExprVisitor for LiteralMatcher<'_> {
    fn visit(&mut self, resolved: &ResolvedExpr<'_>) -> Result<(), FindError> {
        let Some(type_name) = resolved.ty.named() else {
            return Ok(());
        };
        if !self.target.matches(type_name) {
            return Ok(());
        }

        match resolved.expr {
            Expr::Struct(literal) => {
                let record = extract(literal, type_name, resolved.file)?;
                let location = resolved.location();
                trace!("Matched `{type_name}` at {location}");
                self.matches.push(Match {
                    unit: resolved.unit,
                    line: location.line,
                    column: location.column,
                    record,
                });
                Ok(())
            }
            Expr::Call(call) => match call.args.first() {
                Some(first) => Err(FindError::UnkeyedField {
                    location: Location::from_span(resolved.file, first.span()),
                    type_name: type_name.to_string(),
                }),
                None => {
                    let location = resolved.location();
                    self.matches.push(Match {
                        unit: resolved.unit,
                        line: location.line,
                        column: location.column,
                        record: LiteralRecord::new(),
                    });
                    Ok(())
                }
            },
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use literal_finder_core::{ResolvedType, ScalarValue};
    use std::path::Path;

    fn visit(
        matcher: &mut LiteralMatcher<'_>,
        unit: usize,
        code: &str,
        ty: &ResolvedType,
    ) -> Result<(), FindError> {
        let expr: Expr = syn::parse_str(code).unwrap();
        matcher.visit(&ResolvedExpr {
            unit,
            file: Path::new("lib.rs"),
            expr: &expr,
            ty,
            constant: None,
        })
    }

    fn target() -> TargetTypeRef {
        TargetTypeRef::new("crate::Foo").unwrap()
    }

    #[test]
    fn test_only_exact_type_matches() {
        let target = target();
        let mut matcher = LiteralMatcher::new(&target);
        let foo = ResolvedType::Named("crate::Foo".into());
        let other = ResolvedType::Named("crate::inner::Foo".into());
        let variant = ResolvedType::Variant {
            owner: "crate::Foo".into(),
            variant: "A".into(),
        };

        visit(&mut matcher, 0, "Foo { a: 1 }", &foo).unwrap();
        visit(&mut matcher, 0, "Foo { a: 2 }", &other).unwrap();
        visit(&mut matcher, 0, "Foo::A { a: 3 }", &variant).unwrap();
        visit(&mut matcher, 0, "Foo { a: 4 }", &ResolvedType::Unknown).unwrap();
        assert_eq!(matcher.len(), 1);
    }

    #[test]
    fn test_constructor_call_is_positional() {
        let target = target();
        let mut matcher = LiteralMatcher::new(&target);
        let foo = ResolvedType::Named("crate::Foo".into());
        let err = visit(&mut matcher, 0, r#"Foo("one")"#, &foo).unwrap_err();
        assert!(matches!(err, FindError::UnkeyedField { .. }));
    }

    #[test]
    fn test_other_expressions_are_ignored() {
        let target = target();
        let mut matcher = LiteralMatcher::new(&target);
        let foo = ResolvedType::Named("crate::Foo".into());
        visit(&mut matcher, 0, "foo.clone()", &foo).unwrap();
        assert!(matcher.is_empty());
    }

    #[test]
    fn test_source_order_sorts_by_unit_then_position() {
        let target = target();
        let mut matcher = LiteralMatcher::new(&target);
        let foo = ResolvedType::Named("crate::Foo".into());
        visit(&mut matcher, 1, "Foo { n: 1 }", &foo).unwrap();
        visit(&mut matcher, 0, "\nFoo { n: 2 }", &foo).unwrap();
        visit(&mut matcher, 0, "Foo { n: 3 }", &foo).unwrap();

        let order = |records: Vec<LiteralRecord>| -> Vec<i64> {
            records
                .iter()
                .filter_map(|r| r.get("n").and_then(ScalarValue::as_i64))
                .collect()
        };
        let mut traversal = LiteralMatcher::new(&target);
        visit(&mut traversal, 1, "Foo { n: 1 }", &foo).unwrap();
        visit(&mut traversal, 0, "Foo { n: 2 }", &foo).unwrap();

        assert_eq!(order(matcher.into_records(ResultOrder::Source)), vec![3, 2, 1]);
        assert_eq!(
            order(traversal.into_records(ResultOrder::Traversal)),
            vec![1, 2]
        );
    }
}
