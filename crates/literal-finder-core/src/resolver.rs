//! The seam between the finder and a static type resolver.

use crate::error::FindError;
use crate::source::SourceUnit;
use crate::types::Location;
use std::path::Path;
use syn::spanned::Spanned;

/// Static type of an expression, as far as the resolver could determine it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedType {
    /// A named struct, union or external type, by qualified path.
    Named(String),
    /// A struct-like or tuple-like enum variant; its type is `owner`.
    Variant {
        /// Qualified path of the enum.
        owner: String,
        /// Variant name.
        variant: String,
    },
    /// The resolver does not track this expression's type.
    Unknown,
}

impl ResolvedType {
    /// Returns the qualified name if this is a named type.
    #[must_use]
    pub fn named(&self) -> Option<&str> {
        match self {
            Self::Named(path) => Some(path),
            Self::Variant { .. } | Self::Unknown => None,
        }
    }
}

/// One expression reported by a resolver.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedExpr<'a> {
    /// Index of the source unit, in the order units were added.
    pub unit: usize,
    /// Filename of the source unit.
    pub file: &'a Path,
    /// The expression node.
    pub expr: &'a syn::Expr,
    /// Its resolved static type.
    pub ty: &'a ResolvedType,
    /// The literal token, when the expression is a literal.
    pub constant: Option<&'a syn::Lit>,
}

impl ResolvedExpr<'_> {
    /// Location of the start of the expression.
    #[must_use]
    pub fn location(&self) -> Location {
        Location::from_span(self.file, self.expr.span())
    }
}

/// Receives every expression a resolver walks over.
///
/// Returning an error stops the pass: the resolver reports no further
/// expressions and hands the error back to its caller.
pub trait ExprVisitor {
    /// Called once per expression, in traversal order.
    ///
    /// # Errors
    ///
    /// Any error aborts the pass.
    fn visit(&mut self, resolved: &ResolvedExpr<'_>) -> Result<(), FindError>;
}

impl<F> ExprVisitor for F
where
    F: FnMut(&ResolvedExpr<'_>) -> Result<(), FindError>,
{
    fn visit(&mut self, resolved: &ResolvedExpr<'_>) -> Result<(), FindError> {
        self(resolved)
    }
}

/// A static type resolver over parsed source units.
///
/// Implement this trait to plug a different front end into the finder.
///
/// # Example
///
/// ```ignore
/// use literal_finder_core::{ExprVisitor, FindError, SourceUnit, TypeResolver};
///
/// pub struct NoTypes;
///
/// impl TypeResolver for NoTypes {
///     fn name(&self) -> &'static str { "no-types" }
///
///     fn resolve(&self, _units: &[SourceUnit], _visitor: &mut dyn ExprVisitor)
///         -> Result<(), FindError> {
///         Ok(())
///     }
/// }
/// ```
pub trait TypeResolver: Send + Sync {
    /// Returns a short name for logging (e.g., "syn").
    fn name(&self) -> &'static str;

    /// Resolves all units together and reports every expression to `visitor`.
    ///
    /// # Errors
    ///
    /// Returns [`FindError::TypeResolution`] for semantic errors anywhere in
    /// `units`, or the first error returned by `visitor`.
    fn resolve(&self, units: &[SourceUnit], visitor: &mut dyn ExprVisitor)
        -> Result<(), FindError>;
}

/// Type alias for boxed `TypeResolver` trait objects.
pub type ResolverBox = Box<dyn TypeResolver>;
