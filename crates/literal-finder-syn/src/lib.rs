//! # literal-finder-syn
//!
//! A static type resolver for Rust source, built on the `syn` syntax tree.
//!
//! [`SynResolver`] treats the loaded units as one crate. It resolves the
//! type of struct literals and tuple-struct constructor calls through
//! local scopes, module items, `use` imports (including globs and renames),
//! `crate`/`self`/`super`/`Self` and type aliases. Other expressions are
//! reported with an unknown type.
//!
//! ## Usage
//!
//! ```ignore
//! use literal_finder_core::{ResolvedExpr, SourceUnit, TypeResolver};
//! use literal_finder_syn::SynResolver;
//!
//! let unit = SourceUnit::load("src/lib.rs", "pub struct Foo { pub a: i64 }")?;
//! let mut visitor = |expr: &ResolvedExpr<'_>| {
//!     println!("{} {:?}", expr.location(), expr.ty);
//!     Ok(())
//! };
//! SynResolver::default().resolve(&[unit], &mut visitor)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod imports;
mod scope;
mod walker;

use literal_finder_core::{ExprVisitor, FindError, SourceUnit, TypeResolver, DEFAULT_CRATE_NAME};
use scope::ModuleTable;
use tracing::debug;
use walker::Walker;

/// Resolves expression types across a set of source units using `syn`.
///
/// All units belong to a single crate whose root module is named
/// `crate_name`; qualified type names start with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynResolver {
    crate_name: String,
}

impl Default for SynResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CRATE_NAME)
    }
}

impl SynResolver {
    /// Creates a resolver whose crate root is named `crate_name`.
    #[must_use]
    pub fn new(crate_name: impl Into<String>) -> Self {
        Self {
            crate_name: crate_name.into(),
        }
    }

    /// Name of the crate root module.
    #[must_use]
    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }
}

impl TypeResolver for SynResolver {
    fn name(&self) -> &'static str {
        "syn"
    }

    fn resolve(
        &self,
        units: &[SourceUnit],
        visitor: &mut dyn ExprVisitor,
    ) -> Result<(), FindError> {
        let table = ModuleTable::build(&self.crate_name, units)?;

        for (index, unit) in units.iter().enumerate() {
            let scope = table.unit_scope(unit);
            debug!(
                "Walking {} as `{}`",
                unit.filename().display(),
                scope.join("::")
            );
            Walker::new(&table, index, unit.filename(), scope, &mut *visitor).run(unit.ast())?;
        }

        Ok(())
    }
}
