//! # literal-finder-core
//!
//! Core building blocks for finding literal struct instances in Rust source.
//!
//! This crate holds everything the finding pipeline shares:
//!
//! - [`SourceUnit`] and [`Source`] for loading and parsing source text
//! - [`TypeResolver`] and [`ExprVisitor`], the seam to a static resolver
//! - [`LiteralRecord`], [`ScalarValue`] and [`ResultSet`] for results
//! - [`FindError`] for every way a finding pass can fail
//! - [`FinderConfig`] for TOML-driven setup
//!
//! ## Example
//!
//! ```ignore
//! use literal_finder_core::{Source, SourceUnit};
//!
//! let unit = SourceUnit::load("src/lib.rs", Source::text("pub struct Foo;"))?;
//! assert!(unit.module_path().is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod resolver;
mod source;
mod types;

/// Utility modules for resolver implementations.
pub mod utils;

pub use config::{ConfigError, FinderConfig, ResultOrder, DEFAULT_CRATE_NAME};
pub use error::{FindError, ProjectionError};
pub use resolver::{ExprVisitor, ResolvedExpr, ResolvedType, ResolverBox, TypeResolver};
pub use source::{Source, SourceUnit};
pub use types::{LiteralRecord, Location, ResultSet, ScalarValue, TargetTypeRef};
