//! # literal-finder
//!
//! Find literal instances of a struct type in Rust source and extract their
//! fields as data.
//!
//! This is the facade crate: it re-exports the core types and the `syn`
//! resolver, and adds the [`Finder`] session plus record projection.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use literal_finder::Finder;
//!
//! let mut finder = Finder::new("crate::config::Endpoint")?;
//! finder.add("src/lib.rs", "pub mod config;")?;
//! finder.add("src/config.rs", r#"
//!     pub struct Endpoint { pub name: &'static str, pub port: u16 }
//!     pub const API: Endpoint = Endpoint { name: "api", port: 443 };
//! "#)?;
//!
//! let results = finder.find()?;
//! assert_eq!(results[0]["port"].as_i64(), Some(443));
//! ```
//!
//! ## Typed Results
//!
//! ```rust,ignore
//! #[derive(serde::Serialize, serde::Deserialize)]
//! struct Endpoint { name: String, port: i64 }
//!
//! let endpoints: Vec<Endpoint> = finder.find_into()?;
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! # literal-finder.toml
//! target = "crate::config::Endpoint"
//! crate_name = "crate"
//! order = "source"
//! ```
//!
//! ```rust,ignore
//! let config = FinderConfig::from_file("literal-finder.toml".as_ref())?;
//! let mut finder = Finder::from_config(config)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod decode;
mod extract;
mod finder;
mod matcher;
mod project;

pub use decode::{decode, Unsupported};
pub use extract::extract;
pub use finder::{Finder, FinderBuilder, SessionState};
pub use matcher::LiteralMatcher;
pub use project::{project, project_into, to_records};

// Re-export core types and traits
pub use literal_finder_core::*;

// Re-export the default resolver
pub use literal_finder_syn::SynResolver;
