//! Configuration types for literal-finder.

use crate::types::TargetTypeRef;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Crate root segment used when no crate name is configured.
pub const DEFAULT_CRATE_NAME: &str = "crate";

/// Top-level configuration for a finder session.
///
/// ```toml
/// target = "crate::config::Config"
/// crate_name = "crate"
/// order = "source"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Qualified path of the struct to search for.
    pub target: TargetTypeRef,

    /// Name used for the crate root when qualifying paths (default: `crate`).
    #[serde(default = "default_crate_name")]
    pub crate_name: String,

    /// Order of records across source units.
    #[serde(default)]
    pub order: ResultOrder,
}

impl FinderConfig {
    /// Creates a configuration for `target` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is not a valid qualified path.
    pub fn new(target: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            target: TargetTypeRef::new(target)?,
            crate_name: default_crate_name(),
            order: ResultOrder::default(),
        })
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, `target` is missing, or
    /// `crate_name` is not an identifier.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        let target = raw.target.ok_or(ConfigError::MissingTarget)?;
        let config = Self {
            target: TargetTypeRef::new(target)?,
            crate_name: raw.crate_name,
            order: raw.order,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the crate name can head a qualified path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCrateName`] otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if TargetTypeRef::new(self.crate_name.as_str()).is_err() || self.crate_name.contains("::")
        {
            return Err(ConfigError::InvalidCrateName {
                name: self.crate_name.clone(),
            });
        }
        Ok(())
    }
}

/// TOML shape before the target is checked.
#[derive(Deserialize)]
struct RawConfig {
    target: Option<String>,
    #[serde(default = "default_crate_name")]
    crate_name: String,
    #[serde(default)]
    order: ResultOrder,
}

fn default_crate_name() -> String {
    DEFAULT_CRATE_NAME.to_string()
}

/// How records from several source units are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOrder {
    /// Sort by source unit (in the order added), then line, then column.
    #[default]
    Source,
    /// Keep the order in which the resolver reported expressions.
    Traversal,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// No target type was given.
    #[error("No target type configured")]
    MissingTarget,

    /// The target is not a `::`-separated path of identifiers.
    #[error("Invalid target type `{target}`: expected a qualified path like `crate::config::Config`")]
    InvalidTarget {
        /// The rejected target.
        target: String,
    },

    /// The crate name is not a single identifier.
    #[error("Invalid crate name `{name}`")]
    InvalidCrateName {
        /// The rejected name.
        name: String,
    },
}
