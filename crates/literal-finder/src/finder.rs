//! The finder session: accumulate source units, then find literals.

use crate::matcher::LiteralMatcher;
use crate::project::{project, project_into};
use literal_finder_core::{
    ConfigError, FindError, FinderConfig, ResolverBox, ResultOrder, ResultSet, Source,
    SourceUnit, TargetTypeRef, TypeResolver, DEFAULT_CRATE_NAME,
};
use literal_finder_syn::SynResolver;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Lifecycle of a [`Finder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No source units yet.
    Empty,
    /// Units were added since the last successful pass.
    Accumulating,
    /// The last pass succeeded and no units were added since.
    Done,
}

/// Builder for configuring a [`Finder`].
#[derive(Default)]
pub struct FinderBuilder {
    target: Option<String>,
    crate_name: Option<String>,
    order: Option<ResultOrder>,
    config: Option<FinderConfig>,
    resolver: Option<ResolverBox>,
}

impl FinderBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the qualified path of the struct to find, e.g. `crate::config::Config`.
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Sets the name of the crate root used in qualified paths (default: `crate`).
    #[must_use]
    pub fn crate_name(mut self, name: impl Into<String>) -> Self {
        self.crate_name = Some(name.into());
        self
    }

    /// Sets the order of records across source units.
    #[must_use]
    pub fn order(mut self, order: ResultOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets the configuration. Values set directly on the builder win.
    #[must_use]
    pub fn config(mut self, config: FinderConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the default `syn` resolver.
    #[must_use]
    pub fn resolver<R: TypeResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Builds the finder.
    ///
    /// # Errors
    ///
    /// Returns [`FindError::Config`] if no target was given, the target is
    /// not a qualified path, or the crate name is not an identifier.
    pub fn build(self) -> Result<Finder, FindError> {
        let target = match (self.target, &self.config) {
            (Some(target), _) => TargetTypeRef::new(target)?,
            (None, Some(config)) => config.target.clone(),
            (None, None) => return Err(ConfigError::MissingTarget.into()),
        };
        let crate_name = self
            .crate_name
            .or_else(|| self.config.as_ref().map(|c| c.crate_name.clone()))
            .unwrap_or_else(|| DEFAULT_CRATE_NAME.to_string());
        let order = self
            .order
            .or_else(|| self.config.as_ref().map(|c| c.order))
            .unwrap_or_default();

        let config = FinderConfig {
            target,
            crate_name,
            order,
        };
        config.validate()?;

        let resolver = self
            .resolver
            .unwrap_or_else(|| Box::new(SynResolver::new(config.crate_name.clone())));
        debug!(
            "Finder for `{}` using {} resolver",
            config.target,
            resolver.name()
        );

        Ok(Finder {
            config,
            resolver,
            units: Vec::new(),
            state: SessionState::Empty,
        })
    }
}

/// Finds literal instances of one struct type across source units.
///
/// Use [`Finder::new`] or [`Finder::builder()`] to construct an instance,
/// [`Finder::add`] every file of the crate, then [`Finder::find`].
///
/// # Example
///
/// ```ignore
/// use literal_finder::Finder;
///
/// let mut finder = Finder::new("crate::Foo")?;
/// finder.add("src/lib.rs", r#"pub struct Foo { pub bar: &'static str }
/// pub const FOO: Foo = Foo { bar: "one" };"#)?;
///
/// let results = finder.find()?;
/// assert_eq!(results[0]["bar"].as_str(), Some("one"));
/// ```
pub struct Finder {
    config: FinderConfig,
    resolver: ResolverBox,
    units: Vec<SourceUnit>,
    state: SessionState,
}

impl std::fmt::Debug for Finder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Finder")
            .field("config", &self.config)
            .field("resolver", &self.resolver.name())
            .field("units", &self.units.len())
            .field("state", &self.state)
            .finish()
    }
}

impl Finder {
    /// Creates a finder for `target` with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`FindError::Config`] if `target` is not a qualified path.
    pub fn new(target: impl Into<String>) -> Result<Self, FindError> {
        Self::builder().target(target).build()
    }

    /// Creates a new builder for configuring a finder.
    #[must_use]
    pub fn builder() -> FinderBuilder {
        FinderBuilder::new()
    }

    /// Creates a finder from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FindError::Config`] if the configuration is invalid.
    pub fn from_config(config: FinderConfig) -> Result<Self, FindError> {
        Self::builder().config(config).build()
    }

    /// The struct type being searched for.
    #[must_use]
    pub fn target(&self) -> &TargetTypeRef {
        &self.config.target
    }

    /// The effective configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Source units added so far, in insertion order.
    #[must_use]
    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    /// Adds a source file, deriving its module from `filename`.
    ///
    /// `src/lib.rs` and `src/main.rs` are the crate root; `src/a/b.rs` and
    /// `src/a/b/mod.rs` are module `a::b`. With [`Source::File`] the text is
    /// read from `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`FindError::Io`] or [`FindError::Syntax`]; the session is
    /// unchanged in that case.
    pub fn add(
        &mut self,
        filename: impl Into<PathBuf>,
        source: impl Into<Source>,
    ) -> Result<(), FindError> {
        let unit = SourceUnit::load(filename, source)?;
        self.push(unit);
        Ok(())
    }

    /// Adds a source file that belongs to an explicit module, e.g. `net::http`.
    ///
    /// An empty path is the crate root.
    ///
    /// # Errors
    ///
    /// Same as [`Finder::add`].
    pub fn add_module(
        &mut self,
        filename: impl Into<PathBuf>,
        module_path: &str,
        source: impl Into<Source>,
    ) -> Result<(), FindError> {
        let module_path = module_path
            .split("::")
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(String::from)
            .collect();
        let unit = SourceUnit::load_in_module(filename, module_path, source)?;
        self.push(unit);
        Ok(())
    }

    fn push(&mut self, unit: SourceUnit) {
        debug!(
            "Added {} ({} units)",
            unit.filename().display(),
            self.units.len() + 1
        );
        self.units.push(unit);
        self.state = SessionState::Accumulating;
    }

    /// Finds every literal of the target type in the added units.
    ///
    /// Each call re-runs the whole pass, so repeated calls give equal results.
    ///
    /// # Errors
    ///
    /// Returns the first error of the pass; no partial results are kept.
    pub fn find(&mut self) -> Result<ResultSet, FindError> {
        info!(
            "Finding `{}` literals in {} units",
            self.config.target,
            self.units.len()
        );

        let mut matcher = LiteralMatcher::new(&self.config.target);
        self.resolver.resolve(&self.units, &mut matcher)?;
        let records = matcher.into_records(self.config.order);

        info!("Found {} literals", records.len());
        self.state = SessionState::Done;
        Ok(project(records))
    }

    /// Finds every literal and decodes each record into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`FindError::Projection`] if a record does not fit `T`, or any
    /// error of [`Finder::find`].
    pub fn find_into<T>(&mut self) -> Result<Vec<T>, FindError>
    where
        T: DeserializeOwned + Serialize,
    {
        let results = self.find()?;
        Ok(project_into(&results)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_target() {
        let err = Finder::builder().build().unwrap_err();
        assert!(matches!(err, FindError::Config(ConfigError::MissingTarget)));
    }

    #[test]
    fn test_invalid_target() {
        let err = Finder::new("crate::").unwrap_err();
        assert!(matches!(
            err,
            FindError::Config(ConfigError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_builder_overrides_config() {
        let config = FinderConfig::parse(
            r#"
target = "app::Config"
crate_name = "app"
order = "traversal"
"#,
        )
        .unwrap();
        let finder = Finder::builder()
            .config(config)
            .order(ResultOrder::Source)
            .build()
            .unwrap();
        assert_eq!(finder.target().as_str(), "app::Config");
        assert_eq!(finder.config().crate_name, "app");
        assert_eq!(finder.config().order, ResultOrder::Source);
    }

    #[test]
    fn test_invalid_crate_name() {
        let err = Finder::builder()
            .target("crate::Foo")
            .crate_name("my-app")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            FindError::Config(ConfigError::InvalidCrateName { .. })
        ));
    }

    #[test]
    fn test_state_transitions() {
        let mut finder = Finder::new("crate::Foo").unwrap();
        assert_eq!(finder.state(), SessionState::Empty);

        finder.add("src/lib.rs", "pub struct Foo;").unwrap();
        assert_eq!(finder.state(), SessionState::Accumulating);

        finder.find().unwrap();
        assert_eq!(finder.state(), SessionState::Done);

        finder.add("src/more.rs", "fn f() {}").unwrap();
        assert_eq!(finder.state(), SessionState::Accumulating);
    }

    #[test]
    fn test_failed_add_keeps_session() {
        let mut finder = Finder::new("crate::Foo").unwrap();
        assert!(finder.add("src/lib.rs", "fn (").is_err());
        assert_eq!(finder.state(), SessionState::Empty);
        assert!(finder.units().is_empty());
    }

    #[test]
    fn test_add_module_path() {
        let mut finder = Finder::new("crate::Foo").unwrap();
        finder
            .add_module("generated.rs", "net::http", "pub struct Foo;")
            .unwrap();
        finder.add_module("root.rs", "", "").unwrap();
        assert_eq!(finder.units()[0].module_path(), ["net", "http"]);
        assert!(finder.units()[1].module_path().is_empty());
    }
}
