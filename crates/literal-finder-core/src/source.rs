//! Source loading: raw text to an immutable syntax tree.

use crate::error::FindError;
use crate::types::Location;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Where the text of a source unit comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Inline source text.
    Text(String),
    /// Inline source bytes, which must be UTF-8.
    Bytes(Vec<u8>),
    /// Read the text from the unit's filename.
    File,
}

impl Source {
    /// Inline source text.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Source {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Source {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

/// One parsed source file.
///
/// Created by [`SourceUnit::load`] and immutable afterwards.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    filename: PathBuf,
    module_path: Vec<String>,
    content: String,
    ast: syn::File,
}

impl SourceUnit {
    /// Loads and parses a unit, deriving its module path from `filename`.
    ///
    /// # Errors
    ///
    /// Returns [`FindError::Io`] if the file cannot be read (or the bytes are
    /// not UTF-8) and [`FindError::Syntax`] if the text does not parse.
    pub fn load(filename: impl Into<PathBuf>, source: impl Into<Source>) -> Result<Self, FindError> {
        let filename = filename.into();
        let module_path = Self::compute_module_path(&filename);
        Self::load_in_module(filename, module_path, source)
    }

    /// Loads and parses a unit that belongs to an explicit module.
    ///
    /// `module_path` is relative to the crate root; an empty path is the root.
    ///
    /// # Errors
    ///
    /// Same as [`SourceUnit::load`].
    pub fn load_in_module(
        filename: impl Into<PathBuf>,
        module_path: Vec<String>,
        source: impl Into<Source>,
    ) -> Result<Self, FindError> {
        let filename = filename.into();
        let content = Self::read(&filename, source.into())?;
        let ast = syn::parse_file(&content).map_err(|e| FindError::Syntax {
            location: Location::from_span(&filename, e.span()),
            message: e.to_string(),
        })?;

        debug!(
            "Loaded {} as module `{}` ({} items)",
            filename.display(),
            module_path.join("::"),
            ast.items.len()
        );

        Ok(Self {
            filename,
            module_path,
            content,
            ast,
        })
    }

    fn read(filename: &Path, source: Source) -> Result<String, FindError> {
        match source {
            Source::Text(text) => Ok(text),
            Source::Bytes(bytes) => String::from_utf8(bytes).map_err(|e| FindError::Io {
                path: filename.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            }),
            Source::File => std::fs::read_to_string(filename).map_err(|e| FindError::Io {
                path: filename.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Computes the module path from a file path.
    ///
    /// Everything up to the last `src` directory is dropped, and `lib`,
    /// `main` and `mod` file stems name their parent module.
    #[must_use]
    pub fn compute_module_path(path: &Path) -> Vec<String> {
        let mut parts: Vec<String> = path
            .with_extension("")
            .components()
            .filter_map(|c| {
                if let Component::Normal(s) = c {
                    s.to_str().map(String::from)
                } else {
                    None
                }
            })
            .collect();

        if let Some(src) = parts.iter().rposition(|p| p == "src") {
            parts.drain(..=src);
        }

        if let Some(last) = parts.last() {
            let is_root = parts.len() == 1 && (last == "lib" || last == "main");
            if is_root || last == "mod" {
                parts.pop();
            }
        }

        parts
    }

    /// The filename given when the unit was added.
    #[must_use]
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Module path relative to the crate root.
    #[must_use]
    pub fn module_path(&self) -> &[String] {
        &self.module_path
    }

    /// The source text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The parsed syntax tree.
    #[must_use]
    pub fn ast(&self) -> &syn::File {
        &self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path() {
        assert_eq!(
            SourceUnit::compute_module_path(Path::new("src/foo/bar.rs")),
            vec!["foo", "bar"]
        );
        assert_eq!(
            SourceUnit::compute_module_path(Path::new("crates/app/src/foo/mod.rs")),
            vec!["foo"]
        );
        assert!(SourceUnit::compute_module_path(Path::new("src/lib.rs")).is_empty());
        assert!(SourceUnit::compute_module_path(Path::new("main.rs")).is_empty());
        assert_eq!(
            SourceUnit::compute_module_path(Path::new("foo.rs")),
            vec!["foo"]
        );
        assert_eq!(
            SourceUnit::compute_module_path(Path::new("src/net/lib.rs")),
            vec!["net", "lib"]
        );
    }

    #[test]
    fn test_load_text() {
        let unit = SourceUnit::load("src/lib.rs", "// config\npub struct Foo { pub bar: bool }")
            .expect("should parse");
        assert!(unit.module_path().is_empty());
        assert_eq!(unit.ast().items.len(), 1);
        assert!(unit.content().starts_with("// config"));
    }

    #[test]
    fn test_syntax_error_names_file() {
        let err = SourceUnit::load("lib.rs", "pub struct Foo {\n    bar: bool,\n").unwrap_err();
        match err {
            FindError::Syntax { location, .. } => {
                assert_eq!(location.file, PathBuf::from("lib.rs"));
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_syntax_error_position() {
        let err = SourceUnit::load("lib.rs", "pub struct Foo;\nfn f() { let = 1; }\n").unwrap_err();
        let location = err.location().cloned().expect("syntax errors carry a location");
        assert_eq!(location.line, 2);
    }

    #[test]
    fn test_load_bytes_requires_utf8() {
        let err = SourceUnit::load("lib.rs", vec![0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, FindError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src").join("settings.rs");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "pub struct Settings { pub debug: bool }").unwrap();

        let unit = SourceUnit::load(&path, Source::File).unwrap();
        assert_eq!(unit.module_path(), ["settings".to_string()]);

        let missing = SourceUnit::load(dir.path().join("gone.rs"), Source::File).unwrap_err();
        assert!(matches!(missing, FindError::Io { .. }));
    }
}
