//! Path utilities for AST analysis.

use syn::Path;

/// Returns the identifiers of a syn Path, raw identifiers unescaped.
#[must_use]
pub fn path_to_segments(path: &Path) -> Vec<String> {
    path.segments
        .iter()
        .map(|seg| unraw(&seg.ident))
        .collect()
}

/// Renders an identifier without its `r#` prefix.
#[must_use]
pub fn unraw(ident: &proc_macro2::Ident) -> String {
    let s = ident.to_string();
    match s.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => s,
    }
}

/// Joins path segments with `::`.
#[must_use]
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("::")
}

/// Extracts the last segment from a path string.
#[must_use]
pub fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_identifiers() {
        let path: Path = syn::parse_str("r#mod::r#type").unwrap();
        assert_eq!(path_to_segments(&path), vec!["mod", "type"]);
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("std::fs::read"), "read");
        assert_eq!(last_segment("read"), "read");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(&["crate", "a", "B"]), "crate::a::B");
        assert_eq!(join_path::<&str>(&[]), "");
    }
}
