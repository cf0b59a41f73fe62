//! Flattening of `use` trees into single imports.

use literal_finder_core::utils::unraw;
use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{ItemUse, UseTree};

/// One name brought into scope by a `use` item.
#[derive(Debug, Clone)]
pub(crate) struct UseEntry {
    /// Local name, or `None` for a glob import.
    pub name: Option<String>,
    /// Path as written, without a leading `::`.
    pub segments: Vec<String>,
    /// Whether the path started with `::` (always another crate).
    pub leading_colon: bool,
    /// Span of the imported name.
    pub span: Span,
}

/// Expands a `use` item into one entry per imported name or glob.
///
/// `use a::{b, c as d, e::*}` yields `b -> a::b`, `d -> a::c` and the glob
/// `a::e`. Underscore imports bind no name and are skipped.
pub(crate) fn flatten_use(item: &ItemUse) -> Vec<UseEntry> {
    let mut entries = Vec::new();
    let mut prefix = Vec::new();
    walk(
        &item.tree,
        item.leading_colon.is_some(),
        &mut prefix,
        &mut entries,
    );
    entries
}

fn walk(tree: &UseTree, leading_colon: bool, prefix: &mut Vec<String>, out: &mut Vec<UseEntry>) {
    match tree {
        UseTree::Path(path) => {
            prefix.push(unraw(&path.ident));
            walk(&path.tree, leading_colon, prefix, out);
            prefix.pop();
        }
        UseTree::Name(name) => {
            let ident = unraw(&name.ident);
            if ident == "self" {
                if let Some(last) = prefix.last() {
                    out.push(UseEntry {
                        name: Some(last.clone()),
                        segments: prefix.clone(),
                        leading_colon,
                        span: name.ident.span(),
                    });
                }
            } else {
                let mut segments = prefix.clone();
                segments.push(ident.clone());
                out.push(UseEntry {
                    name: Some(ident),
                    segments,
                    leading_colon,
                    span: name.ident.span(),
                });
            }
        }
        UseTree::Rename(rename) => {
            let alias = unraw(&rename.rename);
            if alias == "_" {
                return;
            }
            let ident = unraw(&rename.ident);
            let mut segments = prefix.clone();
            if ident != "self" {
                segments.push(ident);
            }
            if segments.is_empty() {
                return;
            }
            out.push(UseEntry {
                name: Some(alias),
                segments,
                leading_colon,
                span: rename.rename.span(),
            });
        }
        UseTree::Glob(glob) => {
            if prefix.is_empty() {
                return;
            }
            out.push(UseEntry {
                name: None,
                segments: prefix.clone(),
                leading_colon,
                span: glob.span(),
            });
        }
        UseTree::Group(group) => {
            for item in &group.items {
                walk(item, leading_colon, prefix, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(code: &str) -> Vec<(Option<String>, String)> {
        let item: ItemUse = syn::parse_str(code).expect("Failed to parse");
        flatten_use(&item)
            .into_iter()
            .map(|e| (e.name, e.segments.join("::")))
            .collect()
    }

    #[test]
    fn test_simple_use() {
        assert_eq!(
            flatten("use crate::config::Config;"),
            vec![(Some("Config".into()), "crate::config::Config".into())]
        );
    }

    #[test]
    fn test_group_rename_and_glob() {
        assert_eq!(
            flatten("use super::{a::B, c as d, e::*, self as parent};"),
            vec![
                (Some("B".into()), "super::a::B".into()),
                (Some("d".into()), "super::c".into()),
                (None, "super::e".into()),
                (Some("parent".into()), "super".into()),
            ]
        );
    }

    #[test]
    fn test_self_in_group() {
        assert_eq!(
            flatten("use crate::net::{self, Server};"),
            vec![
                (Some("net".into()), "crate::net".into()),
                (Some("Server".into()), "crate::net::Server".into()),
            ]
        );
    }

    #[test]
    fn test_underscore_import_is_skipped() {
        assert!(flatten("use std::fmt::Write as _;").is_empty());
    }

    #[test]
    fn test_leading_colon() {
        let item: ItemUse = syn::parse_str("use ::serde::Serialize;").unwrap();
        let entries = flatten_use(&item);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].leading_colon);
        assert_eq!(entries[0].segments, vec!["serde", "Serialize"]);
    }

    #[test]
    fn test_entries_point_at_imported_names() {
        let item: ItemUse = syn::parse_str("use a::{\n    b,\n    c as d,\n};").unwrap();
        let positions: Vec<_> = flatten_use(&item)
            .iter()
            .map(|e| (e.span.start().line, e.span.start().column))
            .collect();
        assert_eq!(positions, vec![(2, 4), (3, 9)]);
    }
}
