//! Module table: every scope, declaration and import across the source units.
//!
//! Paths are stored fully qualified, starting with the crate root name.
//! Function bodies get their own scopes whose lookups fall back to the
//! enclosing scope, so items declared inside a function are found before
//! module items of the same name. Function and impl segments are decorated
//! (`build()`, `<Config>`) so they never collide with module names.
//!
//! A module is *opaque* when its contents are not loaded: a `mod foo;`
//! declaration without a source unit for `foo`, or a parent module created
//! only because one of its children was loaded. Names that cannot be found in
//! an opaque module are unknowable rather than errors.

use crate::imports::{flatten_use, UseEntry};
use literal_finder_core::utils::{join_path, path_to_segments, unraw};
use literal_finder_core::{FindError, Location, SourceUnit};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use syn::parse::ParseStream;
use syn::punctuated::Punctuated;
use syn::visit::Visit;
use syn::{Attribute, Block, Expr, Fields, Item, Stmt, Token, Type};
use tracing::{debug, trace};

/// Fully qualified scope or item path.
pub(crate) type ScopePath = Vec<String>;

/// Budget for following imports, globs and aliases.
const MAX_DEPTH: usize = 32;

/// Kind of a type-namespace declaration.
#[derive(Debug, Clone)]
pub(crate) enum ItemKind {
    Struct { tuple: bool, fields: Vec<String> },
    Union { fields: Vec<String> },
    Enum { variants: Vec<String> },
    Alias(Box<Type>),
    Trait,
    Module,
}

impl ItemKind {
    fn describe(&self) -> &'static str {
        match self {
            Self::Struct { .. } => "struct",
            Self::Union { .. } => "union",
            Self::Enum { .. } => "enum",
            Self::Alias(_) => "type alias",
            Self::Trait => "trait",
            Self::Module => "module",
        }
    }

    /// Adds the fields of a `cfg`-alternative declaration of the same struct.
    fn merge(&mut self, other: ItemKind) {
        if let (
            Self::Struct { fields, .. } | Self::Union { fields },
            Self::Struct { fields: more, .. } | Self::Union { fields: more },
        ) = (self, other)
        {
            for field in more {
                if !fields.contains(&field) {
                    fields.push(field);
                }
            }
        }
    }
}

/// A declared item and where it was declared.
#[derive(Debug, Clone)]
pub(crate) struct Declared {
    pub kind: ItemKind,
    pub location: Location,
    /// Declared under `#[cfg(..)]`; may coexist with a same-named item.
    pub conditional: bool,
}

/// A `use` import recorded in a scope.
#[derive(Debug, Clone)]
pub(crate) struct Import {
    pub segments: Vec<String>,
    pub leading_colon: bool,
    pub location: Location,
}

/// One module or function scope.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    /// Enclosing scope for function bodies; `None` for modules.
    pub parent: Option<ScopePath>,
    /// Whether the scope's items were loaded.
    pub complete: bool,
    pub types: HashMap<String, Declared>,
    pub values: HashSet<String>,
    pub imports: HashMap<String, Import>,
    pub globs: Vec<Import>,
    /// Holds an item-position macro call, which may declare any name.
    pub macro_items: bool,
}

impl Scope {
    fn is_fn(&self) -> bool {
        self.parent.is_some()
    }
}

/// Outcome of looking a name up in a scope chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lookup {
    Found(ScopePath),
    /// Possibly provided by an opaque module or another crate's glob.
    Unknowable,
    Missing,
}

/// A resolved constructor target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolved {
    Named(ScopePath),
    Variant { owner: ScopePath, variant: String },
}

/// Values every module sees without an import.
const PRELUDE_VALUES: &[&str] = &[
    "Some",
    "None",
    "Ok",
    "Err",
    "drop",
    "size_of",
    "size_of_val",
    "align_of",
    "align_of_val",
];

/// Every scope in the analyzed sources, keyed by qualified path.
#[derive(Debug)]
pub(crate) struct ModuleTable {
    root: String,
    scopes: BTreeMap<ScopePath, Scope>,
    /// Lookups in progress, to cut import and glob cycles.
    active: RefCell<HashSet<(ScopePath, String)>>,
}

impl ModuleTable {
    /// Collects declarations from all units and validates them.
    ///
    /// # Errors
    ///
    /// Returns [`FindError::TypeResolution`] for a type-namespace name defined
    /// twice in one module, or a crate-local import that names nothing. When
    /// several imports are unresolved, the earliest location is reported.
    pub fn build(root: &str, units: &[SourceUnit]) -> Result<Self, FindError> {
        let mut table = Self {
            root: root.to_string(),
            scopes: BTreeMap::new(),
            active: RefCell::default(),
        };
        table.scopes.insert(vec![root.to_string()], Scope::default());

        for unit in units {
            let scope = table.unit_scope(unit);
            for depth in 1..scope.len() {
                table.scopes.entry(scope[..depth].to_vec()).or_default();
            }
            table.scopes.entry(scope.clone()).or_default().complete = true;

            let mut collector = Collector {
                table: &mut table,
                file: unit.filename(),
                scope,
                failure: None,
            };
            collector.visit_file(unit.ast());
            if let Some(err) = collector.failure {
                return Err(err);
            }
        }

        debug!("Collected {} scopes", table.scopes.len());
        table.validate_imports()?;
        Ok(table)
    }

    /// Qualified scope path of a unit.
    pub fn unit_scope(&self, unit: &SourceUnit) -> ScopePath {
        let mut scope = vec![self.root.clone()];
        scope.extend(unit.module_path().iter().cloned());
        scope
    }

    fn is_local(&self, path: &[String]) -> bool {
        path.first().is_some_and(|first| *first == self.root)
    }

    /// Returns true if `path` is a module, loaded or only declared.
    fn is_module(&self, path: &[String]) -> bool {
        match self.scopes.get(path) {
            Some(scope) => !scope.is_fn(),
            None => matches!(
                self.declared(path).map(|d| &d.kind),
                Some(ItemKind::Module)
            ),
        }
    }

    fn is_opaque(&self, path: &[String]) -> bool {
        match self.scopes.get(path) {
            Some(scope) => !scope.complete,
            None => self.is_module(path),
        }
    }

    /// Looks up a type-namespace declaration by qualified path.
    pub fn declared(&self, path: &[String]) -> Option<&Declared> {
        let (name, scope) = path.split_last()?;
        self.scopes.get(scope)?.types.get(name)
    }

    /// The nearest module enclosing `scope` (itself if it is a module).
    fn enclosing_module<'p>(&'p self, scope: &'p [String]) -> &'p [String] {
        let mut current = scope;
        while let Some(parent) = self.scopes.get(current).and_then(|s| s.parent.as_deref()) {
            current = parent;
        }
        current
    }

    /// Turns an import into a qualified path, relative to the scope holding it.
    fn canonical(&self, scope: &[String], import: &Import, depth: usize) -> ScopePath {
        let segments = &import.segments;
        let Some(first) = segments.first() else {
            return Vec::new();
        };
        if import.leading_colon {
            return segments.clone();
        }
        let module = self.enclosing_module(scope);
        let (mut path, rest) = match first.as_str() {
            "crate" => (vec![self.root.clone()], &segments[1..]),
            "self" => (module.to_vec(), &segments[1..]),
            "super" => {
                let mut path = module.to_vec();
                let mut rest = &segments[..];
                while rest.first().is_some_and(|s| s == "super") {
                    if path.len() > 1 {
                        path.pop();
                    }
                    rest = &rest[1..];
                }
                (path, rest)
            }
            name => match self.lookup(scope, name, depth + 1) {
                Lookup::Found(path) => (path, &segments[1..]),
                Lookup::Unknowable | Lookup::Missing => return segments.clone(),
            },
        };
        path.extend(rest.iter().cloned());
        path
    }

    /// Resolves an import to the item it finally names.
    fn resolve_import(&self, scope: &[String], import: &Import, depth: usize) -> Lookup {
        let path = self.canonical(scope, import, depth);
        if self.is_local(&path) {
            self.walk(&path, depth + 1)
        } else {
            Lookup::Found(path)
        }
    }

    /// Re-resolves a crate-local path segment by segment from the root.
    fn walk(&self, path: &[String], depth: usize) -> Lookup {
        let mut current = vec![self.root.clone()];
        for segment in path.iter().skip(1) {
            match self.step(&current, segment, depth + 1) {
                Ok(Some(next)) => current = next,
                Ok(None) => return Lookup::Unknowable,
                Err(_) => return Lookup::Missing,
            }
        }
        Lookup::Found(current)
    }

    /// Looks a name up in a single scope, following imports and globs.
    fn lookup_in(&self, scope: &[String], name: &str, depth: usize) -> Lookup {
        if depth > MAX_DEPTH {
            return Lookup::Unknowable;
        }
        let key = (scope.to_vec(), name.to_string());
        if !self.active.borrow_mut().insert(key.clone()) {
            // The outer lookup of the same name already covers this scope.
            return Lookup::Missing;
        }
        let found = self.lookup_in_scope(scope, name, depth);
        self.active.borrow_mut().remove(&key);
        found
    }

    fn lookup_in_scope(&self, scope: &[String], name: &str, depth: usize) -> Lookup {
        let Some(s) = self.scopes.get(scope) else {
            return if self.is_opaque(scope) {
                Lookup::Unknowable
            } else {
                Lookup::Missing
            };
        };

        let mut here = scope.to_vec();
        here.push(name.to_string());
        if s.types.contains_key(name) {
            return Lookup::Found(here);
        }
        if let Some(import) = s.imports.get(name) {
            return self.resolve_import(scope, import, depth + 1);
        }
        if !s.is_fn() && self.scopes.get(&here).is_some_and(|child| !child.is_fn()) {
            return Lookup::Found(here);
        }

        let mut unknowable = !s.complete;
        let mut external = Vec::new();
        for glob in &s.globs {
            let target = self.canonical(scope, glob, depth + 1);
            if !self.is_local(&target) {
                external.push(target);
                continue;
            }
            let target = match self.walk(&target, depth + 1) {
                Lookup::Found(target) => target,
                Lookup::Unknowable => {
                    unknowable = true;
                    continue;
                }
                Lookup::Missing => continue,
            };
            if !self.is_local(&target) {
                external.push(target);
                continue;
            }
            if let Some(ItemKind::Enum { variants }) = self.declared(&target).map(|d| &d.kind) {
                if variants.iter().any(|v| v == name) {
                    let mut variant = target;
                    variant.push(name.to_string());
                    return Lookup::Found(variant);
                }
                continue;
            }
            match self.lookup_in(&target, name, depth + 1) {
                Lookup::Found(path) => return Lookup::Found(path),
                Lookup::Unknowable => unknowable = true,
                Lookup::Missing => {}
            }
        }

        match (external.len(), unknowable) {
            (0, false) => Lookup::Missing,
            (1, false) => {
                let mut path = external.swap_remove(0);
                path.push(name.to_string());
                Lookup::Found(path)
            }
            _ => Lookup::Unknowable,
        }
    }

    /// Looks a name up from `scope` outwards through enclosing function scopes.
    fn lookup(&self, scope: &[String], name: &str, depth: usize) -> Lookup {
        let mut current = scope;
        loop {
            match self.lookup_in(current, name, depth) {
                Lookup::Missing => {}
                found => return found,
            }
            match self.scopes.get(current).and_then(|s| s.parent.as_deref()) {
                Some(parent) => current = parent,
                None => return Lookup::Missing,
            }
        }
    }

    /// Looks a value name (function, constant, static, unit or tuple struct)
    /// up from `scope` outwards.
    ///
    /// Scopes with globs, item macros or unloaded contents make a miss
    /// unknowable.
    pub fn lookup_value(&self, scope: &[String], name: &str) -> Lookup {
        let mut current = scope;
        loop {
            let Some(s) = self.scopes.get(current) else {
                return Lookup::Unknowable;
            };
            if s.values.contains(name) || s.imports.contains_key(name) {
                let mut path = current.to_vec();
                path.push(name.to_string());
                return Lookup::Found(path);
            }
            if !s.complete || s.macro_items || !s.globs.is_empty() {
                return Lookup::Unknowable;
            }
            match s.parent.as_deref() {
                Some(parent) => current = parent,
                None if PRELUDE_VALUES.contains(&name) => return Lookup::Unknowable,
                None => return Lookup::Missing,
            }
        }
    }

    /// Resolves a written path to a qualified one.
    ///
    /// Returns `Ok(None)` when the path leads into sources that were not
    /// loaded. Paths into other crates are returned as written.
    pub fn resolve_path(
        &self,
        scope: &[String],
        self_ty: Option<&[String]>,
        segments: &[String],
    ) -> Result<Option<ScopePath>, String> {
        self.resolve_path_at(scope, self_ty, segments, 0)
    }

    fn resolve_path_at(
        &self,
        scope: &[String],
        self_ty: Option<&[String]>,
        segments: &[String],
        depth: usize,
    ) -> Result<Option<ScopePath>, String> {
        let Some(first) = segments.first() else {
            return Err("empty path".to_string());
        };
        let module = self.enclosing_module(scope);
        let (mut current, rest) = match first.as_str() {
            "crate" => (vec![self.root.clone()], &segments[1..]),
            "self" => (module.to_vec(), &segments[1..]),
            "super" => {
                let mut path = module.to_vec();
                let mut rest = segments;
                while rest.first().is_some_and(|s| s == "super") {
                    if path.len() <= 1 {
                        return Err("too many leading `super` keywords".to_string());
                    }
                    path.pop();
                    rest = &rest[1..];
                }
                (path, rest)
            }
            "Self" => match self_ty {
                Some(path) => (path.to_vec(), &segments[1..]),
                None => return Err("`Self` is only available in impls".to_string()),
            },
            name => match self.lookup(scope, name, depth) {
                Lookup::Found(path) => (path, &segments[1..]),
                Lookup::Unknowable => return Ok(None),
                Lookup::Missing if segments.len() > 1 => return Ok(Some(segments.to_vec())),
                Lookup::Missing => {
                    return Err(format!("cannot find type `{name}` in this scope"));
                }
            },
        };

        for segment in rest {
            match self.step(&current, segment, depth)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Resolves one more path segment below `current`.
    fn step(
        &self,
        current: &[String],
        segment: &str,
        depth: usize,
    ) -> Result<Option<ScopePath>, String> {
        let Some(current) = self.follow_alias(current, depth)? else {
            return Ok(None);
        };
        let mut next = current.clone();
        next.push(segment.to_string());

        if !self.is_local(&current) {
            return Ok(Some(next));
        }
        if self.is_module(&current) {
            return match self.lookup_in(&current, segment, depth + 1) {
                Lookup::Found(path) => Ok(Some(path)),
                Lookup::Unknowable => Ok(None),
                Lookup::Missing => Err(format!(
                    "cannot find `{segment}` in module `{}`",
                    display_path(&current)
                )),
            };
        }
        match self.declared(&current).map(|d| &d.kind) {
            Some(ItemKind::Enum { variants }) => {
                if variants.iter().any(|v| v == segment) {
                    Ok(Some(next))
                } else {
                    Err(format!(
                        "no variant named `{segment}` in enum `{}`",
                        display_path(&current)
                    ))
                }
            }
            Some(kind) => Err(format!(
                "`{}` is a {}, not a module or enum",
                display_path(&current),
                kind.describe()
            )),
            None => Err(format!("cannot find `{}`", display_path(&current))),
        }
    }

    /// Replaces a type alias with the path it stands for.
    fn follow_alias(&self, path: &[String], depth: usize) -> Result<Option<ScopePath>, String> {
        let Some(Declared {
            kind: ItemKind::Alias(ty),
            ..
        }) = self.declared(path)
        else {
            return Ok(Some(path.to_vec()));
        };
        if depth > MAX_DEPTH {
            return Err(format!("cycle in type alias `{}`", display_path(path)));
        }
        let Type::Path(type_path) = ty.as_ref() else {
            return Err(format!(
                "type alias `{}` does not name a struct",
                display_path(path)
            ));
        };
        if type_path.qself.is_some() {
            return Ok(None);
        }
        let scope = &path[..path.len() - 1];
        let segments = path_to_segments(&type_path.path);
        match self.resolve_path_at(scope, None, &segments, depth + 1)? {
            Some(target) => self.follow_alias(&target, depth + 1),
            None => Ok(None),
        }
    }

    /// Resolves the type constructed by a struct literal path.
    ///
    /// Returns `Ok(None)` when the path leads into unloaded sources.
    ///
    /// # Errors
    ///
    /// Returns a message if the path cannot be found or names something
    /// other than a struct, union or enum variant.
    pub fn resolve_struct(
        &self,
        scope: &[String],
        self_ty: Option<&[String]>,
        segments: &[String],
    ) -> Result<Option<Resolved>, String> {
        let Some(path) = self.resolve_path(scope, self_ty, segments)? else {
            return Ok(None);
        };
        let Some(path) = self.follow_alias(&path, 0)? else {
            return Ok(None);
        };
        if !self.is_local(&path) {
            return Ok(Some(Resolved::Named(path)));
        }
        match self.declared(&path).map(|d| &d.kind) {
            Some(ItemKind::Struct { .. } | ItemKind::Union { .. }) => {
                Ok(Some(Resolved::Named(path)))
            }
            Some(kind) => Err(format!(
                "expected struct, variant or union type, found {} `{}`",
                kind.describe(),
                display_path(&path)
            )),
            None => self.variant_of(&path).map(Some).ok_or_else(|| {
                format!(
                    "expected struct, variant or union type, found `{}`",
                    display_path(&path)
                )
            }),
        }
    }

    /// Resolves the callee of a call expression, if it is a tuple constructor.
    pub fn resolve_constructor(
        &self,
        scope: &[String],
        self_ty: Option<&[String]>,
        segments: &[String],
    ) -> Option<Resolved> {
        let path = self.resolve_path(scope, self_ty, segments).ok()??;
        let path = self.follow_alias(&path, 0).ok()??;
        if !self.is_local(&path) {
            let camel = path
                .last()
                .and_then(|name| name.chars().next())
                .is_some_and(char::is_uppercase);
            return camel.then_some(Resolved::Named(path));
        }
        match self.declared(&path).map(|d| &d.kind) {
            Some(ItemKind::Struct { tuple: true, .. }) => Some(Resolved::Named(path)),
            Some(_) => None,
            None => self.variant_of(&path),
        }
    }

    /// Declared field names of a crate-local struct or union.
    pub fn fields_of(&self, path: &[String]) -> Option<&[String]> {
        match self.declared(path).map(|d| &d.kind) {
            Some(ItemKind::Struct { fields, .. } | ItemKind::Union { fields }) => Some(fields),
            _ => None,
        }
    }

    fn variant_of(&self, path: &[String]) -> Option<Resolved> {
        let (variant, owner) = path.split_last()?;
        match self.declared(owner).map(|d| &d.kind) {
            Some(ItemKind::Enum { variants }) if variants.contains(variant) => {
                Some(Resolved::Variant {
                    owner: owner.to_vec(),
                    variant: variant.clone(),
                })
            }
            _ => None,
        }
    }

    fn validate_imports(&self) -> Result<(), FindError> {
        let mut first: Option<(Location, String)> = None;
        for (path, scope) in &self.scopes {
            let named = scope.imports.values().map(|i| (i, false));
            let globs = scope.globs.iter().map(|i| (i, true));
            for (import, glob) in named.chain(globs) {
                if let Err(message) = self.check_import(path, import, glob) {
                    let earlier = first
                        .as_ref()
                        .map_or(true, |(location, _)| import.location < *location);
                    if earlier {
                        first = Some((import.location.clone(), message));
                    }
                }
            }
        }
        match first {
            Some((location, message)) => Err(FindError::TypeResolution { location, message }),
            None => Ok(()),
        }
    }

    fn check_import(&self, scope: &[String], import: &Import, glob: bool) -> Result<(), String> {
        let full = self.canonical(scope, import, 0);
        if !self.is_local(&full) || full.len() < 2 {
            return Ok(());
        }
        let unresolved =
            |reason: String| format!("unresolved import `{}`: {reason}", display_path(&full));

        let (name, parents) = match full.split_last() {
            Some((name, parents)) if !glob => (Some(name), parents),
            _ => (None, &full[..]),
        };

        let mut current = vec![self.root.clone()];
        for segment in parents.iter().skip(1) {
            match self.step(&current, segment, 0).map_err(unresolved)? {
                Some(next) => current = next,
                None => return Ok(()),
            }
        }
        if !self.is_local(&current) {
            return Ok(());
        }

        let Some(name) = name else {
            let is_enum = matches!(
                self.declared(&current).map(|d| &d.kind),
                Some(ItemKind::Enum { .. })
            );
            if self.is_module(&current) || is_enum {
                return Ok(());
            }
            return Err(unresolved("glob target is not a module or enum".to_string()));
        };

        if self.is_opaque(&current) {
            return Ok(());
        }
        let mut child = current.clone();
        child.push(name.clone());
        if let Some(s) = self.scopes.get(&current) {
            let found = s.types.contains_key(name)
                || s.values.contains(name)
                || s.imports.contains_key(name)
                || !s.globs.is_empty()
                || self.scopes.get(&child).is_some_and(|c| !c.is_fn());
            return if found {
                Ok(())
            } else {
                Err(unresolved(format!(
                    "no `{name}` in module `{}`",
                    display_path(&current)
                )))
            };
        }
        if self.variant_of(&child).is_some() {
            return Ok(());
        }
        Err(unresolved(format!(
            "`{}` is not a module or enum",
            display_path(&current)
        )))
    }
}

/// Renders a qualified path the way `std::any::type_name` would.
pub(crate) fn display_path(path: &[String]) -> String {
    let plain: Vec<&str> = path
        .iter()
        .map(|segment| {
            let segment = segment.strip_suffix("()").unwrap_or(segment);
            segment
                .strip_prefix('<')
                .and_then(|s| s.strip_suffix('>'))
                .unwrap_or(segment)
        })
        .collect();
    join_path(&plain)
}

/// Scope segment for a function body.
pub(crate) fn fn_segment(ident: &syn::Ident) -> String {
    format!("{}()", unraw(ident))
}

/// Scope segment for the functions of an `impl` block.
pub(crate) fn impl_segment(self_ty: &Type) -> String {
    let name = match self_ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map_or_else(|| "_".to_string(), |s| unraw(&s.ident)),
        Type::Reference(reference) => return impl_segment(&reference.elem),
        _ => "_".to_string(),
    };
    format!("<{name}>")
}

/// Scope segment for the default methods of a trait.
pub(crate) fn trait_segment(ident: &syn::Ident) -> String {
    format!("<{}>", unraw(ident))
}

/// Macros whose arguments after the first are patterns, not expressions.
const PATTERN_MACROS: &[&str] = &["matches", "assert_matches", "debug_assert_matches"];

/// Parses a function-like macro body into the statements it evaluates.
///
/// Accepted shapes, tried in order:
/// - `matches!(expr, pattern)` and its assert forms: only `expr`
/// - comma-separated expressions: `assert_eq!(a, b)`, `vec![a, b]`
/// - the repeat form `vec![value; count]`
/// - a statement list: `thread_scope! { let a = 1; a }`
///
/// Returns `None` for bodies that are none of these, such as `macro_rules!`
/// rules or custom token syntax.
pub(crate) fn macro_body(mac: &syn::Macro) -> Option<Vec<Stmt>> {
    let is_pattern_macro = mac
        .path
        .segments
        .last()
        .is_some_and(|s| PATTERN_MACROS.contains(&unraw(&s.ident).as_str()));
    if is_pattern_macro {
        return parse_macro(mac, scrutinee);
    }
    parse_macro(mac, expr_list)
        .or_else(|| parse_macro(mac, repeat))
        .or_else(|| parse_macro(mac, Block::parse_within))
        .or_else(|| {
            trace!(
                "Skipping body of `{}!`: not expressions or statements",
                join_path(&path_to_segments(&mac.path))
            );
            None
        })
}

fn parse_macro(
    mac: &syn::Macro,
    parser: fn(ParseStream<'_>) -> syn::Result<Vec<Stmt>>,
) -> Option<Vec<Stmt>> {
    mac.parse_body_with(parser).ok()
}

fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(expr, None)
}

fn scrutinee(input: ParseStream<'_>) -> syn::Result<Vec<Stmt>> {
    let expr: Expr = input.parse()?;
    input.parse::<Token![,]>()?;
    input.parse::<proc_macro2::TokenStream>()?;
    Ok(vec![expr_stmt(expr)])
}

fn expr_list(input: ParseStream<'_>) -> syn::Result<Vec<Stmt>> {
    let exprs = Punctuated::<Expr, Token![,]>::parse_terminated(input)?;
    Ok(exprs.into_iter().map(expr_stmt).collect())
}

fn repeat(input: ParseStream<'_>) -> syn::Result<Vec<Stmt>> {
    let value: Expr = input.parse()?;
    input.parse::<Token![;]>()?;
    let count: Expr = input.parse()?;
    Ok(vec![expr_stmt(value), expr_stmt(count)])
}

fn named_fields<'a>(fields: impl Iterator<Item = &'a syn::Field>) -> Vec<String> {
    fields
        .filter_map(|field| field.ident.as_ref().map(unraw))
        .collect()
}

fn is_conditional(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident("cfg"))
}

/// Records declarations and imports of one source unit.
struct Collector<'t> {
    table: &'t mut ModuleTable,
    file: &'t Path,
    scope: ScopePath,
    failure: Option<FindError>,
}

impl Collector<'_> {
    fn current(&mut self) -> &mut Scope {
        self.table.scopes.entry(self.scope.clone()).or_default()
    }

    fn declare(&mut self, ident: &syn::Ident, attrs: &[Attribute], kind: ItemKind) {
        let name = unraw(ident);
        let declared = Declared {
            kind,
            location: Location::from_span(self.file, ident.span()),
            conditional: is_conditional(attrs),
        };
        let scope = self.current();
        let in_fn = scope.is_fn();
        let message = match scope.types.get_mut(&name) {
            None => {
                trace!("Declared {} `{name}`", declared.kind.describe());
                scope.types.insert(name, declared);
                return;
            }
            Some(previous) if in_fn || previous.conditional || declared.conditional => {
                previous.kind.merge(declared.kind);
                return;
            }
            Some(previous) => format!(
                "the name `{name}` is defined multiple times (first defined at {})",
                previous.location
            ),
        };
        if self.failure.is_none() {
            self.failure = Some(FindError::TypeResolution {
                location: declared.location,
                message,
            });
        }
    }

    fn declare_value(&mut self, ident: &syn::Ident) {
        let name = unraw(ident);
        self.current().values.insert(name);
    }

    fn import(&mut self, entry: UseEntry) {
        let import = Import {
            segments: entry.segments,
            leading_colon: entry.leading_colon,
            location: Location::from_span(self.file, entry.span),
        };
        let scope = self.current();
        match entry.name {
            Some(name) => {
                scope.imports.insert(name, import);
            }
            None => scope.globs.push(import),
        }
    }

    /// Enters a function scope below the current one; returns the outer scope.
    fn enter_fn(&mut self, segments: &[String]) -> ScopePath {
        let parent = self.scope.clone();
        let mut scope = parent.clone();
        scope.extend(segments.iter().cloned());
        let entry = self.table.scopes.entry(scope.clone()).or_default();
        entry.parent = Some(parent.clone());
        entry.complete = true;
        self.scope = scope;
        parent
    }
}

impl<'ast> Visit<'ast> for Collector<'_> {
    fn visit_item(&mut self, node: &'ast Item) {
        if self.failure.is_some() {
            return;
        }
        match node {
            Item::Struct(s) => {
                if !matches!(s.fields, Fields::Named(_)) {
                    self.declare_value(&s.ident);
                }
                let tuple = matches!(s.fields, Fields::Unnamed(_));
                let fields = named_fields(s.fields.iter());
                self.declare(&s.ident, &s.attrs, ItemKind::Struct { tuple, fields });
            }
            Item::Enum(e) => {
                let variants = e.variants.iter().map(|v| unraw(&v.ident)).collect();
                self.declare(&e.ident, &e.attrs, ItemKind::Enum { variants });
            }
            Item::Union(u) => {
                let fields = named_fields(u.fields.named.iter());
                self.declare(&u.ident, &u.attrs, ItemKind::Union { fields });
            }
            Item::Type(t) => self.declare(&t.ident, &t.attrs, ItemKind::Alias(t.ty.clone())),
            Item::Trait(t) => self.declare(&t.ident, &t.attrs, ItemKind::Trait),
            Item::TraitAlias(t) => self.declare(&t.ident, &t.attrs, ItemKind::Trait),
            Item::Mod(m) => self.declare(&m.ident, &m.attrs, ItemKind::Module),
            Item::Fn(f) => self.declare_value(&f.sig.ident),
            Item::Const(c) => self.declare_value(&c.ident),
            Item::Static(s) => self.declare_value(&s.ident),
            Item::Macro(m) if m.ident.is_none() => self.current().macro_items = true,
            Item::Macro(m) => {
                if let Some(ident) = &m.ident {
                    self.declare_value(ident);
                    let root = vec![self.table.root.clone()];
                    self.table
                        .scopes
                        .entry(root)
                        .or_default()
                        .values
                        .insert(unraw(ident));
                }
            }
            Item::ForeignMod(f) => {
                for item in &f.items {
                    match item {
                        syn::ForeignItem::Fn(func) => self.declare_value(&func.sig.ident),
                        syn::ForeignItem::Static(s) => self.declare_value(&s.ident),
                        _ => {}
                    }
                }
            }
            Item::Use(u) => {
                for entry in flatten_use(u) {
                    self.import(entry);
                }
            }
            Item::ExternCrate(e) => {
                let crate_name = unraw(&e.ident);
                let name = e
                    .rename
                    .as_ref()
                    .map_or_else(|| crate_name.clone(), |(_, alias)| unraw(alias));
                let (segments, leading_colon) = if crate_name == "self" {
                    (vec!["crate".to_string()], false)
                } else {
                    (vec![crate_name], true)
                };
                self.import(UseEntry {
                    name: Some(name),
                    segments,
                    leading_colon,
                    span: e.ident.span(),
                });
            }
            _ => {}
        }
        syn::visit::visit_item(self, node);
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        let Some((_, items)) = &node.content else {
            return;
        };
        let mut scope = self.scope.clone();
        scope.push(unraw(&node.ident));
        self.table.scopes.entry(scope.clone()).or_default().complete = true;

        let outer = std::mem::replace(&mut self.scope, scope);
        for item in items {
            self.visit_item(item);
        }
        self.scope = outer;
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        let outer = self.enter_fn(&[fn_segment(&node.sig.ident)]);
        self.visit_block(&node.block);
        self.scope = outer;
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let segment = impl_segment(&node.self_ty);
        for item in &node.items {
            if let syn::ImplItem::Fn(f) = item {
                let outer = self.enter_fn(&[segment.clone(), fn_segment(&f.sig.ident)]);
                self.visit_block(&f.block);
                self.scope = outer;
            }
        }
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        let segment = trait_segment(&node.ident);
        for item in &node.items {
            if let syn::TraitItem::Fn(f) = item {
                if let Some(block) = &f.default {
                    let outer = self.enter_fn(&[segment.clone(), fn_segment(&f.sig.ident)]);
                    self.visit_block(block);
                    self.scope = outer;
                }
            }
        }
    }

    fn visit_stmt_macro(&mut self, node: &'ast syn::StmtMacro) {
        if macro_body(&node.mac).is_none() {
            self.current().macro_items = true;
        }
        self.visit_macro(&node.mac);
    }

    fn visit_macro(&mut self, node: &'ast syn::Macro) {
        if let Some(stmts) = macro_body(node) {
            for stmt in &stmts {
                self.visit_stmt(stmt);
            }
        }
    }
}
