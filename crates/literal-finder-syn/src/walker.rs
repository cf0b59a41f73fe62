//! Expression walker: reports every expression of a unit with its type.

use crate::scope::{
    display_path, fn_segment, impl_segment, macro_body, trait_segment, Lookup, ModuleTable,
    Resolved, ScopePath,
};
use literal_finder_core::utils::{path_to_segments, unraw};
use literal_finder_core::{ExprVisitor, FindError, Location, ResolvedExpr, ResolvedType};
use std::collections::HashSet;
use std::path::Path;
use syn::spanned::Spanned;
use syn::visit::Visit;
use syn::{Expr, ExprPath, ExprStruct, ImplItem, Item, Member, TraitItem, Type};

/// What `Self` means at the current position.
enum SelfTy {
    /// Inside an impl; the self type is resolved from `scope` on demand.
    Impl { ty: Box<Type>, scope: ScopePath },
    /// Inside a trait, where `Self` is any implementor.
    Trait,
}

pub(crate) struct Walker<'t> {
    table: &'t ModuleTable,
    unit: usize,
    file: &'t Path,
    scope: ScopePath,
    self_stack: Vec<SelfTy>,
    /// Pattern bindings and const parameters of the enclosing items.
    locals: Vec<HashSet<String>>,
    /// Depth of macro bodies being walked; names there may be macro input.
    macro_depth: usize,
    visitor: &'t mut dyn ExprVisitor,
    failure: Option<FindError>,
}

impl<'t> Walker<'t> {
    pub fn new(
        table: &'t ModuleTable,
        unit: usize,
        file: &'t Path,
        scope: ScopePath,
        visitor: &'t mut dyn ExprVisitor,
    ) -> Self {
        Self {
            table,
            unit,
            file,
            scope,
            self_stack: Vec::new(),
            locals: Vec::new(),
            macro_depth: 0,
            visitor,
            failure: None,
        }
    }

    /// Walks a whole file, stopping at the first failure.
    pub fn run(mut self, ast: &syn::File) -> Result<(), FindError> {
        self.visit_file(ast);
        match self.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn resolution_error(&self, node: &impl Spanned, message: String) -> FindError {
        FindError::TypeResolution {
            location: Location::from_span(self.file, node.span()),
            message,
        }
    }

    /// Qualified path of `Self`; `Ok(None)` if it cannot be known.
    fn self_path(&self) -> Result<Option<ScopePath>, String> {
        match self.self_stack.last() {
            Some(SelfTy::Impl { ty, scope }) => match ty.as_ref() {
                Type::Path(type_path) if type_path.qself.is_none() => {
                    let segments = path_to_segments(&type_path.path);
                    self.table.resolve_path(scope, None, &segments)
                }
                _ => Ok(None),
            },
            Some(SelfTy::Trait) => Ok(None),
            None => Err("`Self` is only available in impls".to_string()),
        }
    }

    fn resolve_type(&self, expr: &Expr) -> Result<ResolvedType, FindError> {
        match expr {
            Expr::Struct(s) if s.qself.is_none() => {
                let segments = path_to_segments(&s.path);
                let self_ty = if segments.first().is_some_and(|first| first == "Self") {
                    match self.self_path() {
                        Ok(Some(path)) => Some(path),
                        Ok(None) => return Ok(ResolvedType::Unknown),
                        Err(message) => return Err(self.resolution_error(&s.path, message)),
                    }
                } else {
                    None
                };
                let resolved = self
                    .table
                    .resolve_struct(&self.scope, self_ty.as_deref(), &segments)
                    .map_err(|message| self.resolution_error(&s.path, message))?;
                if let Some(Resolved::Named(path)) = &resolved {
                    self.check_fields(path, s)?;
                }
                Ok(to_resolved_type(resolved))
            }
            Expr::Call(call) => {
                let Expr::Path(func) = call.func.as_ref() else {
                    return Ok(ResolvedType::Unknown);
                };
                if func.qself.is_some() {
                    return Ok(ResolvedType::Unknown);
                }
                let segments = path_to_segments(&func.path);
                let self_ty = if segments.first().is_some_and(|first| first == "Self") {
                    match self.self_path() {
                        Ok(Some(path)) => Some(path),
                        _ => return Ok(ResolvedType::Unknown),
                    }
                } else {
                    None
                };
                let resolved =
                    self.table
                        .resolve_constructor(&self.scope, self_ty.as_deref(), &segments);
                Ok(to_resolved_type(resolved))
            }
            Expr::Path(path) => {
                self.check_value(path)?;
                Ok(ResolvedType::Unknown)
            }
            _ => Ok(ResolvedType::Unknown),
        }
    }

    /// A bare identifier must be a local binding or a declared value.
    fn check_value(&self, expr: &ExprPath) -> Result<(), FindError> {
        if self.macro_depth > 0
            || expr.qself.is_some()
            || expr.path.leading_colon.is_some()
            || expr.path.segments.len() != 1
        {
            return Ok(());
        }
        let Some(segment) = expr.path.segments.first() else {
            return Ok(());
        };
        let name = unraw(&segment.ident);
        if name == "self" || name == "Self" || self.locals.iter().any(|set| set.contains(&name)) {
            return Ok(());
        }
        match self.table.lookup_value(&self.scope, &name) {
            Lookup::Missing => Err(self.resolution_error(
                &expr.path,
                format!("cannot find value `{name}` in this scope"),
            )),
            Lookup::Found(_) | Lookup::Unknowable => Ok(()),
        }
    }

    /// Every named field of a literal must be declared by its local struct.
    fn check_fields(&self, path: &[String], literal: &ExprStruct) -> Result<(), FindError> {
        let Some(declared) = self.table.fields_of(path) else {
            return Ok(());
        };
        for field in &literal.fields {
            let Member::Named(ident) = &field.member else {
                continue;
            };
            let name = unraw(ident);
            if !declared.contains(&name) {
                return Err(self.resolution_error(
                    ident,
                    format!("`{}` has no field named `{name}`", display_path(path)),
                ));
            }
        }
        Ok(())
    }

    fn on_expr(&mut self, expr: &Expr) {
        let ty = match self.resolve_type(expr) {
            Ok(ty) => ty,
            Err(err) => {
                self.failure = Some(err);
                return;
            }
        };
        let constant = match expr {
            Expr::Lit(lit) => Some(&lit.lit),
            _ => None,
        };
        let resolved = ResolvedExpr {
            unit: self.unit,
            file: self.file,
            expr,
            ty: &ty,
            constant,
        };
        if let Err(err) = self.visitor.visit(&resolved) {
            self.failure = Some(err);
        }
    }

    fn walk_fn_body(&mut self, segments: &[String], block: &syn::Block) {
        let depth = self.scope.len();
        self.scope.extend(segments.iter().cloned());
        self.visit_block(block);
        self.scope.truncate(depth);
    }
}

fn to_resolved_type(resolved: Option<Resolved>) -> ResolvedType {
    match resolved {
        Some(Resolved::Named(path)) => ResolvedType::Named(display_path(&path)),
        Some(Resolved::Variant { owner, variant }) => ResolvedType::Variant {
            owner: display_path(&owner),
            variant,
        },
        None => ResolvedType::Unknown,
    }
}

/// Names bound by patterns and const generic parameters within an item.
#[derive(Default)]
struct Bindings(HashSet<String>);

impl Bindings {
    fn of(item: &Item) -> HashSet<String> {
        let mut bindings = Self::default();
        bindings.visit_item(item);
        bindings.0
    }
}

impl<'ast> Visit<'ast> for Bindings {
    fn visit_pat_ident(&mut self, node: &'ast syn::PatIdent) {
        self.0.insert(unraw(&node.ident));
        syn::visit::visit_pat_ident(self, node);
    }

    fn visit_const_param(&mut self, node: &'ast syn::ConstParam) {
        self.0.insert(unraw(&node.ident));
        syn::visit::visit_const_param(self, node);
    }

    fn visit_macro(&mut self, node: &'ast syn::Macro) {
        if let Some(stmts) = macro_body(node) {
            for stmt in &stmts {
                self.visit_stmt(stmt);
            }
        }
    }
}

impl<'ast> Visit<'ast> for Walker<'_> {
    fn visit_item(&mut self, node: &'ast Item) {
        if self.failure.is_some() {
            return;
        }
        if let Item::Mod(_) = node {
            syn::visit::visit_item(self, node);
            return;
        }
        self.locals.push(Bindings::of(node));
        syn::visit::visit_item(self, node);
        self.locals.pop();
    }

    fn visit_expr(&mut self, node: &'ast Expr) {
        if self.failure.is_some() {
            return;
        }
        self.on_expr(node);
        if self.failure.is_none() {
            syn::visit::visit_expr(self, node);
        }
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        let Some((_, items)) = &node.content else {
            return;
        };
        self.scope.push(unraw(&node.ident));
        for item in items {
            self.visit_item(item);
        }
        self.scope.pop();
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.walk_fn_body(&[fn_segment(&node.sig.ident)], &node.block);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let segment = impl_segment(&node.self_ty);
        self.self_stack.push(SelfTy::Impl {
            ty: node.self_ty.clone(),
            scope: self.scope.clone(),
        });
        for item in &node.items {
            match item {
                ImplItem::Fn(f) => {
                    self.walk_fn_body(&[segment.clone(), fn_segment(&f.sig.ident)], &f.block);
                }
                ImplItem::Const(c) => self.visit_expr(&c.expr),
                _ => {}
            }
        }
        self.self_stack.pop();
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        let segment = trait_segment(&node.ident);
        self.self_stack.push(SelfTy::Trait);
        for item in &node.items {
            match item {
                TraitItem::Fn(f) => {
                    if let Some(block) = &f.default {
                        self.walk_fn_body(&[segment.clone(), fn_segment(&f.sig.ident)], block);
                    }
                }
                TraitItem::Const(c) => {
                    if let Some((_, expr)) = &c.default {
                        self.visit_expr(expr);
                    }
                }
                _ => {}
            }
        }
        self.self_stack.pop();
    }

    fn visit_macro(&mut self, node: &'ast syn::Macro) {
        if self.failure.is_some() {
            return;
        }
        if let Some(stmts) = macro_body(node) {
            self.macro_depth += 1;
            for stmt in &stmts {
                self.visit_stmt(stmt);
            }
            self.macro_depth -= 1;
        }
    }
}
