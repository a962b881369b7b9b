//! Undeclared-variable analysis.
//!
//! A flow-insensitive scope walk: bindings introduced anywhere in a scope
//! (`set` targets, macro names, import targets) are visible throughout it,
//! so only names with no local binding at all count as undeclared. New
//! scopes open for the bodies of `for`, `macro`, `call`, `with`, `block`
//! and the block form of `set`; `if`, `autoescape` and `filter` sections
//! share their enclosing scope.

use std::collections::BTreeSet;

use jinjagv_templates::ast::AssignTarget;
use jinjagv_templates::ast::FilterCall;
use jinjagv_templates::ast::Stmt;
use jinjagv_templates::expr::Expr;
use rustc_hash::FxHashSet;

use crate::env::Environment;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Analysis is meaningless when a referenced filter does not resolve,
    /// so it fails as a whole rather than guessing.
    #[error("no filter named {name:?}")]
    UnknownFilter { name: String },
}

/// Names referenced in `body` with no binding in any enclosing scope.
pub(crate) fn find_undeclared(
    body: &[Stmt],
    env: &Environment,
) -> Result<BTreeSet<String>, AnalysisError> {
    let mut walker = ScopeWalker {
        env,
        undeclared: BTreeSet::new(),
    };
    walker.walk_scope(body, &FxHashSet::default(), &[])?;
    Ok(walker.undeclared)
}

struct ScopeWalker<'a> {
    env: &'a Environment,
    undeclared: BTreeSet<String>,
}

impl ScopeWalker<'_> {
    /// Open a child scope over `body`, seeded with the outer bindings plus
    /// `extra`, and walk its statements.
    fn walk_scope(
        &mut self,
        body: &[Stmt],
        outer: &FxHashSet<String>,
        extra: &[String],
    ) -> Result<(), AnalysisError> {
        let bound = scope_bindings(body, outer, extra);
        for stmt in body {
            self.walk_stmt(stmt, &bound)?;
        }
        Ok(())
    }

    fn walk_stmt(&mut self, stmt: &Stmt, bound: &FxHashSet<String>) -> Result<(), AnalysisError> {
        match stmt {
            Stmt::Text { .. } | Stmt::Comment { .. } | Stmt::Raw { .. } => Ok(()),
            Stmt::Output { expr, .. }
            | Stmt::Extends { template: expr, .. }
            | Stmt::Include { template: expr, .. }
            | Stmt::Import { template: expr, .. }
            | Stmt::FromImport { template: expr, .. }
            | Stmt::Do { expr, .. } => self.check_expr(expr, bound),
            Stmt::Block { body, .. } => self.walk_scope(body, bound, &[]),
            Stmt::Macro { params, body, .. } => {
                for param in params {
                    if let Some(default) = &param.default {
                        self.check_expr(default, bound)?;
                    }
                }
                let mut extra: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
                extra.extend(["varargs", "kwargs", "caller"].map(String::from));
                self.walk_scope(body, bound, &extra)
            }
            Stmt::For {
                targets,
                iter,
                filter,
                body,
                else_body,
                ..
            } => {
                self.check_expr(iter, bound)?;
                let mut extra = targets.clone();
                extra.push("loop".to_string());
                let inner = scope_bindings(body, bound, &extra);
                if let Some(filter) = filter {
                    self.check_expr(filter, &inner)?;
                }
                for stmt in body {
                    self.walk_stmt(stmt, &inner)?;
                }
                self.walk_scope(else_body, bound, &[])
            }
            Stmt::If {
                arms, else_body, ..
            } => {
                for (cond, body) in arms {
                    self.check_expr(cond, bound)?;
                    for stmt in body {
                        self.walk_stmt(stmt, bound)?;
                    }
                }
                for stmt in else_body {
                    self.walk_stmt(stmt, bound)?;
                }
                Ok(())
            }
            Stmt::Set { targets, value, .. } => {
                self.check_expr(value, bound)?;
                self.check_target_bases(targets, bound);
                Ok(())
            }
            Stmt::SetBlock {
                target,
                filters,
                body,
                ..
            } => {
                self.check_filters(filters, bound)?;
                self.check_target_bases(std::slice::from_ref(target), bound);
                self.walk_scope(body, bound, &[])
            }
            Stmt::With { bindings, body, .. } => {
                let mut extra = Vec::new();
                for (target, value) in bindings {
                    self.check_expr(value, bound)?;
                    self.check_target_bases(std::slice::from_ref(target), bound);
                    if let AssignTarget::Name(name) = target {
                        extra.push(name.clone());
                    }
                }
                self.walk_scope(body, bound, &extra)
            }
            Stmt::FilterBlock { filters, body, .. } => {
                self.check_filters(filters, bound)?;
                for stmt in body {
                    self.walk_stmt(stmt, bound)?;
                }
                Ok(())
            }
            Stmt::CallBlock {
                params, call, body, ..
            } => {
                for param in params {
                    if let Some(default) = &param.default {
                        self.check_expr(default, bound)?;
                    }
                }
                self.check_expr(call, bound)?;
                let mut extra: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
                extra.push("caller".to_string());
                self.walk_scope(body, bound, &extra)
            }
            Stmt::Autoescape { value, body, .. } => {
                self.check_expr(value, bound)?;
                for stmt in body {
                    self.walk_stmt(stmt, bound)?;
                }
                Ok(())
            }
        }
    }

    /// An attribute target like `ns.key` reads `ns`; a plain name target
    /// is a binding, already hoisted.
    fn check_target_bases(&mut self, targets: &[AssignTarget], bound: &FxHashSet<String>) {
        for target in targets {
            if let AssignTarget::Attr { base, .. } = target {
                if !bound.contains(base) {
                    self.undeclared.insert(base.clone());
                }
            }
        }
    }

    fn check_filters(
        &mut self,
        filters: &[FilterCall],
        bound: &FxHashSet<String>,
    ) -> Result<(), AnalysisError> {
        for filter in filters {
            if !self.env.has_filter(&filter.name) {
                return Err(AnalysisError::UnknownFilter {
                    name: filter.name.clone(),
                });
            }
            for arg in &filter.args {
                self.check_expr(arg, bound)?;
            }
        }
        Ok(())
    }

    fn check_expr(&mut self, expr: &Expr, bound: &FxHashSet<String>) -> Result<(), AnalysisError> {
        match expr {
            Expr::Const(_) => Ok(()),
            Expr::Name(name) => {
                if !bound.contains(name) {
                    self.undeclared.insert(name.clone());
                }
                Ok(())
            }
            Expr::Attr { obj, .. } => self.check_expr(obj, bound),
            Expr::Unary { value, .. } => self.check_expr(value, bound),
            Expr::Item { obj, index } => {
                self.check_expr(obj, bound)?;
                self.check_expr(index, bound)
            }
            Expr::Call {
                callee,
                args,
                kwargs,
            } => {
                self.check_expr(callee, bound)?;
                for arg in args {
                    self.check_expr(arg, bound)?;
                }
                for (_, value) in kwargs {
                    self.check_expr(value, bound)?;
                }
                Ok(())
            }
            Expr::Filter {
                value,
                name,
                args,
                kwargs,
            } => {
                if !self.env.has_filter(name) {
                    return Err(AnalysisError::UnknownFilter { name: name.clone() });
                }
                self.check_expr(value, bound)?;
                for arg in args {
                    self.check_expr(arg, bound)?;
                }
                for (_, value) in kwargs {
                    self.check_expr(value, bound)?;
                }
                Ok(())
            }
            Expr::Test { value, args, .. } => {
                self.check_expr(value, bound)?;
                for arg in args {
                    self.check_expr(arg, bound)?;
                }
                Ok(())
            }
            Expr::Binary { left, right, .. } => {
                self.check_expr(left, bound)?;
                self.check_expr(right, bound)
            }
            Expr::Cond {
                test,
                then,
                otherwise,
            } => {
                self.check_expr(test, bound)?;
                self.check_expr(then, bound)?;
                if let Some(otherwise) = otherwise {
                    self.check_expr(otherwise, bound)?;
                }
                Ok(())
            }
            Expr::List(items) | Expr::Tuple(items) => {
                for item in items {
                    self.check_expr(item, bound)?;
                }
                Ok(())
            }
            Expr::Dict(pairs) => {
                for (key, value) in pairs {
                    self.check_expr(key, bound)?;
                    self.check_expr(value, bound)?;
                }
                Ok(())
            }
        }
    }
}

fn scope_bindings(
    body: &[Stmt],
    outer: &FxHashSet<String>,
    extra: &[String],
) -> FxHashSet<String> {
    let mut bound = outer.clone();
    bound.extend(extra.iter().cloned());
    hoist_bindings(body, &mut bound);
    bound
}

/// Collect the names `body` binds in its own scope.
///
/// Descends into sections that share the scope (`if` arms, `autoescape`
/// and `filter` bodies) but not into statements that open one.
fn hoist_bindings(body: &[Stmt], bound: &mut FxHashSet<String>) {
    for stmt in body {
        match stmt {
            Stmt::Set { targets, .. } => {
                for target in targets {
                    if let AssignTarget::Name(name) = target {
                        bound.insert(name.clone());
                    }
                }
            }
            Stmt::SetBlock { target, .. } => {
                if let AssignTarget::Name(name) = target {
                    bound.insert(name.clone());
                }
            }
            Stmt::Import { target, .. } => {
                bound.insert(target.clone());
            }
            Stmt::FromImport { names, .. } => {
                for imported in names {
                    bound.insert(imported.alias.clone().unwrap_or_else(|| imported.name.clone()));
                }
            }
            Stmt::Macro { name, .. } => {
                bound.insert(name.clone());
            }
            Stmt::If {
                arms, else_body, ..
            } => {
                for (_, body) in arms {
                    hoist_bindings(body, bound);
                }
                hoist_bindings(else_body, bound);
            }
            Stmt::Autoescape { body, .. } | Stmt::FilterBlock { body, .. } => {
                hoist_bindings(body, bound);
            }
            _ => {}
        }
    }
}
