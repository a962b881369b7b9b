//! Per-document fact extraction.
//!
//! A [`SymbolTable`] pairs one parsed document with the environment it was
//! loaded from and answers the structural questions the graph needs:
//! undeclared variables, block and macro definitions, unresolved filters,
//! and references to other templates.

use itertools::Itertools;
use jinjagv_templates::ast::ImportedName;
use jinjagv_templates::ast::Stmt;
use jinjagv_templates::expr::Const;
use jinjagv_templates::expr::Expr;
use jinjagv_templates::visitor::walk_body;
use jinjagv_templates::visitor::walk_expr;
use jinjagv_templates::visitor::walk_stmt;
use jinjagv_templates::visitor::Visitor;

use crate::env::Environment;
use crate::env::TemplateError;
use crate::scope::find_undeclared;
pub use crate::scope::AnalysisError;

/// Which template-to-template relation to extract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind {
    Extends,
    Includes,
    Imports,
}

/// Structural facts of one parsed document.
pub struct SymbolTable<'env> {
    env: &'env Environment,
    name: String,
    body: Vec<Stmt>,
}

impl<'env> SymbolTable<'env> {
    #[must_use]
    pub fn new(env: &'env Environment, name: impl Into<String>, body: Vec<Stmt>) -> Self {
        Self {
            env,
            name: name.into(),
            body,
        }
    }

    /// Load `name` from the environment and extract its facts.
    pub fn load(env: &'env Environment, name: &str) -> Result<Self, TemplateError> {
        let body = env.parse(name)?;
        Ok(Self::new(env, name, body))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn body(&self) -> &[Stmt] {
        &self.body
    }

    /// Names referenced but never bound, sorted.
    ///
    /// When the analysis fails (a referenced filter does not resolve in
    /// the environment) this logs the failure and degrades to an empty
    /// list, keeping batch extraction alive.
    #[must_use]
    pub fn undeclared_variables(&self) -> Vec<String> {
        match self.try_undeclared_variables() {
            Ok(names) => names,
            Err(error) => {
                tracing::warn!(
                    template = %self.name,
                    %error,
                    "undeclared variable analysis failed"
                );
                Vec::new()
            }
        }
    }

    pub fn try_undeclared_variables(&self) -> Result<Vec<String>, AnalysisError> {
        Ok(find_undeclared(&self.body, self.env)?.into_iter().collect())
    }

    /// Block names in document order; a name defined twice appears twice.
    #[must_use]
    pub fn block_names(&self) -> Vec<String> {
        let mut collector = BlockCollector(Vec::new());
        walk_body(&mut collector, &self.body);
        collector.0
    }

    /// `name(param1,param2,...)` for every macro, in document order.
    #[must_use]
    pub fn macro_signatures(&self) -> Vec<String> {
        let mut collector = MacroCollector(Vec::new());
        walk_body(&mut collector, &self.body);
        collector.0
    }

    /// Filter names used by the document that do not resolve in the
    /// environment, deduplicated in first-use order.
    #[must_use]
    pub fn unresolved_filter_usages(&self) -> Vec<String> {
        let mut collector = FilterCollector(Vec::new());
        walk_body(&mut collector, &self.body);
        collector
            .0
            .into_iter()
            .filter(|name| !self.env.has_filter(name))
            .unique()
            .collect()
    }

    /// Template names this document points at through `kind`.
    ///
    /// Only statically-known targets are reported: a literal string, or
    /// the string elements of a literal tuple/list. Computed targets are
    /// skipped without comment. Extends and includes are deduplicated;
    /// import targets keep their document order and multiplicity.
    #[must_use]
    pub fn references(&self, kind: RefKind) -> Vec<String> {
        let mut collector = RefCollector {
            kind,
            refs: Vec::new(),
        };
        walk_body(&mut collector, &self.body);
        match kind {
            RefKind::Extends | RefKind::Includes => collector.refs.into_iter().unique().collect(),
            RefKind::Imports => collector.refs,
        }
    }

    #[must_use]
    pub fn extends(&self) -> Vec<String> {
        self.references(RefKind::Extends)
    }

    #[must_use]
    pub fn includes(&self) -> Vec<String> {
        self.references(RefKind::Includes)
    }

    /// `(target template, imported names)` pairs in document order.
    ///
    /// The second element is the module alias for `import ... as x`, or a
    /// comma-joined `name` / `name as alias` list for `from ... import`.
    #[must_use]
    pub fn imports(&self) -> Vec<(String, String)> {
        let mut collector = ImportCollector(Vec::new());
        walk_body(&mut collector, &self.body);
        collector.0
    }
}

struct BlockCollector(Vec<String>);

impl Visitor for BlockCollector {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        if let Stmt::Block { name, .. } = stmt {
            self.0.push(name.clone());
        }
        walk_stmt(self, stmt);
    }
}

struct MacroCollector(Vec<String>);

impl Visitor for MacroCollector {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        if let Stmt::Macro { name, params, .. } = stmt {
            let params = params.iter().map(|p| p.name.as_str()).join(",");
            self.0.push(format!("{name}({params})"));
        }
        walk_stmt(self, stmt);
    }
}

/// Collects every applied filter name, from `|name` expressions and from
/// `{% filter %}` / block-form `{% set %}` chains alike.
struct FilterCollector(Vec<String>);

impl Visitor for FilterCollector {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FilterBlock { filters, .. } | Stmt::SetBlock { filters, .. } => {
                self.0.extend(filters.iter().map(|f| f.name.clone()));
            }
            _ => {}
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if let Expr::Filter { name, .. } = expr {
            self.0.push(name.clone());
        }
        walk_expr(self, expr);
    }
}

struct RefCollector {
    kind: RefKind,
    refs: Vec<String>,
}

impl Visitor for RefCollector {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        let target = match (self.kind, stmt) {
            (RefKind::Extends, Stmt::Extends { template, .. })
            | (RefKind::Includes, Stmt::Include { template, .. })
            | (
                RefKind::Imports,
                Stmt::Import { template, .. } | Stmt::FromImport { template, .. },
            ) => Some(template),
            _ => None,
        };
        if let Some(template) = target {
            collect_static_targets(template, &mut self.refs);
        }
        walk_stmt(self, stmt);
    }
}

struct ImportCollector(Vec<(String, String)>);

impl Visitor for ImportCollector {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Import {
                template, target, ..
            } => {
                if let Expr::Const(Const::Str(name)) = template {
                    self.0.push((name.clone(), target.clone()));
                }
            }
            Stmt::FromImport {
                template, names, ..
            } => {
                if let Expr::Const(Const::Str(name)) = template {
                    self.0.push((name.clone(), describe_imported(names)));
                }
            }
            _ => {}
        }
        walk_stmt(self, stmt);
    }
}

fn describe_imported(names: &[ImportedName]) -> String {
    names
        .iter()
        .map(|imported| match &imported.alias {
            Some(alias) => format!("{} as {}", imported.name, alias),
            None => imported.name.clone(),
        })
        .join(",")
}

/// A literal string yields itself; a literal tuple or list yields its
/// string-constant elements; anything computed yields nothing.
fn collect_static_targets(template: &Expr, refs: &mut Vec<String>) {
    match template {
        Expr::Const(Const::Str(name)) => refs.push(name.clone()),
        Expr::Tuple(items) | Expr::List(items) => {
            for item in items {
                if let Expr::Const(Const::Str(name)) = item {
                    refs.push(name.clone());
                }
            }
        }
        _ => {}
    }
}
