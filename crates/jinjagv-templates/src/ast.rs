use crate::expr::Expr;
use crate::spans::Span;

/// One name pulled in by `{% from ... import ... %}`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MacroParam {
    pub name: String,
    pub default: Option<Expr>,
}

/// A filter applied without a piped value, as in `{% filter upper %}` or
/// the modifier on a block-form `{% set x | trim %}`.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<Expr>,
}

/// Assignment target of `set` / `with`. Attribute targets
/// (`ns.field = ...`) reference their base rather than binding a new name.
#[derive(Clone, Debug, PartialEq)]
pub enum AssignTarget {
    Name(String),
    Attr { base: String, name: String },
}

/// One statement of a parsed template.
///
/// Bodies are nested rather than flat so scope-sensitive analysis can tell
/// which bindings are visible where.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Text {
        span: Span,
    },
    Comment {
        span: Span,
    },
    /// `{{ ... }}`
    Output {
        expr: Expr,
        span: Span,
    },
    Extends {
        template: Expr,
        span: Span,
    },
    Include {
        template: Expr,
        ignore_missing: bool,
        span: Span,
    },
    /// `{% import "x" as y %}`
    Import {
        template: Expr,
        target: String,
        span: Span,
    },
    /// `{% from "x" import a, b as c %}`
    FromImport {
        template: Expr,
        names: Vec<ImportedName>,
        span: Span,
    },
    Block {
        name: String,
        scoped: bool,
        required: bool,
        body: Vec<Stmt>,
        span: Span,
    },
    Macro {
        name: String,
        params: Vec<MacroParam>,
        body: Vec<Stmt>,
        span: Span,
    },
    For {
        targets: Vec<String>,
        iter: Expr,
        filter: Option<Expr>,
        recursive: bool,
        body: Vec<Stmt>,
        else_body: Vec<Stmt>,
        span: Span,
    },
    If {
        arms: Vec<(Expr, Vec<Stmt>)>,
        else_body: Vec<Stmt>,
        span: Span,
    },
    /// `{% set a = ... %}`
    Set {
        targets: Vec<AssignTarget>,
        value: Expr,
        span: Span,
    },
    /// `{% set a %}...{% endset %}`, optionally with a filter modifier.
    SetBlock {
        target: AssignTarget,
        filters: Vec<FilterCall>,
        body: Vec<Stmt>,
        span: Span,
    },
    With {
        bindings: Vec<(AssignTarget, Expr)>,
        body: Vec<Stmt>,
        span: Span,
    },
    FilterBlock {
        filters: Vec<FilterCall>,
        body: Vec<Stmt>,
        span: Span,
    },
    CallBlock {
        params: Vec<MacroParam>,
        call: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    Autoescape {
        value: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    Do {
        expr: Expr,
        span: Span,
    },
    Raw {
        span: Span,
    },
}

impl Stmt {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Stmt::Text { span }
            | Stmt::Comment { span }
            | Stmt::Output { span, .. }
            | Stmt::Extends { span, .. }
            | Stmt::Include { span, .. }
            | Stmt::Import { span, .. }
            | Stmt::FromImport { span, .. }
            | Stmt::Block { span, .. }
            | Stmt::Macro { span, .. }
            | Stmt::For { span, .. }
            | Stmt::If { span, .. }
            | Stmt::Set { span, .. }
            | Stmt::SetBlock { span, .. }
            | Stmt::With { span, .. }
            | Stmt::FilterBlock { span, .. }
            | Stmt::CallBlock { span, .. }
            | Stmt::Autoescape { span, .. }
            | Stmt::Do { span, .. }
            | Stmt::Raw { span } => *span,
        }
    }
}
