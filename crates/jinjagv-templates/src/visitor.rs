use crate::ast::Stmt;
use crate::expr::Expr;

/// Trait for visiting statements and expressions in a template tree.
///
/// The default `visit_stmt`/`visit_expr` recurse into children; overrides
/// that want to keep descending call `walk_stmt`/`walk_expr` themselves.
pub trait Visitor {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

/// Recursively walk a statement, visiting nested bodies and expressions.
pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Text { .. } | Stmt::Comment { .. } | Stmt::Raw { .. } => {}
        Stmt::Output { expr, .. }
        | Stmt::Extends { template: expr, .. }
        | Stmt::Include { template: expr, .. }
        | Stmt::Import { template: expr, .. }
        | Stmt::FromImport { template: expr, .. }
        | Stmt::Do { expr, .. } => visitor.visit_expr(expr),
        Stmt::Block { body, .. } => walk_body(visitor, body),
        Stmt::Macro { params, body, .. } => {
            for param in params {
                if let Some(default) = &param.default {
                    visitor.visit_expr(default);
                }
            }
            walk_body(visitor, body);
        }
        Stmt::For {
            iter,
            filter,
            body,
            else_body,
            ..
        } => {
            visitor.visit_expr(iter);
            if let Some(filter) = filter {
                visitor.visit_expr(filter);
            }
            walk_body(visitor, body);
            walk_body(visitor, else_body);
        }
        Stmt::If {
            arms, else_body, ..
        } => {
            for (cond, body) in arms {
                visitor.visit_expr(cond);
                walk_body(visitor, body);
            }
            walk_body(visitor, else_body);
        }
        Stmt::Set { value, .. } => visitor.visit_expr(value),
        Stmt::SetBlock { filters, body, .. } => {
            for filter in filters {
                for arg in &filter.args {
                    visitor.visit_expr(arg);
                }
            }
            walk_body(visitor, body);
        }
        Stmt::With { bindings, body, .. } => {
            for (_, value) in bindings {
                visitor.visit_expr(value);
            }
            walk_body(visitor, body);
        }
        Stmt::FilterBlock { filters, body, .. } => {
            for filter in filters {
                for arg in &filter.args {
                    visitor.visit_expr(arg);
                }
            }
            walk_body(visitor, body);
        }
        Stmt::CallBlock {
            params, call, body, ..
        } => {
            for param in params {
                if let Some(default) = &param.default {
                    visitor.visit_expr(default);
                }
            }
            visitor.visit_expr(call);
            walk_body(visitor, body);
        }
        Stmt::Autoescape { value, body, .. } => {
            visitor.visit_expr(value);
            walk_body(visitor, body);
        }
    }
}

/// Walk a statement list, visiting each statement in sequence.
pub fn walk_body<V: Visitor + ?Sized>(visitor: &mut V, body: &[Stmt]) {
    for stmt in body {
        visitor.visit_stmt(stmt);
    }
}

/// Recursively walk an expression's children.
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match expr {
        Expr::Const(_) | Expr::Name(_) => {}
        Expr::Attr { obj, .. } => visitor.visit_expr(obj),
        Expr::Unary { value, .. } => visitor.visit_expr(value),
        Expr::Item { obj, index } => {
            visitor.visit_expr(obj);
            visitor.visit_expr(index);
        }
        Expr::Call {
            callee,
            args,
            kwargs,
        } => {
            visitor.visit_expr(callee);
            for arg in args {
                visitor.visit_expr(arg);
            }
            for (_, value) in kwargs {
                visitor.visit_expr(value);
            }
        }
        Expr::Filter {
            value,
            args,
            kwargs,
            ..
        } => {
            visitor.visit_expr(value);
            for arg in args {
                visitor.visit_expr(arg);
            }
            for (_, value) in kwargs {
                visitor.visit_expr(value);
            }
        }
        Expr::Test { value, args, .. } => {
            visitor.visit_expr(value);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        Expr::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        Expr::Cond {
            test,
            then,
            otherwise,
        } => {
            visitor.visit_expr(test);
            visitor.visit_expr(then);
            if let Some(otherwise) = otherwise {
                visitor.visit_expr(otherwise);
            }
        }
        Expr::List(items) | Expr::Tuple(items) => {
            for item in items {
                visitor.visit_expr(item);
            }
        }
        Expr::Dict(pairs) => {
            for (key, value) in pairs {
                visitor.visit_expr(key);
                visitor.visit_expr(value);
            }
        }
    }
}
