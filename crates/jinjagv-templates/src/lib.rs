//! Jinja template parsing for structural analysis.
//!
//! This crate turns template source into an owned statement tree that keeps
//! exactly the structure the fact extraction needs: references to other
//! templates, block and macro definitions, filter applications, and the
//! names an expression reads.
//!
//! ## Pipeline
//!
//! 1. **Lexing**: source is split into text, `{{ ... }}`, `{% ... %}` and
//!    `{# ... #}` tokens with byte offsets
//! 2. **Parsing**: tag contents are parsed into [`ast::Stmt`] statements
//!    with nested bodies; expressions into [`expr::Expr`]
//!
//! Parsing is all-or-nothing: the first malformed construct fails the whole
//! document, and callers analysing many templates isolate the failure per
//! document.
//!
//! ## Example
//!
//! ```
//! use jinjagv_templates::{ast::Stmt, parse};
//!
//! let stmts = parse("{% block body %}{{ user.name }}{% endblock %}").unwrap();
//! assert!(matches!(&stmts[0], Stmt::Block { name, .. } if name == "body"));
//! ```

pub mod ast;
mod builtins;
mod error;
pub mod expr;
mod lexer;
mod parser;
mod spans;
mod tokens;
pub mod visitor;

pub use builtins::is_builtin_filter;
pub use error::ParseError;
pub use lexer::Lexer;
pub use parser::Parser;
pub use spans::LineOffsets;
pub use spans::Span;
pub use tokens::Token;

/// Parse template source into a statement tree.
pub fn parse(source: &str) -> Result<Vec<ast::Stmt>, ParseError> {
    let (tokens, _offsets) = Lexer::new(source).tokenize();
    Parser::new(tokens).parse()
}

/// Parse template source, also returning the line offset table for
/// positioning diagnostics.
pub fn parse_with_offsets(source: &str) -> (Result<Vec<ast::Stmt>, ParseError>, LineOffsets) {
    let (tokens, offsets) = Lexer::new(source).tokenize();
    (Parser::new(tokens).parse(), offsets)
}
