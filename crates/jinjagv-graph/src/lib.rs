//! Structural analysis of Jinja template environments, rendered as
//! Graphviz digraphs.
//!
//! An [`Environment`] pairs a template loader with the set of filter
//! names that resolve in it. [`SymbolTable`] extracts the facts of one
//! parsed document; [`collect_symbols`] drives extraction across the
//! whole environment, isolating parse failures per document; and
//! [`digraph`] / [`digraph_basic`] render the collected facts as a `dot`
//! digraph where an edge `"B" -> "A"` reads "A depends on B".

mod batch;
mod digraph;
mod env;
mod scope;
mod symbols;

pub use batch::collect_symbols;
pub use batch::Batch;
pub use batch::BatchDiagnostic;
pub use digraph::digraph;
pub use digraph::digraph_basic;
pub use digraph::digraph_basic_from_symbols;
pub use digraph::digraph_from_symbols;
pub use digraph::output_templates;
pub use digraph::GraphSymbol;
pub use digraph::RenderError;
pub use env::DirLoader;
pub use env::Environment;
pub use env::LoaderError;
pub use env::MapLoader;
pub use env::TemplateError;
pub use env::TemplateLoader;
pub use symbols::AnalysisError;
pub use symbols::RefKind;
pub use symbols::SymbolTable;
