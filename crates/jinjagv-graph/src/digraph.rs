//! Graphviz digraph rendering.
//!
//! The output is itself produced from a set of embedded Jinja templates,
//! rendered with `minijinja`. The set is deliberately written in the
//! dialect subset the owned parser understands, so the renderer's own
//! templates can be fed back through the fact extractor.

use minijinja::context;
use serde::Serialize;

use crate::batch::collect_symbols;
use crate::env::Environment;
use crate::symbols::SymbolTable;

const DIGRAPHBASIC: &str = r##"digraph "jinja_env" {

rankdir = BT

node [
  shape = "record", color = "#0f0000",
  fontname = "Courier",
  style = "filled", fillcolor = "#fffffc",
]

edge [
  color = "#0f0000",
  fontname = "Courier", fontcolor = "#007f00",
]

{%- block nodes %}
{% endblock -%}

{%- block edges %}
{% for symbol in symbols -%}
{% include "EDGES" -%}
{% endfor -%}
{% endblock %}
}
"##;

const DIGRAPH: &str = r#"{% extends "DIGRAPHBASIC" -%}

{%- block nodes %}
{% for symbol in symbols %}
{% include "NODE" %}
{% endfor %}
{%- endblock %}
"#;

const NODE: &str = r#"{% from "NODELABEL" import nodelabel as label -%}
"{{ symbol.name }}" [
  URL = "{{ symbol.url }}",
  tooltip = "{{ symbol.tooltip }}",
  label = "{ {{ label(symbol) }} }",
]
"#;

const NODELABEL: &str = r#"{% macro nodelabel(symbol) -%}
{% set attributes = (symbol.undefines + symbol.blocks + [""])|join("\\l") -%}
{% set operations = (symbol.filters + symbol.macros + [""])|join("\\l") -%}
{{ [symbol.name, attributes, operations]|join("|") }}
{%- endmacro %}
"#;

const EDGES: &str = r#"{%- include ["EXTENDS","INCLUDES","IMPORTS"] -%}
{%- include ["INCLUDES","IMPORTS"] -%}
{%- include "IMPORTS" -%}
"#;

const EXTENDS: &str = r#"{%- for ref in symbol.extends %}
"{{ ref }}" -> "{{ symbol.name }}" [ arrowhead = empty ]
{%- endfor %}
"#;

const INCLUDES: &str = r#"{%- for ref in symbol.includes %}
"{{ ref }}" -> "{{ symbol.name }}" [ arrowhead = open ]
{%- endfor %}
"#;

const IMPORTS: &str = r#"{%- for ref, funcs in symbol.imports %}
"{{ ref }}" -> "{{ symbol.name }}" [ arrowhead = diamond
  {%- if extended -%}, label = " {{ funcs }} " {%- endif %} ]
{%- endfor %}
"#;

/// The embedded output templates as `(name, source)` pairs.
#[must_use]
pub fn output_templates() -> &'static [(&'static str, &'static str)] {
    &[
        ("DIGRAPHBASIC", DIGRAPHBASIC),
        ("DIGRAPH", DIGRAPH),
        ("NODE", NODE),
        ("NODELABEL", NODELABEL),
        ("EDGES", EDGES),
        ("EXTENDS", EXTENDS),
        ("INCLUDES", INCLUDES),
        ("IMPORTS", IMPORTS),
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to render graph template")]
    Template(#[from] minijinja::Error),
}

/// One node of the rendered graph, with its facts already decorated the
/// way the record labels print them.
#[derive(Debug, Serialize)]
pub struct GraphSymbol {
    pub name: String,
    pub url: String,
    pub tooltip: String,
    pub undefines: Vec<String>,
    pub blocks: Vec<String>,
    pub filters: Vec<String>,
    pub macros: Vec<String>,
    pub extends: Vec<String>,
    pub includes: Vec<String>,
    pub imports: Vec<(String, String)>,
}

impl GraphSymbol {
    #[must_use]
    pub fn from_table(table: &SymbolTable) -> Self {
        Self {
            name: table.name().to_string(),
            url: String::new(),
            tooltip: String::new(),
            undefines: decorate(table.undeclared_variables(), ": undefined"),
            blocks: decorate(table.block_names(), ": block"),
            filters: decorate(table.unresolved_filter_usages(), "(): filter"),
            macros: decorate(table.macro_signatures(), ": macro"),
            extends: table.extends(),
            includes: table.includes(),
            imports: table.imports(),
        }
    }
}

fn decorate(items: Vec<String>, suffix: &str) -> Vec<String> {
    items
        .into_iter()
        .map(|item| format!("{item}{suffix}"))
        .collect()
}

fn renderer() -> Result<minijinja::Environment<'static>, minijinja::Error> {
    let mut env = minijinja::Environment::new();
    for (name, source) in output_templates() {
        env.add_template(name, source)?;
    }
    Ok(env)
}

/// Render the detailed graph: one record node per document plus the
/// extends/includes/imports edges, import edges labelled with what they
/// pull in.
pub fn digraph_from_symbols(symbols: &[GraphSymbol]) -> Result<String, RenderError> {
    let env = renderer()?;
    let template = env.get_template("DIGRAPH")?;
    Ok(template.render(context! { symbols => symbols, extended => true })?)
}

/// Render the basic graph: declarations and edges only, no node records
/// and no import labels.
pub fn digraph_basic_from_symbols(symbols: &[GraphSymbol]) -> Result<String, RenderError> {
    let env = renderer()?;
    let template = env.get_template("DIGRAPHBASIC")?;
    Ok(template.render(context! { symbols => symbols })?)
}

/// Extract facts for every matching document in `env` and render the
/// detailed graph.
pub fn digraph(env: &Environment, suffix: &str) -> Result<String, RenderError> {
    digraph_from_symbols(&graph_symbols(env, suffix))
}

/// Extract facts for every matching document in `env` and render the
/// basic graph.
pub fn digraph_basic(env: &Environment, suffix: &str) -> Result<String, RenderError> {
    digraph_basic_from_symbols(&graph_symbols(env, suffix))
}

fn graph_symbols(env: &Environment, suffix: &str) -> Vec<GraphSymbol> {
    collect_symbols(env, suffix)
        .symbols
        .iter()
        .map(GraphSymbol::from_table)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapLoader;

    fn env_of(templates: &[(&str, &str)]) -> Environment {
        Environment::new(Box::new(MapLoader::new(templates.iter().copied())))
    }

    #[test]
    fn test_extends_edge_shape() {
        let env = env_of(&[
            ("A", "{% extends \"B\" %}"),
            ("B", "base"),
            ("C", "unrelated"),
        ]);
        let out = digraph(&env, "").unwrap();

        assert!(out.contains("\"B\" -> \"A\" [ arrowhead = empty ]"));
        assert!(!out.contains("-> \"B\""));
        assert!(!out.contains("-> \"C\""));
        assert!(!out.contains("\"C\" ->"));
    }

    #[test]
    fn test_include_and_import_edges() {
        let env = env_of(&[
            ("page", "{% include \"nav\" %}{% import \"forms\" as forms %}"),
            ("nav", ""),
            ("forms", ""),
        ]);
        let out = digraph(&env, "").unwrap();

        assert!(out.contains("\"nav\" -> \"page\" [ arrowhead = open ]"));
        assert!(out.contains("\"forms\" -> \"page\" [ arrowhead = diamond, label = \" forms \" ]"));
    }

    #[test]
    fn test_basic_graph_has_edges_but_no_nodes() {
        let env = env_of(&[("A", "{% extends \"B\" %}"), ("B", "base")]);
        let out = digraph_basic(&env, "").unwrap();

        assert!(out.contains("\"B\" -> \"A\" [ arrowhead = empty ]"));
        assert!(!out.contains("URL ="));
        assert!(!out.contains("label = \" "));
    }

    #[test]
    fn test_node_record_label() {
        let env = env_of(&[(
            "page",
            "{% block body %}{{ user }}{% endblock %}{% macro f(x) %}{% endmacro %}",
        )]);
        let out = digraph(&env, "").unwrap();

        assert!(out.contains("\"page\" ["));
        assert!(out.contains("user: undefined"));
        assert!(out.contains("body: block"));
        assert!(out.contains("f(x): macro"));
    }

    #[test]
    fn test_graph_structure() {
        let env = env_of(&[("A", "hello")]);
        let out = digraph(&env, "").unwrap();

        assert!(out.starts_with("digraph \"jinja_env\" {"));
        assert!(out.trim_end().ends_with('}'));
        assert!(out.contains("rankdir = BT"));
    }

    #[test]
    fn test_own_templates_are_analyzable() {
        let env = Environment::new(Box::new(MapLoader::new(
            output_templates().iter().copied(),
        )));
        let batch = collect_symbols(&env, "");

        assert!(batch.diagnostics.is_empty());
        let names: Vec<&str> = batch.symbols.iter().map(SymbolTable::name).collect();
        assert_eq!(
            names,
            vec![
                "DIGRAPH",
                "DIGRAPHBASIC",
                "EDGES",
                "EXTENDS",
                "IMPORTS",
                "INCLUDES",
                "NODE",
                "NODELABEL",
            ]
        );
    }

    #[test]
    fn test_own_template_facts() {
        let env = Environment::new(Box::new(MapLoader::new(
            output_templates().iter().copied(),
        )));

        let digraph = SymbolTable::load(&env, "DIGRAPH").unwrap();
        assert_eq!(digraph.extends(), vec!["DIGRAPHBASIC"]);
        assert_eq!(digraph.includes(), vec!["NODE"]);

        let edges = SymbolTable::load(&env, "EDGES").unwrap();
        assert_eq!(edges.includes(), vec!["EXTENDS", "INCLUDES", "IMPORTS"]);

        let node = SymbolTable::load(&env, "NODE").unwrap();
        assert_eq!(
            node.imports(),
            vec![("NODELABEL".to_string(), "nodelabel as label".to_string())]
        );

        let basic = SymbolTable::load(&env, "DIGRAPHBASIC").unwrap();
        assert_eq!(basic.block_names(), vec!["nodes", "edges"]);

        let nodelabel = SymbolTable::load(&env, "NODELABEL").unwrap();
        assert_eq!(nodelabel.macro_signatures(), vec!["nodelabel(symbol)"]);
    }

    #[test]
    fn test_graph_of_own_templates_renders() {
        let env = Environment::new(Box::new(MapLoader::new(
            output_templates().iter().copied(),
        )));
        let out = digraph(&env, "").unwrap();

        assert!(out.contains("\"DIGRAPHBASIC\" -> \"DIGRAPH\" [ arrowhead = empty ]"));
        assert!(out.contains("\"NODELABEL\" -> \"NODE\" [ arrowhead = diamond"));
    }
}
