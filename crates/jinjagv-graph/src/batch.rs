//! Batch extraction over every document an environment can load.

use crate::env::Environment;
use crate::env::TemplateError;
use crate::symbols::SymbolTable;

/// One document that failed to load or parse during batch extraction.
#[derive(Debug)]
pub struct BatchDiagnostic {
    pub template: String,
    pub error: TemplateError,
}

/// Result of [`collect_symbols`]: extractors for the documents that
/// parsed, diagnostics for the ones that did not.
pub struct Batch<'env> {
    pub symbols: Vec<SymbolTable<'env>>,
    pub diagnostics: Vec<BatchDiagnostic>,
}

/// Extract facts for every template whose name ends in `suffix` (the
/// empty suffix matches everything), in the loader's name order.
///
/// A document that fails to parse is skipped with a diagnostic; it never
/// aborts the batch.
#[must_use]
pub fn collect_symbols<'env>(env: &'env Environment, suffix: &str) -> Batch<'env> {
    let mut symbols = Vec::new();
    let mut diagnostics = Vec::new();

    for name in env.template_names() {
        if !name.ends_with(suffix) {
            continue;
        }
        match SymbolTable::load(env, &name) {
            Ok(table) => symbols.push(table),
            Err(error) => {
                tracing::warn!(template = %name, %error, "skipping unparseable template");
                diagnostics.push(BatchDiagnostic {
                    template: name,
                    error,
                });
            }
        }
    }

    Batch {
        symbols,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapLoader;

    fn env_of(templates: &[(&str, &str)]) -> Environment {
        Environment::new(Box::new(MapLoader::new(templates.iter().copied())))
    }

    #[test]
    fn test_collects_all_templates() {
        let env = env_of(&[
            ("a.html", "{% block a %}{% endblock %}"),
            ("b.html", "{{ x }}"),
        ]);
        let batch = collect_symbols(&env, "");
        let names: Vec<&str> = batch.symbols.iter().map(SymbolTable::name).collect();
        assert_eq!(names, vec!["a.html", "b.html"]);
        assert!(batch.diagnostics.is_empty());
    }

    #[test]
    fn test_suffix_filters_names() {
        let env = env_of(&[("page.html", "x"), ("data.json", "{}"), ("mail.txt", "y")]);
        let batch = collect_symbols(&env, ".html");
        let names: Vec<&str> = batch.symbols.iter().map(SymbolTable::name).collect();
        assert_eq!(names, vec!["page.html"]);
    }

    #[test]
    fn test_raw_body_with_stray_delimiters_still_collects() {
        let env = env_of(&[("snippet.html", "{% raw %}{{ {% endraw %}ok")]);
        let batch = collect_symbols(&env, "");
        assert_eq!(batch.symbols.len(), 1);
        assert!(batch.diagnostics.is_empty());
    }

    #[test]
    fn test_parse_failure_isolated() {
        let env = env_of(&[
            ("bad.html", "{% if x %}never closed"),
            ("good.html", "{% block body %}{% endblock %}"),
        ]);
        let batch = collect_symbols(&env, "");
        assert_eq!(batch.symbols.len(), 1);
        assert_eq!(batch.symbols[0].name(), "good.html");
        assert_eq!(batch.diagnostics.len(), 1);
        assert_eq!(batch.diagnostics[0].template, "bad.html");
    }
}
