//! The template environment: a loader plus the registered filter names.
//!
//! Unlike an engine environment there is no rendering state here; the
//! environment exists so that fact extraction knows which documents exist,
//! how to read them, and which filter names resolve.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use ignore::WalkBuilder;
use jinjagv_templates::ast::Stmt;
use jinjagv_templates::is_builtin_filter;
use jinjagv_templates::ParseError;
use rustc_hash::FxHashSet;

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("template {name:?} is not known to this loader")]
    NotFound { name: String },
    #[error("failed to read {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to produce a parsed document from the environment.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("parse error at line {line}, column {column}: {source}")]
    Parse {
        line: usize,
        column: usize,
        #[source]
        source: ParseError,
    },
}

/// Source of template documents, addressed by name.
pub trait TemplateLoader {
    /// Every name this loader can produce, sorted.
    fn template_names(&self) -> Vec<String>;

    fn get_source(&self, name: &str) -> Result<String, LoaderError>;
}

/// In-memory loader over `(name, source)` pairs.
#[derive(Debug, Default)]
pub struct MapLoader {
    templates: Vec<(String, String)>,
}

impl MapLoader {
    #[must_use]
    pub fn new<N, S>(templates: impl IntoIterator<Item = (N, S)>) -> Self
    where
        N: Into<String>,
        S: Into<String>,
    {
        Self {
            templates: templates
                .into_iter()
                .map(|(name, source)| (name.into(), source.into()))
                .collect(),
        }
    }
}

impl TemplateLoader for MapLoader {
    fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.iter().map(|(name, _)| name.clone()).collect();
        names.sort();
        names
    }

    fn get_source(&self, name: &str) -> Result<String, LoaderError> {
        self.templates
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, source)| source.clone())
            .ok_or_else(|| LoaderError::NotFound {
                name: name.to_string(),
            })
    }
}

/// Filesystem loader rooted at a directory.
///
/// Template names are `/`-separated paths relative to the root. The walk
/// skips hidden files and honors ignore files, the same defaults a source
/// tree scan uses.
#[derive(Debug)]
pub struct DirLoader {
    root: Utf8PathBuf,
}

impl DirLoader {
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

impl TemplateLoader for DirLoader {
    fn template_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let walker = WalkBuilder::new(self.root.as_std_path()).build();

        for entry in walker.filter_map(Result::ok) {
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let Some(path) = Utf8Path::from_path(entry.path()) else {
                continue;
            };
            if let Ok(relative) = path.strip_prefix(&self.root) {
                names.push(relative.as_str().replace('\\', "/"));
            }
        }

        names.sort();
        names.dedup();
        names
    }

    fn get_source(&self, name: &str) -> Result<String, LoaderError> {
        let path = self.root.join(name);
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoaderError::NotFound {
                    name: name.to_string(),
                }
            } else {
                LoaderError::Io { path, source }
            }
        })
    }
}

/// A loader plus the set of filter names that resolve in it.
///
/// Builtin filters always resolve; custom filters are added by name.
/// The environment is built once and is read-only during analysis.
pub struct Environment {
    loader: Box<dyn TemplateLoader>,
    filters: FxHashSet<String>,
}

impl Environment {
    #[must_use]
    pub fn new(loader: Box<dyn TemplateLoader>) -> Self {
        Self {
            loader,
            filters: FxHashSet::default(),
        }
    }

    pub fn add_filter(&mut self, name: impl Into<String>) {
        self.filters.insert(name.into());
    }

    #[must_use]
    pub fn has_filter(&self, name: &str) -> bool {
        is_builtin_filter(name) || self.filters.contains(name)
    }

    #[must_use]
    pub fn template_names(&self) -> Vec<String> {
        self.loader.template_names()
    }

    pub fn get_source(&self, name: &str) -> Result<String, LoaderError> {
        self.loader.get_source(name)
    }

    /// Load and parse one document. Parse failures carry the line and
    /// column of the offending construct.
    pub fn parse(&self, name: &str) -> Result<Vec<Stmt>, TemplateError> {
        let source = self.loader.get_source(name)?;
        let (parsed, offsets) = jinjagv_templates::parse_with_offsets(&source);
        parsed.map_err(|source| {
            let (line, column) = offsets.position_to_line_col(source.position());
            TemplateError::Parse {
                line,
                column,
                source,
            }
        })
    }
}
