//! Names of the filters every Jinja environment ships with.

use std::sync::LazyLock;

use rustc_hash::FxHashSet;

/// Filters available in a default Jinja environment.
const BUILTIN_FILTERS: &[&str] = &[
    "abs",
    "attr",
    "batch",
    "capitalize",
    "center",
    "count",
    "d",
    "default",
    "dictsort",
    "e",
    "escape",
    "filesizeformat",
    "first",
    "float",
    "forceescape",
    "format",
    "groupby",
    "indent",
    "int",
    "items",
    "join",
    "last",
    "length",
    "list",
    "lower",
    "map",
    "max",
    "min",
    "pprint",
    "random",
    "reject",
    "rejectattr",
    "replace",
    "reverse",
    "round",
    "safe",
    "select",
    "selectattr",
    "slice",
    "sort",
    "string",
    "striptags",
    "sum",
    "title",
    "tojson",
    "trim",
    "truncate",
    "unique",
    "upper",
    "urlencode",
    "urlize",
    "wordcount",
    "wordwrap",
    "xmlattr",
];

static BUILTIN_FILTER_SET: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| BUILTIN_FILTERS.iter().copied().collect());

#[must_use]
pub fn is_builtin_filter(name: &str) -> bool {
    BUILTIN_FILTER_SET.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_filters_are_builtin() {
        assert!(is_builtin_filter("upper"));
        assert!(is_builtin_filter("join"));
        assert!(is_builtin_filter("default"));
        assert!(is_builtin_filter("d"));
    }

    #[test]
    fn test_unknown_filter_is_not_builtin() {
        assert!(!is_builtin_filter("markdown"));
        assert!(!is_builtin_filter(""));
    }
}
