//! Pattern matching of provide/require declarations
//!
//! Only literal-argument calls are recognized: `goog.provide('a.b')`,
//! `goog.require("a.b")` and, in templates, `{namespace a.b}`.

use crate::scan::SourceKind;
use regex::Regex;
use std::sync::OnceLock;

pub const PROVIDE_KEYWORD: &str = "goog.provide";
pub const REQUIRE_KEYWORD: &str = "goog.require";

/// Matches `keyword('literal')` or `keyword("literal")`
fn call_with_literal(keyword: &str) -> Regex {
    let keyword = regex::escape(keyword);
    let pattern = format!(
        r#"{kw}\s*\(\s*'([^']+)'\s*\)|{kw}\s*\(\s*"([^"]+)"\s*\)"#,
        kw = keyword
    );
    Regex::new(&pattern).expect("Invalid declaration regex")
}

fn provide_regex() -> &'static Regex {
    static PROVIDE: OnceLock<Regex> = OnceLock::new();
    PROVIDE.get_or_init(|| call_with_literal(PROVIDE_KEYWORD))
}

fn require_regex() -> &'static Regex {
    static REQUIRE: OnceLock<Regex> = OnceLock::new();
    REQUIRE.get_or_init(|| call_with_literal(REQUIRE_KEYWORD))
}

fn template_namespace_regex() -> &'static Regex {
    static TEMPLATE_NAMESPACE: OnceLock<Regex> = OnceLock::new();
    TEMPLATE_NAMESPACE.get_or_init(|| {
        Regex::new(r"\{namespace\s+([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)[^}]*\}")
            .expect("Invalid template namespace regex")
    })
}

fn literal_captures<'a>(regex: &Regex, text: &'a str) -> Vec<&'a str> {
    regex
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
        .collect()
}

/// Namespaces a file declares it provides, in source order
pub fn provided_namespaces(kind: SourceKind, text: &str) -> Vec<String> {
    let found = match kind {
        SourceKind::Code => literal_captures(provide_regex(), text),
        SourceKind::Template => template_namespace_regex()
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect(),
    };
    found.into_iter().map(str::to_string).collect()
}

/// Namespaces a file requires, in source order
///
/// Returns `Err` with the offending capture when a match swallowed another
/// require call, which happens with mismatched quotes.
pub fn required_namespaces(text: &str) -> Result<Vec<String>, String> {
    literal_captures(require_regex(), text)
        .into_iter()
        .map(|value| {
            if value.contains(REQUIRE_KEYWORD) {
                Err(value.to_string())
            } else {
                Ok(value.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_double_quoted_provides() {
        let text = "goog.provide('a.b');\ngoog.provide( \"c.d\" );\n";
        assert_eq!(
            provided_namespaces(SourceKind::Code, text),
            vec!["a.b".to_string(), "c.d".to_string()]
        );
    }

    #[test]
    fn test_provide_requires_literal_argument() {
        let text = "goog.provide(name);\ngoog.provide('x' + y);";
        assert!(provided_namespaces(SourceKind::Code, text).is_empty());
    }

    #[test]
    fn test_requires_keep_source_order() {
        let text = "goog.require('z');\ngoog.require(\"a\");\ngoog.require('m');";
        assert_eq!(required_namespaces(text).unwrap(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_require_spanning_lines() {
        let text = "goog.require(\n    'spread.out'\n);";
        assert_eq!(required_namespaces(text).unwrap(), vec!["spread.out"]);
    }

    #[test]
    fn test_mismatched_quotes_swallow_a_require() {
        let text = "goog.require(\"a'); goog.require('b\");";
        let captured = required_namespaces(text).unwrap_err();
        assert!(captured.contains("goog.require"));
    }

    #[test]
    fn test_template_namespace_declaration() {
        let text = "{namespace app.views.Templates autoescape=\"strict\"}\n\n{template .hello}hi{/template}";
        assert_eq!(
            provided_namespaces(SourceKind::Template, text),
            vec!["app.views.Templates".to_string()]
        );
    }

    #[test]
    fn test_template_ignores_goog_provide() {
        let text = "{namespace t}\ngoog.provide('not.in.templates');";
        assert_eq!(provided_namespaces(SourceKind::Template, text), vec!["t"]);
    }
}
