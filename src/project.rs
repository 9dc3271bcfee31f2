//! Inputs handed to the core by its collaborators
//!
//! A [`ProjectSpec`] describes one build: where to look for sources, what to
//! build and how to compile it. [`Settings`] locate the external tools. Both
//! are plain values, created by the caller and never mutated by the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Optimization level passed to the JavaScript compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompilationMode {
    Advanced,
    Simple,
    Whitespace,
    Raw,
}

impl CompilationMode {
    /// Keyword understood by the compiler's `--compilation_level` flag
    pub fn keyword(self) -> &'static str {
        match self {
            CompilationMode::Advanced => "ADVANCED_OPTIMIZATIONS",
            CompilationMode::Simple => "SIMPLE_OPTIMIZATIONS",
            CompilationMode::Whitespace => "WHITESPACE_ONLY",
            CompilationMode::Raw => "RAW",
        }
    }
}

impl Default for CompilationMode {
    fn default() -> Self {
        CompilationMode::Whitespace
    }
}

impl fmt::Display for CompilationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompilationMode::Advanced => "ADVANCED",
            CompilationMode::Simple => "SIMPLE",
            CompilationMode::Whitespace => "WHITESPACE",
            CompilationMode::Raw => "RAW",
        };
        f.write_str(name)
    }
}

impl FromStr for CompilationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADVANCED" => Ok(CompilationMode::Advanced),
            "SIMPLE" => Ok(CompilationMode::Simple),
            "WHITESPACE" => Ok(CompilationMode::Whitespace),
            "RAW" => Ok(CompilationMode::Raw),
            other => Err(format!(
                "Invalid mode: {}. Valid options: ADVANCED, SIMPLE, WHITESPACE, RAW",
                other
            )),
        }
    }
}

/// A single build request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSpec {
    /// Roots scanned for sources, in priority order
    pub search_paths: Vec<PathBuf>,
    /// Namespaces to build, in request order
    pub namespaces: Vec<String>,
    /// Entry files resolved after the namespaces
    pub entry_files: Vec<PathBuf>,
    pub externs: Vec<PathBuf>,
    /// `None` compiles with [`CompilationMode::Whitespace`]
    pub mode: Option<CompilationMode>,
    /// Passed verbatim to the JavaScript compiler
    pub compiler_custom_params: String,
    /// Passed verbatim to the template compiler
    pub template_custom_params: String,
    pub output_file: Option<PathBuf>,
}

impl ProjectSpec {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            ..Default::default()
        }
    }

    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_entry_files(mut self, entry_files: Vec<PathBuf>) -> Self {
        self.entry_files = entry_files;
        self
    }

    pub fn with_externs(mut self, externs: Vec<PathBuf>) -> Self {
        self.externs = externs;
        self
    }

    pub fn with_mode(mut self, mode: CompilationMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_output_file(mut self, output_file: PathBuf) -> Self {
        self.output_file = Some(output_file);
        self
    }
}

/// Locations of the external tools and built-in runtime files
///
/// All paths are expected to be fully resolved; the core performs no
/// environment lookups of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Java runtime used to launch both jars
    pub java_path: PathBuf,
    pub compiler_jar: PathBuf,
    pub template_jar: PathBuf,
    /// Directory holding the bundled template support scripts
    pub template_support_dir: PathBuf,
    /// Base runtime used when no search root carries `goog/base.js`
    pub base_js_fallback: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        advanced = { CompilationMode::Advanced, "ADVANCED_OPTIMIZATIONS" },
        simple = { CompilationMode::Simple, "SIMPLE_OPTIMIZATIONS" },
        whitespace = { CompilationMode::Whitespace, "WHITESPACE_ONLY" },
        raw = { CompilationMode::Raw, "RAW" },
    )]
    fn test_mode_keyword(mode: CompilationMode, keyword: &str) {
        assert_eq!(mode.keyword(), keyword);
    }

    #[test]
    fn test_mode_from_str_is_case_insensitive() {
        assert_eq!("advanced".parse::<CompilationMode>(), Ok(CompilationMode::Advanced));
        assert_eq!(" Simple ".parse::<CompilationMode>(), Ok(CompilationMode::Simple));
        assert!("FAST".parse::<CompilationMode>().is_err());
    }

    #[test]
    fn test_default_mode_is_whitespace() {
        assert_eq!(CompilationMode::default(), CompilationMode::Whitespace);
    }

    #[test]
    fn test_builder_methods() {
        let spec = ProjectSpec::new(vec![PathBuf::from("/js")])
            .with_namespaces(["app.main"])
            .with_mode(CompilationMode::Advanced)
            .with_output_file(PathBuf::from("/out/app.js"));

        assert_eq!(spec.namespaces, vec!["app.main".to_string()]);
        assert_eq!(spec.mode, Some(CompilationMode::Advanced));
        assert_eq!(spec.output_file, Some(PathBuf::from("/out/app.js")));
        assert!(spec.entry_files.is_empty());
    }
}
