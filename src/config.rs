//! Configuration loading for nsbuild
//!
//! Two sources feed a build: tool [`Settings`], read from environment variables
//! with defaults, and a JSON project file describing what to build.
//!
//! # Environment Variables
//!
//! - `NSBUILD_JAVA_PATH`: Java runtime - default: "java". A `%JAVA_HOME%` token is
//!   expanded from the environment once, at load time
//! - `NSBUILD_COMPILER_JAR`: Closure Compiler jar - default: "compiler.jar"
//! - `NSBUILD_TEMPLATE_JAR`: template compiler jar - default: "SoyToJsSrcCompiler.jar"
//! - `NSBUILD_TEMPLATE_SUPPORT_DIR`: bundled template support scripts - default: "closure-templates"
//! - `NSBUILD_BASE_JS`: base runtime fallback - default: "closure/goog/base.js"
//! - `NSBUILD_LOG_LEVEL`: logging level - default: "info"
//!
//! # Project File
//!
//! ```json
//! {
//!   "id": "app",
//!   "paths": ["~/js", "~/third_party/closure"],
//!   "namespaces": "app.main",
//!   "inputs": [],
//!   "externs": ["~/externs/jquery.js"],
//!   "mode": "ADVANCED",
//!   "compilerCustomParams": "--warning_level VERBOSE",
//!   "soyCustomParams": "",
//!   "outputFile": "~/build/app.js"
//! }
//! ```
//!
//! List-valued fields accept a single string or an array. A leading `~`, or a
//! relative path, resolves against the web root passed to
//! [`ProjectFile::into_spec`].

use crate::project::{CompilationMode, ProjectSpec, Settings};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_JAVA_PATH: &str = "java";
const DEFAULT_COMPILER_JAR: &str = "compiler.jar";
const DEFAULT_TEMPLATE_JAR: &str = "SoyToJsSrcCompiler.jar";
const DEFAULT_TEMPLATE_SUPPORT_DIR: &str = "closure-templates";
const DEFAULT_BASE_JS: &str = "closure/goog/base.js";
const JAVA_HOME_TOKEN: &str = "%JAVA_HOME%";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Project file could not be read
    #[error("Failed to read project file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Project file is not valid JSON for a project
    #[error("Failed to parse project file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

impl Default for Settings {
    /// Loads settings from `NSBUILD_*` environment variables with defaults
    fn default() -> Self {
        let var_or = |name: &str, default: &str| {
            env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let java_path = resolve_java_home(
            &var_or("NSBUILD_JAVA_PATH", DEFAULT_JAVA_PATH),
            env::var("JAVA_HOME").ok().as_deref(),
        );

        Self {
            java_path: PathBuf::from(java_path),
            compiler_jar: PathBuf::from(var_or("NSBUILD_COMPILER_JAR", DEFAULT_COMPILER_JAR)),
            template_jar: PathBuf::from(var_or("NSBUILD_TEMPLATE_JAR", DEFAULT_TEMPLATE_JAR)),
            template_support_dir: PathBuf::from(var_or(
                "NSBUILD_TEMPLATE_SUPPORT_DIR",
                DEFAULT_TEMPLATE_SUPPORT_DIR,
            )),
            base_js_fallback: PathBuf::from(var_or("NSBUILD_BASE_JS", DEFAULT_BASE_JS)),
        }
    }
}

impl Settings {
    /// Checks that no tool path is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("java_path", &self.java_path),
            ("compiler_jar", &self.compiler_jar),
            ("template_jar", &self.template_jar),
            ("template_support_dir", &self.template_support_dir),
            ("base_js_fallback", &self.base_js_fallback),
        ];

        for (name, path) in fields {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{} must not be empty", name)));
            }
        }

        Ok(())
    }
}

/// Replaces `%JAVA_HOME%` in `java_path`; left untouched when JAVA_HOME is unset
pub fn resolve_java_home(java_path: &str, java_home: Option<&str>) -> String {
    match java_home {
        Some(home) if java_path.contains(JAVA_HOME_TOKEN) => java_path.replace(JAVA_HOME_TOKEN, home),
        _ => java_path.to_string(),
    }
}

/// A JSON field holding either one string or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl Default for StringOrList {
    fn default() -> Self {
        StringOrList::Many(Vec::new())
    }
}

impl StringOrList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StringOrList::One(s) if s.is_empty() => Vec::new(),
            StringOrList::One(s) => vec![s],
            StringOrList::Many(v) => v.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }
}

/// On-disk project description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub paths: StringOrList,
    #[serde(default)]
    pub inputs: StringOrList,
    #[serde(default)]
    pub namespaces: StringOrList,
    #[serde(default)]
    pub externs: StringOrList,
    #[serde(default, deserialize_with = "deserialize_mode")]
    pub mode: Option<CompilationMode>,
    #[serde(default)]
    pub compiler_custom_params: Option<String>,
    #[serde(default)]
    pub soy_custom_params: Option<String>,
    #[serde(default)]
    pub output_file: Option<String>,
}

fn deserialize_mode<'de, D>(deserializer: D) -> Result<Option<CompilationMode>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| s.parse().map_err(serde::de::Error::custom))
        .transpose()
}

impl ProjectFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Resolves paths against `web_root` and validates the result
    pub fn into_spec(self, web_root: &Path) -> Result<ProjectSpec, ConfigError> {
        let resolve_all = |list: StringOrList| -> Vec<PathBuf> {
            list.into_vec()
                .iter()
                .map(|p| resolve_against(p, web_root))
                .collect()
        };

        let spec = ProjectSpec {
            search_paths: resolve_all(self.paths),
            namespaces: self.namespaces.into_vec(),
            entry_files: resolve_all(self.inputs),
            externs: resolve_all(self.externs),
            mode: self.mode,
            compiler_custom_params: self.compiler_custom_params.unwrap_or_default(),
            template_custom_params: self.soy_custom_params.unwrap_or_default(),
            output_file: self
                .output_file
                .filter(|p| !p.is_empty())
                .map(|p| resolve_against(&p, web_root)),
        };

        if spec.search_paths.is_empty() {
            return Err(ConfigError::Validation(
                "at least one search path is required".to_string(),
            ));
        }
        if spec.namespaces.is_empty() && spec.entry_files.is_empty() {
            return Err(ConfigError::Validation(
                "either namespaces or inputs must be given".to_string(),
            ));
        }

        Ok(spec)
    }
}

/// `~/x` and relative paths resolve under `web_root`; absolute paths are kept
pub fn resolve_against(path: &str, web_root: &Path) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        return web_root.join(rest.trim_start_matches(['/', '\\']));
    }
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        web_root.join(path)
    }
}
