//! Error taxonomy for a build request
//!
//! Graph and resolution errors abort the request and carry the namespaces and
//! files involved. A non-zero exit from the external tool is not an error; it
//! is reported through [`crate::compiler::CompileOutput`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Search path does not exist or is not a directory: {0}")]
    RootNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Filesystem { path: PathBuf, source: io::Error },

    #[error("The namespace '{namespace}' has already been declared in '{first}' and '{second}'")]
    DuplicateNamespace {
        namespace: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Error parsing file {file}: namespace detected as '{captured}'")]
    MalformedRequire { file: PathBuf, captured: String },

    #[error("File has already been parsed: {0}")]
    InternalConsistency(PathBuf),

    #[error("Tried to include the namespace '{0}' when it was not provided")]
    UnknownNamespace(String),

    #[error("Circular dependency detected: {}", render_cycle(.cycle))]
    CycleDetected { cycle: Vec<PathBuf> },

    #[error("Failed to launch '{executable}' with arguments '{args}': {source}")]
    Launch {
        executable: PathBuf,
        args: String,
        source: io::Error,
    },

    #[error("Template compilation of {file} failed with exit code {exit_code}: {stderr}")]
    TemplateCompile {
        file: PathBuf,
        exit_code: i32,
        stderr: String,
    },

    #[error("Build was cancelled")]
    Cancelled,
}

fn render_cycle(cycle: &[PathBuf]) -> String {
    cycle
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, BuildError>;
