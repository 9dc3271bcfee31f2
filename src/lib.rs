//! nsbuild - namespace dependency resolver and Closure Compiler driver
//!
//! Scans JavaScript and template sources for `goog.provide` / `goog.require`
//! declarations, orders the files needed for a set of namespaces so that every
//! provider precedes its dependents, and runs the external compilers over the
//! result.
//!
//! # Example Usage
//!
//! ```no_run
//! use nsbuild::{resolve_project, ProjectSpec, Settings};
//! use std::path::PathBuf;
//!
//! # fn main() -> nsbuild::Result<()> {
//! let spec = ProjectSpec::new(vec![PathBuf::from("/srv/www/js")]).with_namespaces(["app.main"]);
//! let resolved = resolve_project(&spec, &Settings::default())?;
//!
//! for file in resolved.dependencies.iter() {
//!     println!("{}", file.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`scan`]: source discovery under the search roots
//! - [`graph`]: namespace-to-file and file-to-requires maps
//! - [`resolve`]: ordered build list with cycle detection
//! - [`compiler`]: command lines, process execution and diagnostic parsing
//! - [`config`]: tool settings and JSON project files

pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod graph;
pub mod project;
pub mod resolve;
pub mod scan;
pub mod util;

pub use compiler::{
    ClosureCompiler, CompileOutput, DiagnosticParser, DiagnosticRecord, ProcessRunner, Severity,
    TemplateCompiler,
};
pub use config::{ConfigError, ProjectFile};
pub use error::{BuildError, Result};
pub use graph::NamespaceGraph;
pub use project::{CompilationMode, ProjectSpec, Settings};
pub use resolve::{resolve_project, DependencyList, DependencyResolver, ResolvedProject};
pub use scan::{SourceFile, SourceKind, SourceScanner};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
