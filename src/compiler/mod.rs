//! External compiler integration
//!
//! - [`params`]: command lines for the optimizer and the template compiler
//! - [`process`]: running a tool and capturing both output streams
//! - [`diagnostics`]: turning the optimizer's stderr into records
//! - [`runner`]: the compile pipeline tying them together

pub mod diagnostics;
pub mod params;
pub mod process;
pub mod runner;

pub use diagnostics::{DiagnosticParser, DiagnosticRecord, Severity};
pub use params::{ClosureParams, CompilerInvocation, JarParams, TemplateParams};
pub use process::{ProcessOutput, ProcessRunner};
pub use runner::{ClosureCompiler, CompileOutput, TemplateCompiler};
