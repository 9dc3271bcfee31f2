//! Source discovery
//!
//! Walks the configured search roots and loads every code and template file
//! with its comments stripped, ready for declaration extraction.

pub mod comments;
pub mod scanner;

pub use comments::strip_comments;
pub use scanner::{SourceFile, SourceKind, SourceScanner};
