//! Namespace dependency graph
//!
//! Maps every provided namespace to the single file declaring it, and every
//! file to the namespaces it requires.

pub mod declarations;
pub mod namespace_graph;

pub use declarations::{PROVIDE_KEYWORD, REQUIRE_KEYWORD};
pub use namespace_graph::NamespaceGraph;
