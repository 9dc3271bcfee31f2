use super::declarations::{provided_namespaces, required_namespaces};
use crate::error::{BuildError, Result};
use crate::scan::{SourceFile, SourceKind, SourceScanner};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Provider and requirer tables for one build request
///
/// Built once, then only read. Every namespace maps to exactly one file.
#[derive(Debug, Default, Clone)]
pub struct NamespaceGraph {
    provides: HashMap<String, PathBuf>,
    requires: HashMap<PathBuf, Vec<String>>,
    kinds: HashMap<PathBuf, SourceKind>,
}

impl NamespaceGraph {
    /// Scans `roots` and builds the graph from every file found
    pub fn from_roots(roots: &[PathBuf]) -> Result<Self> {
        let files = SourceScanner::new(roots)?.scan()?;
        Self::build(files)
    }

    pub fn build<I>(files: I) -> Result<Self>
    where
        I: IntoIterator<Item = SourceFile>,
    {
        let mut graph = Self::default();
        for file in files {
            graph.add_file(&file)?;
        }

        info!(
            files = graph.requires.len(),
            namespaces = graph.provides.len(),
            "Namespace graph built"
        );

        Ok(graph)
    }

    fn add_file(&mut self, file: &SourceFile) -> Result<()> {
        if self.requires.contains_key(&file.path) {
            return Err(BuildError::InternalConsistency(file.path.clone()));
        }

        let provided = provided_namespaces(file.kind, &file.text);
        let required = required_namespaces(&file.text).map_err(|captured| {
            BuildError::MalformedRequire {
                file: file.path.clone(),
                captured,
            }
        })?;

        for namespace in &provided {
            if let Some(first) = self.provides.get(namespace) {
                return Err(BuildError::DuplicateNamespace {
                    namespace: namespace.clone(),
                    first: first.clone(),
                    second: file.path.clone(),
                });
            }
            self.provides.insert(namespace.clone(), file.path.clone());
        }

        debug!(
            path = %file.path.display(),
            provides = ?provided,
            requires = ?required,
            "Extracted declarations"
        );

        self.requires.insert(file.path.clone(), required);
        self.kinds.insert(file.path.clone(), file.kind);
        Ok(())
    }

    /// File that provides `namespace`
    pub fn provider(&self, namespace: &str) -> Option<&Path> {
        self.provides.get(namespace).map(PathBuf::as_path)
    }

    pub fn is_provided(&self, namespace: &str) -> bool {
        self.provides.contains_key(namespace)
    }

    /// Namespaces required by `path`; empty for files outside the graph
    pub fn requires_of(&self, path: &Path) -> &[String] {
        self.requires.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn kind_of(&self, path: &Path) -> Option<SourceKind> {
        self.kinds.get(path).copied()
    }

    pub fn contains_file(&self, path: &Path) -> bool {
        self.requires.contains_key(path)
    }

    pub fn file_count(&self) -> usize {
        self.requires.len()
    }

    pub fn namespace_count(&self) -> usize {
        self.provides.len()
    }
}
