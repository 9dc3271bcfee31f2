use crate::error::{BuildError, Result};
use crate::graph::declarations::required_namespaces;
use crate::graph::NamespaceGraph;
use crate::project::{ProjectSpec, Settings};
use crate::scan::{SourceFile, SourceKind, SourceScanner};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Location of the base runtime relative to a search root
pub const BASE_JS_RELATIVE: &str = "goog/base.js";

/// Template runtime provided by the project itself
pub const TEMPLATE_RUNTIME_NAMESPACE: &str = "soy";

/// Template runtime that integrates with the base runtime
pub const TEMPLATE_RUNTIME_GOOG_NAMESPACE: &str = "goog.soy";

/// Support script added alongside [`TEMPLATE_RUNTIME_GOOG_NAMESPACE`]
pub const SOYUTILS_USEGOOG: &str = "soyutils_usegoog.js";

/// Standalone support script used when the project has no template runtime
pub const SOYUTILS: &str = "soyutils.js";

/// Built-in locations the resolver falls back to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    pub base_js_fallback: PathBuf,
    pub template_support_dir: PathBuf,
}

impl ResolverOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_js_fallback: settings.base_js_fallback.clone(),
            template_support_dir: settings.template_support_dir.clone(),
        }
    }
}

/// Ordered build list: base runtime first, every provider before its requirers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyList {
    files: Vec<PathBuf>,
}

impl DependencyList {
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter()
    }

    pub fn into_vec(self) -> Vec<PathBuf> {
        self.files
    }
}

/// Depth-first, post-order resolution over a [`NamespaceGraph`]
pub struct DependencyResolver<'a> {
    graph: &'a NamespaceGraph,
    roots: Vec<PathBuf>,
    options: ResolverOptions,
}

impl<'a> DependencyResolver<'a> {
    /// `roots` should be the canonical roots the graph was scanned from
    pub fn new(graph: &'a NamespaceGraph, roots: &[PathBuf], options: ResolverOptions) -> Self {
        Self {
            graph,
            roots: roots.to_vec(),
            options,
        }
    }

    /// First root carrying the base runtime, else the built-in fallback
    pub fn base_runtime_path(&self) -> PathBuf {
        self.roots
            .iter()
            .map(|root| root.join(BASE_JS_RELATIVE))
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| self.options.base_js_fallback.clone())
    }

    pub fn resolve(&self, namespaces: &[String], entry_files: &[PathBuf]) -> Result<DependencyList> {
        let start = Instant::now();
        let mut state = Resolution::default();

        state.append(self.base_runtime_path());

        for namespace in namespaces {
            self.resolve_namespace(namespace, &mut state)?;
        }

        for entry in entry_files {
            self.resolve_entry(entry, &mut state)?;
        }

        info!(
            namespaces = namespaces.len(),
            entry_files = entry_files.len(),
            files = state.output.len(),
            resolve_time_ms = start.elapsed().as_millis() as u64,
            "Dependencies resolved"
        );

        Ok(DependencyList {
            files: state.output,
        })
    }

    fn resolve_namespace(&self, namespace: &str, state: &mut Resolution) -> Result<()> {
        let provider = self
            .graph
            .provider(namespace)
            .ok_or_else(|| BuildError::UnknownNamespace(namespace.to_string()))?;
        self.resolve_file(provider, state)
    }

    fn resolve_file(&self, path: &Path, state: &mut Resolution) -> Result<()> {
        if state.visited.contains(path) {
            return Ok(());
        }

        if let Some(position) = state.in_progress.iter().position(|p| p == path) {
            let mut cycle = state.in_progress[position..].to_vec();
            cycle.push(path.to_path_buf());
            return Err(BuildError::CycleDetected { cycle });
        }

        state.in_progress.push(path.to_path_buf());

        for namespace in self.graph.requires_of(path) {
            self.resolve_namespace(namespace, state)?;
        }

        if self.graph.kind_of(path) == Some(SourceKind::Template) {
            self.ensure_template_runtime(state)?;
        }

        state.in_progress.pop();
        state.visited.insert(path.to_path_buf());
        state.append(path.to_path_buf());
        Ok(())
    }

    /// Entry files outside the scanned roots are read on demand
    fn resolve_entry(&self, entry: &Path, state: &mut Resolution) -> Result<()> {
        let path = entry
            .canonicalize()
            .map_err(|source| BuildError::Filesystem {
                path: entry.to_path_buf(),
                source,
            })?;

        if self.graph.contains_file(&path) {
            return self.resolve_file(&path, state);
        }

        let kind = SourceKind::from_path(&path).unwrap_or(SourceKind::Code);
        let file = SourceFile::read(path, kind)?;
        let required = required_namespaces(&file.text).map_err(|captured| {
            BuildError::MalformedRequire {
                file: file.path.clone(),
                captured,
            }
        })?;

        for namespace in &required {
            self.resolve_namespace(namespace, state)?;
        }
        if kind == SourceKind::Template {
            self.ensure_template_runtime(state)?;
        }

        state.append(file.path);
        Ok(())
    }

    fn ensure_template_runtime(&self, state: &mut Resolution) -> Result<()> {
        if state.template_runtime_added {
            return Ok(());
        }
        state.template_runtime_added = true;

        if self.graph.is_provided(TEMPLATE_RUNTIME_NAMESPACE) {
            self.resolve_namespace(TEMPLATE_RUNTIME_NAMESPACE, state)
        } else if self.graph.is_provided(TEMPLATE_RUNTIME_GOOG_NAMESPACE) {
            self.resolve_namespace(TEMPLATE_RUNTIME_GOOG_NAMESPACE, state)?;
            state.append(self.options.template_support_dir.join(SOYUTILS_USEGOOG));
            Ok(())
        } else {
            state.append(self.options.template_support_dir.join(SOYUTILS));
            Ok(())
        }
    }
}

/// Scans the project's roots, builds the graph and resolves the request
pub fn resolve_project(spec: &ProjectSpec, settings: &Settings) -> Result<ResolvedProject> {
    let scanner = SourceScanner::new(&spec.search_paths)?;
    let graph = NamespaceGraph::build(scanner.scan()?)?;
    let resolver = DependencyResolver::new(
        &graph,
        scanner.roots(),
        ResolverOptions::from_settings(settings),
    );
    let dependencies = resolver.resolve(&spec.namespaces, &spec.entry_files)?;

    let templates = dependencies
        .iter()
        .filter(|path| graph.kind_of(path) == Some(SourceKind::Template) || is_template_path(path))
        .cloned()
        .collect();

    Ok(ResolvedProject {
        dependencies,
        templates,
    })
}

fn is_template_path(path: &Path) -> bool {
    SourceKind::from_path(path) == Some(SourceKind::Template)
}

/// Result of [`resolve_project`]
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    pub dependencies: DependencyList,
    /// Members of `dependencies` that need the template compiler first
    pub templates: HashSet<PathBuf>,
}

#[derive(Default)]
struct Resolution {
    output: Vec<PathBuf>,
    present: HashSet<PathBuf>,
    visited: HashSet<PathBuf>,
    in_progress: Vec<PathBuf>,
    template_runtime_added: bool,
}

impl Resolution {
    fn append(&mut self, path: PathBuf) {
        if self.present.insert(path.clone()) {
            debug!(path = %path.display(), position = self.output.len(), "Added to build list");
            self.output.push(path);
        }
    }
}
