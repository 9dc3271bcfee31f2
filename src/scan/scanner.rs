use super::comments::strip_comments;
use crate::error::{BuildError, Result};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Kind of a candidate source file, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// `.js`, matched case-insensitively
    Code,
    /// `.soy` template
    Template,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(OsStr::to_str)?;
        if ext.eq_ignore_ascii_case("js") {
            Some(SourceKind::Code)
        } else if ext.eq_ignore_ascii_case("soy") {
            Some(SourceKind::Template)
        } else {
            None
        }
    }
}

/// A scanned file with comments already removed
///
/// The text only lives until declarations have been extracted.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub text: String,
}

impl SourceFile {
    pub fn read(path: PathBuf, kind: SourceKind) -> Result<Self> {
        let raw = fs::read_to_string(&path).map_err(|source| BuildError::Filesystem {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            text: strip_comments(&raw),
            path,
            kind,
        })
    }
}

/// Recursively collects code and template files under a set of roots
pub struct SourceScanner {
    roots: Vec<PathBuf>,
}

impl SourceScanner {
    /// Canonicalizes every root, failing on the first one that is missing
    pub fn new(roots: &[PathBuf]) -> Result<Self> {
        let mut canonical = Vec::with_capacity(roots.len());
        for root in roots {
            if !root.is_dir() {
                return Err(BuildError::RootNotFound(root.clone()));
            }
            let resolved = root.canonicalize().map_err(|source| BuildError::Filesystem {
                path: root.clone(),
                source,
            })?;
            canonical.push(resolved);
        }
        Ok(Self { roots: canonical })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Reads every candidate file once, even when roots overlap
    pub fn scan(&self) -> Result<Vec<SourceFile>> {
        let start = Instant::now();
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for root in &self.roots {
            for result in WalkBuilder::new(root)
                .standard_filters(false)
                .follow_links(false)
                .sort_by_file_name(|a, b| a.cmp(b))
                .build()
            {
                let entry = result.map_err(|err| BuildError::Filesystem {
                    path: root.clone(),
                    source: err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "directory walk failed")),
                })?;

                if !entry.file_type().map_or(false, |t| t.is_file()) {
                    continue;
                }

                let path = entry.into_path();
                let Some(kind) = SourceKind::from_path(&path) else {
                    continue;
                };

                if !seen.insert(path.clone()) {
                    debug!(path = %path.display(), "Already scanned through another root");
                    continue;
                }

                debug!(path = %path.display(), ?kind, "Scanning source file");
                files.push(SourceFile::read(path, kind)?);
            }
        }

        info!(
            roots = self.roots.len(),
            files = files.len(),
            scan_time_ms = start.elapsed().as_millis() as u64,
            "Source scan completed"
        );

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(SourceKind::from_path(Path::new("a/b.js")), Some(SourceKind::Code));
        assert_eq!(SourceKind::from_path(Path::new("a/B.JS")), Some(SourceKind::Code));
        assert_eq!(SourceKind::from_path(Path::new("t.soy")), Some(SourceKind::Template));
        assert_eq!(SourceKind::from_path(Path::new("readme.md")), None);
        assert_eq!(SourceKind::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        match SourceScanner::new(&[missing.clone()]) {
            Err(BuildError::RootNotFound(path)) => assert_eq!(path, missing),
            other => panic!("Expected RootNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_scan_walks_subdirectories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("deep/er")).unwrap();
        fs::write(root.join("top.js"), "x();").unwrap();
        fs::write(root.join("deep/er/inner.js"), "/* c */ y();").unwrap();
        fs::write(root.join("deep/view.soy"), "{namespace v}").unwrap();
        fs::write(root.join("deep/notes.txt"), "ignored").unwrap();

        let scanner = SourceScanner::new(&[root.to_path_buf()]).unwrap();
        let files = scanner.scan().unwrap();

        assert_eq!(files.len(), 3);
        let inner = files
            .iter()
            .find(|f| f.path.ends_with("deep/er/inner.js"))
            .unwrap();
        assert_eq!(inner.kind, SourceKind::Code);
        assert_eq!(inner.text, " y();");
        assert!(inner.path.is_absolute());
        assert!(files
            .iter()
            .any(|f| f.kind == SourceKind::Template && f.path.ends_with("deep/view.soy")));
    }

    #[test]
    fn test_overlapping_roots_visit_each_file_once() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("lib")).unwrap();
        fs::write(root.join("lib/a.js"), "").unwrap();

        let scanner = SourceScanner::new(&[root.to_path_buf(), root.join("lib")]).unwrap();
        let files = scanner.scan().unwrap();

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_hidden_and_ignored_files_are_still_scanned() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join(".gitignore"), "*.js\n").unwrap();
        fs::write(root.join(".hidden.js"), "").unwrap();
        fs::write(root.join("visible.js"), "").unwrap();

        let files = SourceScanner::new(&[root.to_path_buf()])
            .unwrap()
            .scan()
            .unwrap();

        assert_eq!(files.len(), 2);
    }
}
