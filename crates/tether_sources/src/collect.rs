//! Source root traversal.

use crate::error::SourceError;
use crate::language::{detect_language, SourceLanguage};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tether_config::SourceRootConfig;

/// A declared source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    /// Directory path, relative to the project directory unless absolute.
    pub path: PathBuf,
    /// Whether nested directories are traversed.
    pub recursive: bool,
}

impl SourceRoot {
    /// Creates a root.
    pub fn new(path: impl Into<PathBuf>, recursive: bool) -> Self {
        Self {
            path: path.into(),
            recursive,
        }
    }
}

impl From<&SourceRootConfig> for SourceRoot {
    fn from(config: &SourceRootConfig) -> Self {
        Self::new(&config.path, config.recursive)
    }
}

/// One HDL file ingested from a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// The file path, under its unit's resolved root.
    pub path: PathBuf,
    /// Language detected from the extension.
    pub language: SourceLanguage,
}

/// A collected source root and the files it contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUnit {
    /// The resolved root directory.
    pub path: PathBuf,
    /// Whether nested directories were traversed.
    pub recursive: bool,
    /// Ingested files: sorted within each directory, a directory's files
    /// before its subdirectories.
    pub files: Vec<SourceFile>,
}

/// Collects `roots` in the order given.
///
/// Relative roots resolve against `project_dir`. A file reachable from more
/// than one root is ingested by the first. Order between roots is the
/// caller's responsibility and is never inferred.
pub fn collect(project_dir: &Path, roots: &[SourceRoot]) -> Result<Vec<SourceUnit>, SourceError> {
    let mut seen = HashSet::new();
    let mut units = Vec::with_capacity(roots.len());

    for root in roots {
        let path = if root.path.is_absolute() {
            root.path.clone()
        } else {
            project_dir.join(&root.path)
        };
        if !path.is_dir() {
            return Err(SourceError::SourceRootNotFound { path });
        }

        let mut files = Vec::new();
        walk_dir(&path, root.recursive, &mut seen, &mut files)?;
        tracing::debug!(
            root = %path.display(),
            recursive = root.recursive,
            files = files.len(),
            "collected source root"
        );
        units.push(SourceUnit {
            path,
            recursive: root.recursive,
            files,
        });
    }

    Ok(units)
}

/// Walks one directory: its HDL files in name order, then (when recursive)
/// each subdirectory in name order.
fn walk_dir(
    dir: &Path,
    recursive: bool,
    seen: &mut HashSet<PathBuf>,
    files: &mut Vec<SourceFile>,
) -> Result<(), SourceError> {
    let io_err = |source| SourceError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        entries.push(entry.map_err(io_err)?.path());
    }
    entries.sort();

    let mut subdirs = Vec::new();
    for path in entries {
        if path.is_dir() {
            subdirs.push(path);
        } else if let Some(language) = detect_language(&path) {
            let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
            if seen.insert(key) {
                files.push(SourceFile { path, language });
            } else {
                tracing::debug!(file = %path.display(), "skipping file already ingested");
            }
        }
    }

    if recursive {
        for sub in subdirs {
            walk_dir(&sub, true, seen, files)?;
        }
    }
    Ok(())
}
