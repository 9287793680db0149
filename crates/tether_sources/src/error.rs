//! Source aggregation errors.

use std::path::PathBuf;
use tether_diagnostics::{Category, Diagnostic, DiagnosticCode};
use thiserror::Error;

/// Declared source root does not exist.
pub const E309: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 309,
};

/// Errors raised while collecting source roots.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A declared root does not exist or is not a directory. This is a
    /// misconfigured build, never retried.
    #[error("source root not found: {}", path.display())]
    SourceRootNotFound {
        /// The resolved root path.
        path: PathBuf,
    },

    /// A directory under a root could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Converts this error into an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SourceError::SourceRootNotFound { path } => Diagnostic::error(E309, self.to_string())
                .with_subject(path.display().to_string())
                .with_help("check the `path` of this [[sources]] entry"),
            SourceError::Io { path, .. } => {
                Diagnostic::error(E309, self.to_string()).with_subject(path.display().to_string())
            }
        }
    }
}
