//! Backend errors, surfaced verbatim and never retried.

use crate::format::BitstreamFormat;
use std::path::PathBuf;
use tether_diagnostics::{Category, Diagnostic, DiagnosticCode};
use thiserror::Error;

/// External tool not found on `PATH`.
pub const B501: DiagnosticCode = DiagnosticCode {
    category: Category::Backend,
    number: 501,
};

/// External tool exited unsuccessfully.
pub const B502: DiagnosticCode = DiagnosticCode {
    category: Category::Backend,
    number: 502,
};

/// Expected artifact does not exist.
pub const B503: DiagnosticCode = DiagnosticCode {
    category: Category::Backend,
    number: 503,
};

/// Backend file I/O failed.
pub const B504: DiagnosticCode = DiagnosticCode {
    category: Category::Backend,
    number: 504,
};

/// Requested format not supported by the backend.
pub const B505: DiagnosticCode = DiagnosticCode {
    category: Category::Backend,
    number: 505,
};

/// Errors from the build backend or the device programmer.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The tool could not be started because it is not installed.
    #[error("`{tool}` not found; is the vendor toolchain on PATH?")]
    ToolNotFound {
        /// The program name.
        tool: String,
    },

    /// The tool ran and reported failure.
    #[error("`{tool}` failed ({})", status.map_or_else(|| "terminated by signal".to_string(), |c| format!("exit code {c}")))]
    ToolFailed {
        /// The program name.
        tool: String,
        /// The exit code, if the process exited normally.
        status: Option<i32>,
        /// The last lines of the tool's output.
        output: String,
    },

    /// An artifact the build should have produced is missing.
    #[error("artifact not found: {}", path.display())]
    ArtifactMissing {
        /// The expected path.
        path: PathBuf,
    },

    /// The backend cannot produce this format.
    #[error("backend `{backend}` cannot produce {format} files")]
    UnsupportedFormat {
        /// The backend name.
        backend: String,
        /// The requested format.
        format: BitstreamFormat,
    },

    /// Writing project files or starting a tool failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    /// Returns the diagnostic code for this error.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            BackendError::ToolNotFound { .. } => B501,
            BackendError::ToolFailed { .. } => B502,
            BackendError::ArtifactMissing { .. } => B503,
            BackendError::Io { .. } => B504,
            BackendError::UnsupportedFormat { .. } => B505,
        }
    }

    /// Converts this error into an error diagnostic. Tool output is attached
    /// as notes, unchanged.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string());
        match self {
            BackendError::ToolNotFound { tool } => diag.with_subject(tool.clone()),
            BackendError::ToolFailed { tool, output, .. } => output
                .lines()
                .fold(diag.with_subject(tool.clone()), |d, line| d.with_note(line)),
            BackendError::ArtifactMissing { path } => diag
                .with_subject(path.display().to_string())
                .with_help("run with --build first"),
            BackendError::UnsupportedFormat { backend, .. } => diag.with_subject(backend.clone()),
            BackendError::Io { path, .. } => diag.with_subject(path.display().to_string()),
        }
    }
}
