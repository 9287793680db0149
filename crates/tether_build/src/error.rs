//! Stage errors: configuration errors detected before any backend runs, and
//! backend errors surfaced verbatim.

use std::path::PathBuf;
use tether_backend::{BackendError, ParseFormatError};
use tether_common::InternalError;
use tether_config::ConfigError;
use tether_diagnostics::{Category, Diagnostic, DiagnosticCode};
use tether_elaborate::ElaborateError;
use tether_platform::RegistryError;
use tether_sources::SourceError;
use thiserror::Error;

/// Internal error in tether itself.
pub const E300: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 300,
};

/// Invalid project configuration.
pub const E310: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 310,
};

/// Unknown platform id.
pub const E311: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 311,
};

/// Errors detected before any backend is invoked. All are fatal and none
/// are retried.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// `tether.toml` could not be read or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The platform could not be registered.
    #[error(transparent)]
    Platform(#[from] RegistryError),

    /// Binding resolution or composition failed.
    #[error(transparent)]
    Elaborate(#[from] ElaborateError),

    /// A source root is missing or unreadable.
    #[error(transparent)]
    Sources(#[from] SourceError),

    /// An `output_formats` entry is not a known format.
    #[error(transparent)]
    Format(#[from] ParseFormatError),

    /// The component interface file could not be read.
    #[error("cannot read component interface {}: {source}", path.display())]
    Interface {
        /// The interface file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigurationError {
    /// Converts this error into an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ConfigurationError::Config(e) => {
                Diagnostic::error(E310, e.to_string()).with_subject("tether.toml")
            }
            ConfigurationError::Platform(RegistryError::UnknownPlatform(id)) => {
                Diagnostic::error(E311, self.to_string())
                    .with_subject(id.clone())
                    .with_help("run `tether platform` to list built-in platforms, or define it under [platforms]")
            }
            ConfigurationError::Platform(e) => Diagnostic::error(E310, e.to_string()),
            ConfigurationError::Elaborate(e) => e.to_diagnostic(),
            ConfigurationError::Sources(e) => e.to_diagnostic(),
            ConfigurationError::Format(e) => {
                Diagnostic::error(E310, e.to_string()).with_subject("build.output_formats")
            }
            ConfigurationError::Interface { path, .. } => Diagnostic::error(E310, self.to_string())
                .with_subject(path.display().to_string()),
        }
    }
}

/// The error that ended a build, by kind.
#[derive(Debug, Error)]
pub enum StageError {
    /// A configuration error.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A build backend or programmer error.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A bug in tether.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl StageError {
    /// Converts this error into an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            StageError::Configuration(e) => e.to_diagnostic(),
            StageError::Backend(e) => e.to_diagnostic(),
            StageError::Internal(e) => Diagnostic::error(E300, e.to_string()),
        }
    }
}

impl From<ElaborateError> for StageError {
    fn from(e: ElaborateError) -> Self {
        StageError::Configuration(e.into())
    }
}

impl From<SourceError> for StageError {
    fn from(e: SourceError) -> Self {
        StageError::Configuration(e.into())
    }
}

impl From<RegistryError> for StageError {
    fn from(e: RegistryError) -> Self {
        StageError::Configuration(e.into())
    }
}
