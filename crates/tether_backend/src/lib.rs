//! Build and programming backends.
//!
//! The orchestrator only sees the [`BuildBackend`] and [`Programmer`]
//! traits; [`QuartusBackend`], [`QuartusProgrammer`], and [`OpenFpgaLoader`]
//! drive the vendor tools as external processes. Backend errors are surfaced
//! verbatim and never retried.

#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod programmer;
pub mod quartus;
pub mod request;
pub mod tool;

pub use error::BackendError;
pub use format::{BitstreamFormat, ParseFormatError};
pub use programmer::{create_programmer, OpenFpgaLoader, Programmer, QuartusProgrammer};
pub use quartus::QuartusBackend;
pub use request::{BuildArtifact, BuildRequest};

use std::path::PathBuf;
use tether_config::BackendKind;

/// A synthesis backend.
///
/// Implementations turn a [`BuildRequest`] into bitstreams. The call blocks
/// until the toolchain finishes.
pub trait BuildBackend {
    /// The backend name, for logs and diagnostics.
    fn name(&self) -> &str;

    /// Where the build leaves its output of `format` for `request`.
    fn artifact_path(&self, request: &BuildRequest, format: BitstreamFormat) -> PathBuf;

    /// Writes project files and, when requested, runs the toolchain.
    fn build(&self, request: &BuildRequest) -> Result<BuildArtifact, BackendError>;
}

/// Creates the build backend for `kind`.
pub fn create_backend(kind: BackendKind) -> Box<dyn BuildBackend> {
    match kind {
        BackendKind::Quartus => Box::new(QuartusBackend::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_quartus_backend() {
        assert_eq!(create_backend(BackendKind::Quartus).name(), "quartus");
    }
}
