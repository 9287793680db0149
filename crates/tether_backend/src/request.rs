//! What a build backend is asked to produce, and what it reports back.

use crate::format::BitstreamFormat;
use serde::Serialize;
use std::path::PathBuf;
use tether_elaborate::Instance;
use tether_sources::{BuildDirectives, SourceUnit};

/// Everything a backend needs to synthesize the composed design.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// The build (project) name.
    pub name: String,
    /// The generated top-level module name.
    pub top: String,
    /// Device family, in platform spelling (e.g., "cyclone_v").
    pub family: String,
    /// Full device part number.
    pub device: String,
    /// Directory receiving project files and artifacts.
    pub output_dir: PathBuf,
    /// The composed top-level instance.
    pub instance: Instance,
    /// Source units in dependency order.
    pub units: Vec<SourceUnit>,
    /// Directives forwarded verbatim to the toolchain.
    pub directives: BuildDirectives,
    /// Bitstream formats to produce.
    pub formats: Vec<BitstreamFormat>,
    /// Whether to invoke the toolchain or only write project files.
    pub run_toolchain: bool,
}

/// The outcome of a successful backend build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildArtifact {
    /// The primary bitstream.
    pub primary: PathBuf,
    /// Every bitstream the build produced (or will produce, when the
    /// toolchain was not run), with its format.
    pub outputs: Vec<(BitstreamFormat, PathBuf)>,
    /// Project files written to the output directory.
    pub project_files: Vec<PathBuf>,
    /// Whether the vendor toolchain was invoked.
    pub ran_toolchain: bool,
}

impl BuildArtifact {
    /// Returns the output of the given format, if produced.
    pub fn output(&self, format: BitstreamFormat) -> Option<&PathBuf> {
        self.outputs
            .iter()
            .find(|(f, _)| *f == format)
            .map(|(_, path)| path)
    }
}
