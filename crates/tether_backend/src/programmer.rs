//! Device programmers.

use crate::error::BackendError;
use crate::format::BitstreamFormat;
use crate::tool::run_tool;
use std::path::{Path, PathBuf};
use tether_config::{ProgramMode, ProgrammerKind};

/// Loads a bitstream onto a device.
pub trait Programmer {
    /// The programmer name, for logs and diagnostics.
    fn name(&self) -> &str;

    /// The bitstream format this programmer loads for `mode`.
    fn preferred_format(&self, mode: ProgramMode) -> BitstreamFormat;

    /// Loads `artifact` into the configuration memory selected by `mode`.
    ///
    /// `artifact` must already be in [`preferred_format`](Self::preferred_format).
    fn load_bitstream(&self, artifact: &Path, mode: ProgramMode) -> Result<(), BackendError>;
}

fn ensure_exists(artifact: &Path) -> Result<(), BackendError> {
    if artifact.is_file() {
        Ok(())
    } else {
        Err(BackendError::ArtifactMissing {
            path: artifact.to_path_buf(),
        })
    }
}

/// The artifact as an absolute path. Tools run in the artifact's directory,
/// so a relative path would resolve against the wrong base.
fn locate(artifact: &Path) -> Result<PathBuf, BackendError> {
    ensure_exists(artifact)?;
    std::path::absolute(artifact).map_err(|source| BackendError::Io {
        path: artifact.to_path_buf(),
        source,
    })
}

fn working_dir(artifact: &Path) -> &Path {
    match artifact.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// `quartus_pgm`: JTAG for SRAM, active serial for flash.
#[derive(Debug, Clone)]
pub struct QuartusProgrammer {
    program: String,
    cable: String,
}

impl QuartusProgrammer {
    /// Creates a programmer using `quartus_pgm` from `PATH`.
    pub fn new(cable: impl Into<String>) -> Self {
        Self {
            program: "quartus_pgm".to_string(),
            cable: cable.into(),
        }
    }

    /// Arguments for loading `artifact` in `mode`.
    pub fn args(&self, artifact: &Path, mode: ProgramMode) -> Vec<String> {
        let method = match mode {
            ProgramMode::Sram => "jtag",
            ProgramMode::Flash => "as",
        };
        vec![
            "-m".to_string(),
            method.to_string(),
            "-c".to_string(),
            self.cable.clone(),
            "-o".to_string(),
            format!("p;{}", artifact.display()),
        ]
    }
}

impl Programmer for QuartusProgrammer {
    fn name(&self) -> &str {
        "quartus_pgm"
    }

    fn preferred_format(&self, mode: ProgramMode) -> BitstreamFormat {
        BitstreamFormat::for_mode(mode)
    }

    fn load_bitstream(&self, artifact: &Path, mode: ProgramMode) -> Result<(), BackendError> {
        let artifact = locate(artifact)?;
        run_tool(&self.program, &self.args(&artifact, mode), working_dir(&artifact))
    }
}

/// `openFPGALoader`, which takes raw binary files for both SRAM and flash.
#[derive(Debug, Clone)]
pub struct OpenFpgaLoader {
    program: String,
    cable: String,
}

impl OpenFpgaLoader {
    /// Creates a loader using `openFPGALoader` from `PATH`.
    pub fn new(cable: impl Into<String>) -> Self {
        Self {
            program: "openFPGALoader".to_string(),
            cable: cable.into(),
        }
    }

    /// Arguments for loading `artifact` in `mode`.
    pub fn args(&self, artifact: &Path, mode: ProgramMode) -> Vec<String> {
        let mut args = vec!["-c".to_string(), self.cable.clone()];
        if mode == ProgramMode::Flash {
            args.push("-f".to_string());
        }
        args.push(artifact.display().to_string());
        args
    }
}

impl Programmer for OpenFpgaLoader {
    fn name(&self) -> &str {
        "openFPGALoader"
    }

    fn preferred_format(&self, _mode: ProgramMode) -> BitstreamFormat {
        BitstreamFormat::Rbf
    }

    fn load_bitstream(&self, artifact: &Path, mode: ProgramMode) -> Result<(), BackendError> {
        let artifact = locate(artifact)?;
        run_tool(&self.program, &self.args(&artifact, mode), working_dir(&artifact))
    }
}

/// Creates the programmer for `kind` on `cable`.
pub fn create_programmer(kind: ProgrammerKind, cable: &str) -> Box<dyn Programmer> {
    match kind {
        ProgrammerKind::Quartus => Box::new(QuartusProgrammer::new(cable)),
        ProgrammerKind::OpenFpgaLoader => Box::new(OpenFpgaLoader::new(cable)),
    }
}
