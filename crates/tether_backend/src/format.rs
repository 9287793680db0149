//! Bitstream file formats.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tether_config::ProgramMode;

/// The output format of a built bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitstreamFormat {
    /// Intel/Altera SRAM Object File (.sof).
    Sof,
    /// Intel/Altera Programmer Object File (.pof) for flash programming.
    Pof,
    /// Intel/Altera Raw Binary File (.rbf), headerless configuration data.
    Rbf,
    /// Xilinx bitstream file (.bit).
    Bit,
}

impl BitstreamFormat {
    /// Returns the conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            BitstreamFormat::Sof => "sof",
            BitstreamFormat::Pof => "pof",
            BitstreamFormat::Rbf => "rbf",
            BitstreamFormat::Bit => "bit",
        }
    }

    /// The artifact the build produces for a programming mode: `.sof` for
    /// SRAM, `.pof` for flash.
    pub fn for_mode(mode: ProgramMode) -> Self {
        match mode {
            ProgramMode::Sram => BitstreamFormat::Sof,
            ProgramMode::Flash => BitstreamFormat::Pof,
        }
    }

    /// Renames an artifact path to this format's extension.
    pub fn translate(&self, artifact: &Path) -> PathBuf {
        artifact.with_extension(self.extension())
    }
}

impl std::fmt::Display for BitstreamFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BitstreamFormat::Sof => write!(f, "SOF"),
            BitstreamFormat::Pof => write!(f, "POF"),
            BitstreamFormat::Rbf => write!(f, "RBF"),
            BitstreamFormat::Bit => write!(f, "BIT"),
        }
    }
}

/// Error returned when a format name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bitstream format '{0}' (expected sof, pof, rbf, or bit)")]
pub struct ParseFormatError(pub String);

impl FromStr for BitstreamFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "sof" => Ok(BitstreamFormat::Sof),
            "pof" => Ok(BitstreamFormat::Pof),
            "rbf" => Ok(BitstreamFormat::Rbf),
            "bit" => Ok(BitstreamFormat::Bit),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}
