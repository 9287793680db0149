//! HDL language detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// HDL source language of an ingested file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    /// Verilog (`.v`).
    Verilog,
    /// SystemVerilog (`.sv`).
    SystemVerilog,
    /// VHDL (`.vhd`, `.vhdl`).
    Vhdl,
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLanguage::Verilog => write!(f, "Verilog"),
            SourceLanguage::SystemVerilog => write!(f, "SystemVerilog"),
            SourceLanguage::Vhdl => write!(f, "VHDL"),
        }
    }
}

/// Detects the HDL language from a file's extension.
///
/// Returns `None` for unrecognized extensions.
pub fn detect_language(path: &Path) -> Option<SourceLanguage> {
    match path.extension()?.to_str()? {
        "v" => Some(SourceLanguage::Verilog),
        "sv" => Some(SourceLanguage::SystemVerilog),
        "vhd" | "vhdl" => Some(SourceLanguage::Vhdl),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_by_extension() {
        assert_eq!(
            detect_language(Path::new("apf_top.v")),
            Some(SourceLanguage::Verilog)
        );
        assert_eq!(
            detect_language(Path::new("core.sv")),
            Some(SourceLanguage::SystemVerilog)
        );
        assert_eq!(
            detect_language(Path::new("pong.vhd")),
            Some(SourceLanguage::Vhdl)
        );
        assert_eq!(
            detect_language(Path::new("ball.vhdl")),
            Some(SourceLanguage::Vhdl)
        );
        assert_eq!(detect_language(Path::new("pll.qip")), None);
        assert_eq!(detect_language(Path::new("Makefile")), None);
    }
}
