//! Signal direction as seen from the FPGA fabric.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The direction of a signal, from the point of view of the FPGA fabric.
///
/// Platform signal groups and component ports share this model: an `Output`
/// platform lane is driven by the fabric, an `Input` lane is read by it, and
/// an `InOut` lane is a tristate pad that can do both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Data flows into the fabric.
    Input,
    /// Data flows out of the fabric.
    Output,
    /// Data flows both ways.
    #[serde(alias = "bidirectional")]
    InOut,
}

impl Direction {
    /// Returns `true` if a signal with this direction can be read by the fabric.
    pub fn provides_reads(self) -> bool {
        matches!(self, Direction::Input | Direction::InOut)
    }

    /// Returns `true` if a signal with this direction can be driven by the fabric.
    pub fn accepts_writes(self) -> bool {
        matches!(self, Direction::Output | Direction::InOut)
    }

    /// Returns the Verilog port keyword for this direction.
    pub fn verilog_keyword(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::InOut => "inout",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
            Direction::InOut => write!(f, "bidirectional"),
        }
    }
}

/// Error returned when a direction string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid direction '{0}' (expected input, output, or inout)")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" | "in" | "i" => Ok(Direction::Input),
            "output" | "out" | "o" => Ok(Direction::Output),
            "inout" | "io" | "bidirectional" => Ok(Direction::InOut),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}
