//! Pipeline stages and the orchestrator's state machine.

use serde::Serialize;
use std::fmt;

/// A pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Platform registered, component interface and binding table accepted.
    Configured,
    /// Bindings resolved, instance composed, sources collected.
    Elaborated,
    /// Build backend finished.
    Synthesized,
    /// Device programmed, or nothing left to do.
    ProgrammedOrDone,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Configured => write!(f, "configure"),
            Stage::Elaborated => write!(f, "elaborate"),
            Stage::Synthesized => write!(f, "synthesize"),
            Stage::ProgrammedOrDone => write!(f, "program"),
        }
    }
}

/// Where a build invocation stands.
///
/// `Configured → Elaborated → Synthesized → ProgrammedOrDone`, with any
/// stage able to end in `Failed`. Both `ProgrammedOrDone` and `Failed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    /// See [`Stage::Configured`].
    Configured,
    /// See [`Stage::Elaborated`].
    Elaborated,
    /// See [`Stage::Synthesized`].
    Synthesized,
    /// Terminal success.
    ProgrammedOrDone,
    /// Terminal failure in the given stage.
    Failed(Stage),
}

impl BuildState {
    /// The state reached by completing `stage`.
    pub fn reached(stage: Stage) -> Self {
        match stage {
            Stage::Configured => BuildState::Configured,
            Stage::Elaborated => BuildState::Elaborated,
            Stage::Synthesized => BuildState::Synthesized,
            Stage::ProgrammedOrDone => BuildState::ProgrammedOrDone,
        }
    }

    /// Returns `true` for `ProgrammedOrDone` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, BuildState::ProgrammedOrDone | BuildState::Failed(_))
    }

    /// Returns `true` for `Failed`.
    pub fn is_failed(self) -> bool {
        matches!(self, BuildState::Failed(_))
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildState::Configured => write!(f, "configured"),
            BuildState::Elaborated => write!(f, "elaborated"),
            BuildState::Synthesized => write!(f, "synthesized"),
            BuildState::ProgrammedOrDone => write!(f, "done"),
            BuildState::Failed(stage) => write!(f, "failed at {stage}"),
        }
    }
}
