//! The outcome of one build invocation.

use crate::stage::{BuildState, Stage};
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use tether_common::ContentHash;
use tether_diagnostics::{Diagnostic, Severity};
use tether_elaborate::Instance;
use tether_sources::SourceUnit;

/// What a build invocation produced.
#[derive(Debug, Clone, Serialize)]
pub struct BuildResult {
    /// The terminal state.
    pub state: BuildState,
    /// The stage that produced this result: the last stage completed on
    /// success, or the stage that failed.
    pub stage: Stage,
    /// `true` if the state is `ProgrammedOrDone`.
    pub succeeded: bool,
    /// The bitstream built or loaded, when there is one.
    pub artifact_path: Option<PathBuf>,
    /// Fingerprint of the composed instance, once elaborated.
    #[serde(serialize_with = "serialize_hash")]
    pub fingerprint: Option<ContentHash>,
    /// The composed instance, once elaborated.
    pub instance: Option<Instance>,
    /// Collected source units, once elaborated.
    pub sources: Vec<SourceUnit>,
    /// Diagnostics in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildResult {
    /// The first error diagnostic, if any.
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics
            .iter()
            .find(|d| d.severity == Severity::Error)
    }

    /// Number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Process exit status: 0 on success, 1 on failure.
    pub fn exit_code(&self) -> i32 {
        if self.succeeded {
            0
        } else {
            1
        }
    }
}

fn serialize_hash<S: Serializer>(hash: &Option<ContentHash>, s: S) -> Result<S::Ok, S::Error> {
    match hash {
        Some(hash) => s.serialize_some(&hash.to_string()),
        None => s.serialize_none(),
    }
}
