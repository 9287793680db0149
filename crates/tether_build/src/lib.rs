//! Orchestration of a tether build.
//!
//! A [`BuildSession`] drives one project through a fixed sequence of stages:
//! `Configured → Elaborated → Synthesized → ProgrammedOrDone`. Each stage
//! either completes or ends the run in [`BuildState::Failed`]; nothing is
//! retried and a failed synthesis never reaches the programmer. The outcome,
//! including every diagnostic emitted along the way, is a [`BuildResult`].

#![warn(missing_docs)]

pub mod error;
pub mod manifest;
pub mod result;
pub mod session;
pub mod stage;

pub use error::{ConfigurationError, StageError};
pub use manifest::BuildManifest;
pub use result::BuildResult;
pub use session::{BuildOptions, BuildSession};
pub use stage::{BuildState, Stage};
