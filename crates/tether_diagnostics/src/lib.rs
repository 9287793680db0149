//! Diagnostic creation, severity management, and terminal/JSON rendering.
//!
//! This crate provides structured [`Diagnostic`] messages with severity levels,
//! stable codes, and the name of the configuration item they concern. The
//! [`DiagnosticSink`] accumulates diagnostics across a build session, and
//! [`DiagnosticRenderer`] implementations format them for terminals or tools.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
