//! Source aggregation and toolchain directives.
//!
//! [`collect`] walks the declared source roots in caller order and records
//! the HDL files each contributes; [`BuildDirectives`] holds the key/value
//! settings forwarded verbatim to the build backend.

#![warn(missing_docs)]

pub mod collect;
pub mod directives;
pub mod error;
pub mod language;

pub use collect::{collect, SourceFile, SourceRoot, SourceUnit};
pub use directives::BuildDirectives;
pub use error::SourceError;
pub use language::{detect_language, SourceLanguage};
