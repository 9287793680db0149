//! Parsing and validation of `tether.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a strongly-typed
//! [`ProjectConfig`]: the platform to target, the component to instantiate, the
//! declarative binding table, source roots, toolchain directives, and build and
//! programming settings. [`resolve_build`] folds command-line overrides into it.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{parse_directive_override, resolve_build, BuildOverrides, ResolvedBuild};
pub use types::*;
