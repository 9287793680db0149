//! Build resolution: folding command-line overrides into the file configuration.

use crate::error::ConfigError;
use crate::types::{BackendKind, ProjectConfig};

/// Command-line overrides layered over `tether.toml`.
#[derive(Debug, Clone, Default)]
pub struct BuildOverrides {
    /// Extra directives; applied after the file's `[directives]`.
    pub directives: Vec<(String, String)>,
    /// Replaces `build.output_dir`.
    pub output_dir: Option<String>,
    /// Replaces `build.run_toolchain`.
    pub run_toolchain: Option<bool>,
}

/// The effective build settings with overrides applied.
#[derive(Debug, Clone)]
pub struct ResolvedBuild {
    /// The build name (the project name).
    pub name: String,
    /// The generated top-level module name.
    pub top: String,
    /// The synthesis backend.
    pub backend: BackendKind,
    /// Output directory, relative to the project directory unless absolute.
    pub output_dir: String,
    /// Whether the vendor toolchain is invoked.
    pub run_toolchain: bool,
    /// Requested output bitstream formats.
    pub output_formats: Vec<String>,
    /// Directives in application order: file entries first, then overrides.
    ///
    /// Later entries win over earlier ones with the same key.
    pub directives: Vec<(String, String)>,
}

/// Resolves the effective build settings for a project.
///
/// File directives come first in key order, followed by command-line
/// directives in the order given, so a command-line `KEY=VALUE` replaces the
/// file's value for `KEY` once the list is applied.
pub fn resolve_build(config: &ProjectConfig, overrides: &BuildOverrides) -> ResolvedBuild {
    let mut directives: Vec<(String, String)> = config
        .directives
        .iter()
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect();
    directives.extend(overrides.directives.iter().cloned());

    ResolvedBuild {
        name: config.project.name.clone(),
        top: config.top_name(),
        backend: config.build.backend,
        output_dir: overrides
            .output_dir
            .clone()
            .unwrap_or_else(|| config.build.output_dir.clone()),
        run_toolchain: overrides
            .run_toolchain
            .unwrap_or(config.build.run_toolchain),
        output_formats: config.build.output_formats.clone(),
        directives,
    }
}

/// Parses a `KEY=VALUE` directive override.
pub fn parse_directive_override(raw: &str) -> Result<(String, String), ConfigError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(raw.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::InvalidOverride(raw.to_string()));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
