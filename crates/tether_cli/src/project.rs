//! Locating and loading the project a command operates on.

use std::path::{Path, PathBuf};

use tether_config::{load_config_file, ProjectConfig, CONFIG_FILE_NAME};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `tether.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the configuration file from global CLI args.
///
/// `--config` may name the file itself or the directory holding it.
/// Otherwise walks up from the current directory.
pub fn resolve_config_path(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match &global.config {
        Some(config_path) => {
            let path = PathBuf::from(config_path);
            if path.is_dir() {
                Ok(path.join(CONFIG_FILE_NAME))
            } else {
                Ok(path)
            }
        }
        None => Ok(find_project_root(&std::env::current_dir()?)?.join(CONFIG_FILE_NAME)),
    }
}

/// Loads the project, returning its directory and configuration.
///
/// Relative paths in the configuration resolve against the directory
/// holding the file. The returned directory is absolute.
pub fn load_project(
    global: &GlobalArgs,
) -> Result<(PathBuf, ProjectConfig), Box<dyn std::error::Error>> {
    let path = resolve_config_path(global)?;
    let config = load_config_file(&path)
        .map_err(|e| format!("failed to load {}: {e}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((std::path::absolute(dir)?, config))
}
