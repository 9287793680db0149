//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{BindingSpec, GroupDef, ProjectConfig};
use std::collections::HashSet;
use std::path::Path;

/// The name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "tether.toml";

/// Loads and validates a `tether.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `tether.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
///
/// Binding targets are not checked against any platform here; that happens
/// when bindings are resolved.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.platform.id.is_empty() {
        return Err(ConfigError::MissingField("platform.id".to_string()));
    }
    if config.component.name.is_empty() {
        return Err(ConfigError::MissingField("component.name".to_string()));
    }

    let component = &config.component;
    match (component.ports.is_empty(), component.interface.is_some()) {
        (true, false) => {
            return Err(ConfigError::MissingField(
                "component.ports or component.interface".to_string(),
            ))
        }
        (false, true) => {
            return Err(ConfigError::ValidationError(
                "component declares both inline ports and an interface file".to_string(),
            ))
        }
        _ => {}
    }

    let top = config.top_name();
    if top == component.name {
        return Err(ConfigError::ValidationError(format!(
            "generated top '{top}' has the same name as the component it instantiates; set build.top"
        )));
    }

    let mut seen = HashSet::new();
    for port in &component.ports {
        if !seen.insert(port.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate component port '{}'",
                port.name
            )));
        }
        if port.width == 0 {
            return Err(ConfigError::ValidationError(format!(
                "component port '{}' has zero width",
                port.name
            )));
        }
    }

    for (port, spec) in &config.bindings {
        match spec {
            BindingSpec::Internal { internal: false } => {
                return Err(ConfigError::ValidationError(format!(
                    "binding for '{port}' sets internal = false; omit the entry or bind it to a target"
                )))
            }
            BindingSpec::Path(path) if path.is_empty() => {
                return Err(ConfigError::ValidationError(format!(
                    "binding for '{port}' has an empty target"
                )))
            }
            _ => {}
        }
    }

    for (id, platform) in &config.platforms {
        for (name, group) in &platform.groups {
            validate_group(id, name, group)?;
        }
    }

    for root in &config.sources {
        if root.path.is_empty() {
            return Err(ConfigError::ValidationError(
                "source root with an empty path".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_group(platform: &str, name: &str, group: &GroupDef) -> Result<(), ConfigError> {
    let scalar = group.direction.is_some() || group.width.is_some();
    if scalar && !group.fields.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "group '{name}' of platform '{platform}' mixes a scalar direction/width with fields"
        )));
    }
    if !scalar && group.fields.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "group '{name}' of platform '{platform}' needs a direction or fields"
        )));
    }
    if scalar && group.direction.is_none() {
        return Err(ConfigError::MissingField(format!(
            "platforms.{platform}.groups.{name}.direction"
        )));
    }
    Ok(())
}
