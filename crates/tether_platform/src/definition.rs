//! Platforms described in `tether.toml`.

use crate::builtin;
use crate::error::RegistryError;
use crate::group::{PhysicalConstraint, SignalField, SignalGroup};
use crate::registry::{PlatformInfo, ProgrammingDefaults, RegistryBuilder, SignalRegistry};
use std::collections::BTreeMap;
use tether_config::{GroupDef, PlatformDef, ProgramMode, ProgrammerKind};

/// Registers a user-defined platform.
///
/// Groups and fields are registered in name order. Such platforms default to
/// SRAM programming through `quartus_pgm` on a USB-Blaster.
pub fn from_definition(id: &str, def: &PlatformDef) -> Result<SignalRegistry, RegistryError> {
    let info = PlatformInfo {
        id: id.to_string(),
        device: def.device.clone(),
        family: def.family.clone(),
        programming: ProgrammingDefaults {
            tool: ProgrammerKind::Quartus,
            cable: "USB-Blaster".to_string(),
            mode: ProgramMode::Sram,
        },
    };

    let mut builder = RegistryBuilder::new(info);
    for (name, group) in &def.groups {
        builder.add(group_from_def(name, group))?;
    }
    Ok(builder.finish())
}

/// Registers the platform selected by `platform_id`.
///
/// A platform defined in the project shadows a built-in one with the same id.
pub fn load_registry(
    platform_id: &str,
    defined: &BTreeMap<String, PlatformDef>,
) -> Result<SignalRegistry, RegistryError> {
    if let Some(def) = defined.get(platform_id) {
        tracing::debug!(platform = platform_id, "using project-defined platform");
        return from_definition(platform_id, def);
    }
    builtin::lookup(platform_id)
        .ok_or_else(|| RegistryError::UnknownPlatform(platform_id.to_string()))?
}

fn group_from_def(name: &str, def: &GroupDef) -> SignalGroup {
    match def.direction {
        Some(direction) if def.fields.is_empty() => {
            SignalGroup::scalar(name, direction, def.width.unwrap_or(1)).with_constraint(
                PhysicalConstraint {
                    pins: def.pins.clone(),
                    io_standard: def.io_standard.clone(),
                },
            )
        }
        _ => SignalGroup::composite(
            name,
            def.fields
                .iter()
                .map(|(field, f)| SignalField {
                    name: field.clone(),
                    direction: f.direction,
                    width: f.width,
                    constraint: PhysicalConstraint {
                        pins: f.pins.clone(),
                        io_standard: f.io_standard.clone().or_else(|| def.io_standard.clone()),
                    },
                })
                .collect(),
        ),
    }
}
