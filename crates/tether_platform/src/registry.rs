//! The signal group registry for one platform.

use crate::builtin;
use crate::error::RegistryError;
use crate::group::SignalGroup;
use serde::Serialize;
use std::collections::HashMap;
use tether_config::{ProgramMode, ProgrammerKind};

/// How a platform is programmed when the project does not say otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgrammingDefaults {
    /// The programmer tool.
    pub tool: ProgrammerKind,
    /// The cable name passed to the programmer.
    pub cable: String,
    /// The configuration memory to program.
    pub mode: ProgramMode,
}

/// Identity and device details of a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformInfo {
    /// The platform id (e.g., "analog_pocket").
    pub id: String,
    /// Full device part number.
    pub device: String,
    /// Device family name, in the backend's spelling (e.g., "cyclone_v").
    pub family: String,
    /// Programming defaults.
    pub programming: ProgrammingDefaults,
}

/// The signal groups of one platform, frozen after registration.
///
/// Lookups are read-only, so one registry can serve any number of
/// instantiations within a build.
#[derive(Debug, Clone)]
pub struct SignalRegistry {
    info: PlatformInfo,
    groups: Vec<SignalGroup>,
    index: HashMap<String, usize>,
}

impl SignalRegistry {
    /// Registers the groups of a built-in platform.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownPlatform`] if no built-in platform has
    /// this id.
    pub fn register(platform_id: &str) -> Result<Self, RegistryError> {
        builtin::lookup(platform_id)
            .ok_or_else(|| RegistryError::UnknownPlatform(platform_id.to_string()))?
    }

    /// Looks up a group by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSignalGroup`] if the name was never
    /// registered for this platform.
    pub fn request(&self, name: &str) -> Result<&SignalGroup, RegistryError> {
        self.index
            .get(name)
            .map(|&i| &self.groups[i])
            .ok_or_else(|| RegistryError::UnknownSignalGroup {
                platform: self.info.id.clone(),
                group: name.to_string(),
            })
    }

    /// Returns `true` if a group with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the platform's identity and device details.
    pub fn info(&self) -> &PlatformInfo {
        &self.info
    }

    /// Iterates over the groups in registration order.
    pub fn groups(&self) -> impl Iterator<Item = &SignalGroup> {
        self.groups.iter()
    }

    /// Returns the number of registered groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if the platform has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Collects the groups of a platform before freezing them into a [`SignalRegistry`].
#[derive(Debug)]
pub struct RegistryBuilder {
    info: PlatformInfo,
    groups: Vec<SignalGroup>,
    index: HashMap<String, usize>,
    // net name -> owning group
    nets: HashMap<String, String>,
}

impl RegistryBuilder {
    /// Starts a registry for the given platform.
    pub fn new(info: PlatformInfo) -> Self {
        Self {
            info,
            groups: Vec::new(),
            index: HashMap::new(),
            nets: HashMap::new(),
        }
    }

    /// Adds a group after validating it.
    ///
    /// # Errors
    ///
    /// Rejects duplicate group or field names, zero widths, and pin lists
    /// that disagree with the declared width. A group whose lanes would
    /// share a net name with an earlier group (scalar `cart_data` against
    /// composite `cart` with field `data`) is rejected as well.
    pub fn add(&mut self, group: SignalGroup) -> Result<(), RegistryError> {
        if self.index.contains_key(&group.name) {
            return Err(RegistryError::DuplicateGroup(group.name));
        }
        group.validate()?;
        let nets = group.net_names();
        if let Some((net, owner)) = nets
            .iter()
            .find_map(|net| self.nets.get(net).map(|owner| (net, owner)))
        {
            return Err(RegistryError::NetNameCollision {
                net: net.clone(),
                group: group.name.clone(),
                owner: owner.clone(),
            });
        }
        for net in nets {
            self.nets.insert(net, group.name.clone());
        }
        self.index.insert(group.name.clone(), self.groups.len());
        self.groups.push(group);
        Ok(())
    }

    /// Freezes the registry.
    pub fn finish(self) -> SignalRegistry {
        tracing::debug!(
            platform = %self.info.id,
            groups = self.groups.len(),
            "registered platform signal groups"
        );
        SignalRegistry {
            info: self.info,
            groups: self.groups,
            index: self.index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{SignalField, SignalGroup};
    use tether_common::Direction;

    fn info() -> PlatformInfo {
        PlatformInfo {
            id: "bench".to_string(),
            device: "5CEBA4F23C8".to_string(),
            family: "cyclone_v".to_string(),
            programming: ProgrammingDefaults {
                tool: ProgrammerKind::Quartus,
                cable: "USB-Blaster".to_string(),
                mode: ProgramMode::Sram,
            },
        }
    }

    #[test]
    fn request_registered_group() {
        let mut builder = RegistryBuilder::new(info());
        builder
            .add(SignalGroup::composite(
                "cart",
                vec![SignalField::new("data", Direction::InOut, 8)],
            ))
            .unwrap();
        let registry = builder.finish();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("cart"));
        assert_eq!(registry.request("cart").unwrap().total_width(), 8);
    }

    #[test]
    fn request_unknown_group_errors() {
        let registry = RegistryBuilder::new(info()).finish();
        assert!(registry.is_empty());
        assert_eq!(
            registry.request("hdmi").unwrap_err(),
            RegistryError::UnknownSignalGroup {
                platform: "bench".to_string(),
                group: "hdmi".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_group_rejected() {
        let mut builder = RegistryBuilder::new(info());
        builder
            .add(SignalGroup::scalar("led", Direction::Output, 1))
            .unwrap();
        let err = builder
            .add(SignalGroup::scalar("led", Direction::Input, 1))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateGroup("led".to_string()));
    }

    #[test]
    fn colliding_net_names_rejected() {
        let mut builder = RegistryBuilder::new(info());
        builder
            .add(SignalGroup::scalar("cart_data", Direction::Input, 8))
            .unwrap();
        let err = builder
            .add(SignalGroup::composite(
                "cart",
                vec![
                    SignalField::new("ctrl", Direction::Output, 1),
                    SignalField::new("data", Direction::Input, 8),
                ],
            ))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::NetNameCollision {
                net: "cart_data".to_string(),
                group: "cart".to_string(),
                owner: "cart_data".to_string(),
            }
        );

        // The rejected group leaves nothing behind.
        builder
            .add(SignalGroup::scalar("cart_ctrl", Direction::Output, 1))
            .unwrap();
        let registry = builder.finish();
        assert!(!registry.contains("cart"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn scalar_after_composite_collision_rejected() {
        let mut builder = RegistryBuilder::new(info());
        builder
            .add(SignalGroup::composite(
                "cart",
                vec![SignalField::new("data", Direction::InOut, 8)],
            ))
            .unwrap();
        let err = builder
            .add(SignalGroup::scalar("cart_data", Direction::Output, 8))
            .unwrap_err();
        assert!(matches!(err, RegistryError::NetNameCollision { ref owner, .. } if owner == "cart"));
    }

    #[test]
    fn zero_width_rejected() {
        let mut builder = RegistryBuilder::new(info());
        let err = builder
            .add(SignalGroup::scalar("nothing", Direction::Output, 0))
            .unwrap_err();
        assert_eq!(err, RegistryError::ZeroWidth("nothing".to_string()));
    }

    #[test]
    fn groups_iterate_in_registration_order() {
        let mut builder = RegistryBuilder::new(info());
        for name in ["b", "a", "c"] {
            builder
                .add(SignalGroup::scalar(name, Direction::Input, 1))
                .unwrap();
        }
        let registry = builder.finish();
        let names: Vec<_> = registry.groups().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn register_unknown_builtin_errors() {
        let err = SignalRegistry::register("no_such_board").unwrap_err();
        assert_eq!(err, RegistryError::UnknownPlatform("no_such_board".to_string()));
    }
}
