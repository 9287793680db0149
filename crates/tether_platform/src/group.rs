//! Signal groups: the named pieces of a platform's physical I/O surface.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use tether_common::Direction;

/// Location and electrical metadata for a signal's pins.
///
/// The resolver never interprets this; backends turn it into pin-location and
/// I/O-standard assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalConstraint {
    /// Pin locations, least significant bit first. Empty when the platform
    /// leaves placement to a vendor template.
    pub pins: Vec<String>,
    /// The I/O standard, if the platform pins one down.
    pub io_standard: Option<String>,
}

impl PhysicalConstraint {
    /// A constraint with no placement or electrical information.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Returns `true` if no pin or I/O standard is recorded.
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty() && self.io_standard.is_none()
    }
}

/// A named sub-signal of a composite connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalField {
    /// The field name, unique within its group.
    pub name: String,
    /// The field direction.
    pub direction: Direction,
    /// The field width in bits.
    pub width: u32,
    /// Physical metadata for the field's pins.
    pub constraint: PhysicalConstraint,
}

/// The shape of a signal group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupLayout {
    /// A single signal vector.
    Scalar {
        /// The signal direction.
        direction: Direction,
        /// The signal width in bits.
        width: u32,
        /// Physical metadata for the signal's pins.
        constraint: PhysicalConstraint,
    },
    /// A connector made of named sub-signals, in declaration order.
    Composite(Vec<SignalField>),
}

/// A named collection of physical I/O on a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalGroup {
    /// The group name, unique within a platform.
    pub name: String,
    /// Scalar or composite layout.
    pub layout: GroupLayout,
}

/// One addressable run of platform pins: a scalar group or one field of a
/// composite group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lane {
    /// The group name.
    pub group: String,
    /// The field name, for composite groups.
    pub field: Option<String>,
    /// The lane direction.
    pub direction: Direction,
    /// The lane width in bits.
    pub width: u32,
    /// Physical metadata for the lane's pins.
    pub constraint: PhysicalConstraint,
}

impl Lane {
    /// The name of the top-level net carrying this lane: the group name, or
    /// `group_field` for a composite field.
    pub fn net_name(&self) -> String {
        match &self.field {
            Some(field) => format!("{}_{}", self.group, field),
            None => self.group.clone(),
        }
    }
}

impl SignalGroup {
    /// Creates a scalar group.
    pub fn scalar(name: impl Into<String>, direction: Direction, width: u32) -> Self {
        Self {
            name: name.into(),
            layout: GroupLayout::Scalar {
                direction,
                width,
                constraint: PhysicalConstraint::unconstrained(),
            },
        }
    }

    /// Creates a composite group from its fields.
    pub fn composite(name: impl Into<String>, fields: Vec<SignalField>) -> Self {
        Self {
            name: name.into(),
            layout: GroupLayout::Composite(fields),
        }
    }

    /// Attaches a physical constraint to a scalar group. Composite groups
    /// carry constraints per field and are returned unchanged.
    pub fn with_constraint(mut self, new: PhysicalConstraint) -> Self {
        if let GroupLayout::Scalar { constraint, .. } = &mut self.layout {
            *constraint = new;
        }
        self
    }

    /// Returns `true` for composite connectors.
    pub fn is_composite(&self) -> bool {
        matches!(self.layout, GroupLayout::Composite(_))
    }

    /// Returns the fields of a composite group; empty for scalar groups.
    pub fn fields(&self) -> &[SignalField] {
        match &self.layout {
            GroupLayout::Composite(fields) => fields,
            GroupLayout::Scalar { .. } => &[],
        }
    }

    /// Returns the total number of pins in this group.
    pub fn total_width(&self) -> u32 {
        match &self.layout {
            GroupLayout::Scalar { width, .. } => *width,
            GroupLayout::Composite(fields) => fields.iter().map(|f| f.width).sum(),
        }
    }

    /// Names of the top-level nets this group's lanes occupy.
    pub fn net_names(&self) -> Vec<String> {
        match &self.layout {
            GroupLayout::Scalar { .. } => vec![self.name.clone()],
            GroupLayout::Composite(fields) => fields
                .iter()
                .map(|f| format!("{}_{}", self.name, f.name))
                .collect(),
        }
    }

    /// Addresses the whole group (`None`) or one of its fields.
    ///
    /// A scalar group is only addressable as a whole and a composite group
    /// only through a field.
    pub fn lane(&self, field: Option<&str>) -> Result<Lane, RegistryError> {
        match (&self.layout, field) {
            (
                GroupLayout::Scalar {
                    direction,
                    width,
                    constraint,
                },
                None,
            ) => Ok(Lane {
                group: self.name.clone(),
                field: None,
                direction: *direction,
                width: *width,
                constraint: constraint.clone(),
            }),
            (GroupLayout::Scalar { .. }, Some(field)) => Err(RegistryError::UnknownField {
                group: self.name.clone(),
                field: field.to_string(),
            }),
            (GroupLayout::Composite(_), None) => Err(RegistryError::FieldRequired {
                group: self.name.clone(),
            }),
            (GroupLayout::Composite(fields), Some(name)) => fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| Lane {
                    group: self.name.clone(),
                    field: Some(f.name.clone()),
                    direction: f.direction,
                    width: f.width,
                    constraint: f.constraint.clone(),
                })
                .ok_or_else(|| RegistryError::UnknownField {
                    group: self.name.clone(),
                    field: name.to_string(),
                }),
        }
    }

    /// Checks widths, field uniqueness, and pin counts.
    pub(crate) fn validate(&self) -> Result<(), RegistryError> {
        match &self.layout {
            GroupLayout::Scalar {
                width, constraint, ..
            } => check_signal(&self.name, *width, constraint),
            GroupLayout::Composite(fields) => {
                let mut seen = std::collections::HashSet::new();
                for field in fields {
                    if !seen.insert(field.name.as_str()) {
                        return Err(RegistryError::DuplicateField {
                            group: self.name.clone(),
                            field: field.name.clone(),
                        });
                    }
                    let net = format!("{}_{}", self.name, field.name);
                    check_signal(&net, field.width, &field.constraint)?;
                }
                Ok(())
            }
        }
    }
}

fn check_signal(
    name: &str,
    width: u32,
    constraint: &PhysicalConstraint,
) -> Result<(), RegistryError> {
    if width == 0 {
        return Err(RegistryError::ZeroWidth(name.to_string()));
    }
    if !constraint.pins.is_empty() && constraint.pins.len() != width as usize {
        return Err(RegistryError::PinCountMismatch {
            name: name.to_string(),
            width,
            pins: constraint.pins.len(),
        });
    }
    Ok(())
}

impl SignalField {
    /// Creates an unconstrained field.
    pub fn new(name: impl Into<String>, direction: Direction, width: u32) -> Self {
        Self {
            name: name.into(),
            direction,
            width,
            constraint: PhysicalConstraint::unconstrained(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> SignalGroup {
        SignalGroup::composite(
            "cart",
            vec![
                SignalField::new("tran_bank2", Direction::InOut, 8),
                SignalField::new("tran_bank2_dir", Direction::Output, 1),
            ],
        )
    }

    #[test]
    fn scalar_lane_uses_group_name() {
        let group = SignalGroup::scalar("vblank", Direction::Input, 1);
        let lane = group.lane(None).unwrap();
        assert_eq!(lane.net_name(), "vblank");
        assert_eq!(lane.direction, Direction::Input);
        assert!(!group.is_composite());
    }

    #[test]
    fn composite_lane_joins_names() {
        let lane = cart().lane(Some("tran_bank2")).unwrap();
        assert_eq!(lane.net_name(), "cart_tran_bank2");
        assert_eq!(lane.width, 8);
        assert_eq!(lane.direction, Direction::InOut);
    }

    #[test]
    fn composite_requires_field() {
        assert_eq!(
            cart().lane(None).unwrap_err(),
            RegistryError::FieldRequired {
                group: "cart".to_string()
            }
        );
    }

    #[test]
    fn unknown_field_errors() {
        let err = cart().lane(Some("tran_bank9")).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownField { .. }));
        let scalar = SignalGroup::scalar("user1", Direction::Output, 1);
        assert!(matches!(
            scalar.lane(Some("x")).unwrap_err(),
            RegistryError::UnknownField { .. }
        ));
    }

    #[test]
    fn total_width_sums_fields() {
        assert_eq!(cart().total_width(), 9);
    }

    #[test]
    fn validate_rejects_pin_count_mismatch() {
        let group = SignalGroup::scalar("led", Direction::Output, 2).with_constraint(
            PhysicalConstraint {
                pins: vec!["PIN_A1".to_string()],
                io_standard: None,
            },
        );
        assert!(matches!(
            group.validate().unwrap_err(),
            RegistryError::PinCountMismatch { pins: 1, width: 2, .. }
        ));
    }

    #[test]
    fn validate_rejects_duplicate_fields() {
        let group = SignalGroup::composite(
            "bus",
            vec![
                SignalField::new("a", Direction::Input, 1),
                SignalField::new("a", Direction::Output, 1),
            ],
        );
        assert!(matches!(
            group.validate().unwrap_err(),
            RegistryError::DuplicateField { .. }
        ));
    }
}
