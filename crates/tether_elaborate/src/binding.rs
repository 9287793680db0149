//! Binding rules and resolved bindings.

use crate::component::ComponentPort;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tether_common::Direction;
use tether_config::BindingSpec;
use tether_platform::Lane;

/// Where a port should be connected, as written in the binding table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingTarget {
    /// A platform signal group, optionally narrowed to one field.
    Group {
        /// The group name.
        group: String,
        /// The field of a composite group.
        field: Option<String>,
    },
    /// A fresh signal private to the instance.
    Internal,
    /// A constant value.
    Constant {
        /// The value; its low bits drive the port.
        value: u64,
    },
}

impl BindingTarget {
    /// Targets a whole scalar group.
    pub fn group(group: impl Into<String>) -> Self {
        BindingTarget::Group {
            group: group.into(),
            field: None,
        }
    }

    /// Targets one field of a composite group.
    pub fn field(group: impl Into<String>, field: impl Into<String>) -> Self {
        BindingTarget::Group {
            group: group.into(),
            field: Some(field.into()),
        }
    }

    /// Parses the `group` / `group.field` shorthand.
    pub fn from_path(path: &str) -> Self {
        match path.split_once('.') {
            Some((group, field)) => Self::field(group, field),
            None => Self::group(path),
        }
    }
}

impl From<&BindingSpec> for BindingTarget {
    fn from(spec: &BindingSpec) -> Self {
        match spec {
            BindingSpec::Path(path) => BindingTarget::from_path(path),
            BindingSpec::Group { group, field } => BindingTarget::Group {
                group: group.clone(),
                field: field.clone(),
            },
            BindingSpec::Internal { .. } => BindingTarget::Internal,
            BindingSpec::Constant { constant } => BindingTarget::Constant { value: *constant },
        }
    }
}

impl fmt::Display for BindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingTarget::Group { group, field: None } => write!(f, "{group}"),
            BindingTarget::Group {
                group,
                field: Some(field),
            } => write!(f, "{group}.{field}"),
            BindingTarget::Internal => write!(f, "<internal>"),
            BindingTarget::Constant { value } => write!(f, "{value}"),
        }
    }
}

/// The binding table: port name to binding rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    rules: BTreeMap<String, BindingTarget>,
}

impl BindingTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from the `[bindings]` section of `tether.toml`.
    pub fn from_config(bindings: &BTreeMap<String, BindingSpec>) -> Self {
        Self {
            rules: bindings
                .iter()
                .map(|(port, spec)| (port.clone(), BindingTarget::from(spec)))
                .collect(),
        }
    }

    /// Adds or replaces the rule for `port`.
    pub fn insert(&mut self, port: impl Into<String>, target: BindingTarget) {
        self.rules.insert(port.into(), target);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, port: impl Into<String>, target: BindingTarget) -> Self {
        self.insert(port, target);
        self
    }

    /// Returns the rule for `port`, if any.
    pub fn get(&self, port: &str) -> Option<&BindingTarget> {
        self.rules.get(port)
    }

    /// Iterates over the rules in port-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BindingTarget)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The signal a port ended up connected to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundSignal {
    /// A platform lane, exposed as a top-level pad.
    Lane(Lane),
    /// A signal private to the instance.
    Internal {
        /// The allocated signal name, unique within the instance.
        name: String,
        /// The signal width in bits.
        width: u32,
    },
    /// A constant driving an input port.
    Constant {
        /// The constant value.
        value: u64,
        /// The width of the literal, equal to the port width.
        width: u32,
    },
}

impl BoundSignal {
    /// The net name the port connects to; `None` for constants.
    pub fn net_name(&self) -> Option<String> {
        match self {
            BoundSignal::Lane(lane) => Some(lane.net_name()),
            BoundSignal::Internal { name, .. } => Some(name.clone()),
            BoundSignal::Constant { .. } => None,
        }
    }
}

/// One component port and the signal it is connected to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    /// The component port.
    pub port: ComponentPort,
    /// The resolved connection.
    pub signal: BoundSignal,
}

impl Binding {
    /// The direction of the binding, which is the port's direction.
    pub fn direction(&self) -> Direction {
        self.port.direction
    }

    /// Returns `true` if this binding drives its net.
    pub fn drives(&self) -> bool {
        self.port.direction.accepts_writes()
    }
}
