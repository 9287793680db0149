//! Instance composition: the single top-level instantiation of the component.

use crate::binding::{Binding, BoundSignal};
use crate::component::ComponentInterface;
use crate::errors::ElaborateError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tether_common::ContentHash;
use tether_platform::Lane;

/// The composed top level: one component instance with every port bound.
///
/// Read-only once composed. Two compositions from equal inputs are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// The component (module) name.
    pub component: String,
    /// The instance label.
    pub instance_name: String,
    /// One binding per component port, in declaration order.
    pub bindings: Vec<Binding>,
    /// Platform lanes that become top-level ports, in first-use order.
    pub pads: Vec<Lane>,
}

impl Instance {
    /// Bindings to signals private to the instance.
    pub fn internal_signals(&self) -> impl Iterator<Item = (&str, u32)> {
        self.bindings.iter().filter_map(|b| match &b.signal {
            BoundSignal::Internal { name, width } => Some((name.as_str(), *width)),
            _ => None,
        })
    }

    /// XXH3-128 hash of the instance's JSON form.
    pub fn fingerprint(&self) -> Result<ContentHash, serde_json::Error> {
        ContentHash::of_serialized(self)
    }
}

/// Assembles the instance after checking that `bindings` covers the
/// component's ports exactly, one binding per port in declaration order.
pub fn compose(
    component: &ComponentInterface,
    instance_name: &str,
    bindings: Vec<Binding>,
) -> Result<Instance, ElaborateError> {
    let incomplete = |detail: String| ElaborateError::IncompleteInstance {
        component: component.name.clone(),
        detail,
    };

    if bindings.len() != component.len() {
        return Err(incomplete(format!(
            "{} port(s) declared but {} binding(s) given",
            component.len(),
            bindings.len()
        )));
    }
    for (declared, binding) in component.ports.iter().zip(&bindings) {
        if binding.port != *declared {
            return Err(incomplete(format!(
                "expected a binding for port `{}`, found one for `{}`",
                declared.name, binding.port.name
            )));
        }
    }

    let mut seen = HashSet::new();
    let pads = bindings
        .iter()
        .filter_map(|b| match &b.signal {
            BoundSignal::Lane(lane) => Some(lane),
            _ => None,
        })
        .filter(|lane| seen.insert(lane.net_name()))
        .cloned()
        .collect();

    Ok(Instance {
        component: component.name.clone(),
        instance_name: instance_name.to_string(),
        bindings,
        pads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentPort;
    use tether_common::Direction;
    use tether_platform::PhysicalConstraint;

    fn lane(group: &str, direction: Direction, width: u32) -> Lane {
        Lane {
            group: group.to_string(),
            field: None,
            direction,
            width,
            constraint: PhysicalConstraint::unconstrained(),
        }
    }

    fn fixture() -> (ComponentInterface, Vec<Binding>) {
        let ports = vec![
            ComponentPort::new("clk_a", Direction::Input, 1),
            ComponentPort::new("clk_b", Direction::Input, 1),
            ComponentPort::new("scratch", Direction::Output, 2),
        ];
        let bindings = vec![
            Binding {
                port: ports[0].clone(),
                signal: BoundSignal::Lane(lane("clk", Direction::Input, 1)),
            },
            Binding {
                port: ports[1].clone(),
                signal: BoundSignal::Lane(lane("clk", Direction::Input, 1)),
            },
            Binding {
                port: ports[2].clone(),
                signal: BoundSignal::Internal {
                    name: "core_scratch".to_string(),
                    width: 2,
                },
            },
        ];
        (ComponentInterface::new("core", ports), bindings)
    }

    #[test]
    fn compose_collects_unique_pads() {
        let (component, bindings) = fixture();
        let instance = compose(&component, "core", bindings).unwrap();
        assert_eq!(instance.bindings.len(), 3);
        assert_eq!(instance.pads.len(), 1);
        assert_eq!(instance.pads[0].net_name(), "clk");
        let internals: Vec<_> = instance.internal_signals().collect();
        assert_eq!(internals, vec![("core_scratch", 2)]);
    }

    #[test]
    fn compose_is_deterministic() {
        let (component, bindings) = fixture();
        let a = compose(&component, "core", bindings.clone()).unwrap();
        let b = compose(&component, "core", bindings).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn fingerprint_changes_with_bindings() {
        let (component, bindings) = fixture();
        let a = compose(&component, "core", bindings.clone()).unwrap();
        let b = compose(&component, "u0", bindings).unwrap();
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn missing_binding_is_incomplete() {
        let (component, mut bindings) = fixture();
        bindings.pop();
        let err = compose(&component, "core", bindings).unwrap_err();
        assert_eq!(
            err,
            ElaborateError::IncompleteInstance {
                component: "core".to_string(),
                detail: "3 port(s) declared but 2 binding(s) given".to_string(),
            }
        );
    }

    #[test]
    fn out_of_order_binding_is_incomplete() {
        let (component, mut bindings) = fixture();
        bindings.swap(0, 2);
        let err = compose(&component, "core", bindings).unwrap_err();
        assert!(err.to_string().contains("expected a binding for port `clk_a`"));
    }
}
