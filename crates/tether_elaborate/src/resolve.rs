//! Pin binding resolution: component ports to platform lanes, internal
//! signals, and constants.

use crate::binding::{Binding, BindingTable, BindingTarget, BoundSignal};
use crate::component::{ComponentInterface, ComponentPort};
use crate::errors::{warn_stale_binding, ElaborateError};
use std::collections::{HashMap, HashSet};
use tether_common::Direction;
use tether_config::StalePolicy;
use tether_diagnostics::DiagnosticSink;
use tether_platform::{GroupLayout, Lane, SignalRegistry};

/// Resolves a component's ports against a platform registry and a binding
/// table.
///
/// The resolver only reads the registry; internal signal names are allocated
/// per call, so one registry can serve several instances.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a SignalRegistry,
    table: &'a BindingTable,
    stale_policy: StalePolicy,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver with the default stale-binding policy (`warn`).
    pub fn new(registry: &'a SignalRegistry, table: &'a BindingTable) -> Self {
        Self {
            registry,
            table,
            stale_policy: StalePolicy::default(),
        }
    }

    /// Sets how table entries for undeclared ports are treated.
    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    /// Produces one binding per declared port, in declaration order.
    ///
    /// Stops at the first port that cannot be bound. Stale table entries are
    /// reported to `sink` as warnings, ignored, or rejected according to the
    /// stale-binding policy.
    pub fn resolve(
        &self,
        component: &ComponentInterface,
        instance: &str,
        sink: &DiagnosticSink,
    ) -> Result<Vec<Binding>, ElaborateError> {
        self.check_stale(component, sink)?;

        let mut names = InternalNames::reserving(self.registry);
        let mut drivers: HashMap<String, String> = HashMap::new();
        let mut bindings = Vec::with_capacity(component.len());

        for port in &component.ports {
            let target = self
                .table
                .get(&port.name)
                .ok_or_else(|| ElaborateError::UnboundPort {
                    component: component.name.clone(),
                    port: port.name.clone(),
                })?;

            let signal = match target {
                BindingTarget::Group { group, field } => {
                    let lane = self
                        .registry
                        .request(group)
                        .and_then(|g| g.lane(field.as_deref()))
                        .map_err(|e| {
                            ElaborateError::from_registry(&port.name, &target.to_string(), e)
                        })?;
                    check_lane(port, &lane)?;
                    let net = lane.net_name();
                    if port.direction.accepts_writes() {
                        if let Some(first) = drivers.get(&net) {
                            return Err(ElaborateError::MultipleDrivers {
                                net,
                                first: first.clone(),
                                second: port.name.clone(),
                            });
                        }
                        drivers.insert(net, port.name.clone());
                    }
                    BoundSignal::Lane(lane)
                }
                BindingTarget::Internal => BoundSignal::Internal {
                    name: names.allocate(instance, &port.name),
                    width: port.width,
                },
                BindingTarget::Constant { value } => {
                    check_constant(port, *value)?;
                    BoundSignal::Constant {
                        value: *value,
                        width: port.width,
                    }
                }
            };

            tracing::debug!(port = %port.name, target = %target, "bound port");
            bindings.push(Binding {
                port: port.clone(),
                signal,
            });
        }

        tracing::info!(
            component = %component.name,
            ports = bindings.len(),
            "resolved bindings"
        );
        Ok(bindings)
    }

    fn check_stale(
        &self,
        component: &ComponentInterface,
        sink: &DiagnosticSink,
    ) -> Result<(), ElaborateError> {
        let stale: Vec<String> = self
            .table
            .iter()
            .filter(|(port, _)| component.port(port).is_none())
            .map(|(port, _)| port.to_string())
            .collect();
        if stale.is_empty() {
            return Ok(());
        }
        match self.stale_policy {
            StalePolicy::Allow => Ok(()),
            StalePolicy::Warn => {
                for port in &stale {
                    sink.emit(warn_stale_binding(port, &component.name));
                }
                Ok(())
            }
            StalePolicy::Deny => Err(ElaborateError::StaleBinding { ports: stale }),
        }
    }
}

fn check_lane(port: &ComponentPort, lane: &Lane) -> Result<(), ElaborateError> {
    let compatible = match port.direction {
        Direction::Input => lane.direction.provides_reads(),
        Direction::Output => lane.direction.accepts_writes(),
        Direction::InOut => lane.direction == Direction::InOut,
    };
    if !compatible {
        return Err(ElaborateError::DirectionConflict {
            port: port.name.clone(),
            port_direction: port.direction,
            target: lane.net_name(),
            target_direction: lane.direction,
        });
    }
    if port.width > lane.width {
        return Err(ElaborateError::WidthMismatch {
            port: port.name.clone(),
            port_width: port.width,
            target: lane.net_name(),
            target_width: lane.width,
        });
    }
    Ok(())
}

fn check_constant(port: &ComponentPort, value: u64) -> Result<(), ElaborateError> {
    let invalid = |reason: String| ElaborateError::InvalidConstantBinding {
        port: port.name.clone(),
        value,
        reason,
    };
    if port.direction != Direction::Input {
        return Err(invalid(format!("the port is {}", port.direction)));
    }
    if port.width < 64 && value >> port.width != 0 {
        return Err(invalid(format!(
            "the value does not fit in {} bit(s)",
            port.width
        )));
    }
    Ok(())
}

/// Allocates instance-scoped internal signal names that collide neither with
/// each other nor with any platform net.
struct InternalNames {
    used: HashSet<String>,
}

impl InternalNames {
    fn reserving(registry: &SignalRegistry) -> Self {
        let mut used = HashSet::new();
        for group in registry.groups() {
            match &group.layout {
                GroupLayout::Scalar { .. } => {
                    used.insert(group.name.clone());
                }
                GroupLayout::Composite(fields) => {
                    for field in fields {
                        used.insert(format!("{}_{}", group.name, field.name));
                    }
                }
            }
        }
        Self { used }
    }

    fn allocate(&mut self, instance: &str, port: &str) -> String {
        let base = format!("{instance}_{port}");
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}_{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{E301, W301};
    use tether_config::{ProgramMode, ProgrammerKind};
    use tether_platform::{
        PlatformInfo, ProgrammingDefaults, RegistryBuilder, SignalField, SignalGroup,
    };

    fn bench() -> SignalRegistry {
        let mut builder = RegistryBuilder::new(PlatformInfo {
            id: "bench".to_string(),
            device: "5CEBA4F23C8".to_string(),
            family: "cyclone_v".to_string(),
            programming: ProgrammingDefaults {
                tool: ProgrammerKind::Quartus,
                cable: "USB-Blaster".to_string(),
                mode: ProgramMode::Sram,
            },
        });
        builder
            .add(SignalGroup::scalar("cart", Direction::InOut, 8))
            .unwrap();
        builder
            .add(SignalGroup::scalar("clk", Direction::Input, 1))
            .unwrap();
        builder
            .add(SignalGroup::scalar("led", Direction::Output, 4))
            .unwrap();
        builder
            .add(SignalGroup::composite(
                "scal",
                vec![
                    SignalField::new("vid", Direction::InOut, 12),
                    SignalField::new("audadc", Direction::Input, 1),
                ],
            ))
            .unwrap();
        builder.finish()
    }

    fn component(ports: Vec<ComponentPort>) -> ComponentInterface {
        ComponentInterface::new("core", ports)
    }

    #[test]
    fn bidirectional_port_binds_to_bidirectional_group() {
        let registry = bench();
        let table = BindingTable::new().with("cart_data", BindingTarget::group("cart"));
        let core = component(vec![ComponentPort::new("cart_data", Direction::InOut, 8)]);
        let sink = DiagnosticSink::new();
        let bindings = Resolver::new(&registry, &table)
            .resolve(&core, "core", &sink)
            .unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].direction(), Direction::InOut);
        assert_eq!(bindings[0].signal.net_name().as_deref(), Some("cart"));
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn missing_rule_is_unbound_port() {
        let registry = bench();
        let table = BindingTable::new();
        let core = component(vec![ComponentPort::new("reset", Direction::Input, 1)]);
        let err = Resolver::new(&registry, &table)
            .resolve(&core, "core", &DiagnosticSink::new())
            .unwrap_err();
        assert_eq!(
            err,
            ElaborateError::UnboundPort {
                component: "core".to_string(),
                port: "reset".to_string(),
            }
        );
    }

    #[test]
    fn unknown_group_errors() {
        let registry = bench();
        let table = BindingTable::new().with("x", BindingTarget::group("hdmi"));
        let core = component(vec![ComponentPort::new("x", Direction::Output, 1)]);
        let err = Resolver::new(&registry, &table)
            .resolve(&core, "core", &DiagnosticSink::new())
            .unwrap_err();
        assert!(matches!(err, ElaborateError::UnknownSignalGroup { ref group, .. } if group == "hdmi"));
        assert_eq!(err.code(), E301);
    }

    #[test]
    fn unknown_field_errors() {
        let registry = bench();
        let table = BindingTable::new().with("x", BindingTarget::field("scal", "hdmi"));
        let core = component(vec![ComponentPort::new("x", Direction::Input, 1)]);
        let err = Resolver::new(&registry, &table)
            .resolve(&core, "core", &DiagnosticSink::new())
            .unwrap_err();
        assert!(matches!(err, ElaborateError::UnknownField { .. }));
    }

    #[test]
    fn direction_rules() {
        let registry = bench();
        let sink = DiagnosticSink::new();
        let cases = [
            (Direction::Output, "clk", false),
            (Direction::Input, "led", false),
            (Direction::InOut, "led", false),
            (Direction::Input, "cart", true),
            (Direction::Output, "cart", true),
        ];
        for (direction, group, ok) in cases {
            let width = if group == "clk" { 1 } else { 4 };
            let table = BindingTable::new().with("p", BindingTarget::group(group));
            let core = component(vec![ComponentPort::new("p", direction, width)]);
            let result = Resolver::new(&registry, &table).resolve(&core, "core", &sink);
            if ok {
                assert!(result.is_ok(), "{direction} -> {group}");
            } else {
                assert!(
                    matches!(result, Err(ElaborateError::DirectionConflict { .. })),
                    "{direction} -> {group}"
                );
            }
        }
    }

    #[test]
    fn wider_port_is_width_mismatch() {
        let registry = bench();
        let table = BindingTable::new().with("leds", BindingTarget::group("led"));
        let core = component(vec![ComponentPort::new("leds", Direction::Output, 8)]);
        let err = Resolver::new(&registry, &table)
            .resolve(&core, "core", &DiagnosticSink::new())
            .unwrap_err();
        assert_eq!(
            err,
            ElaborateError::WidthMismatch {
                port: "leds".to_string(),
                port_width: 8,
                target: "led".to_string(),
                target_width: 4,
            }
        );
    }

    #[test]
    fn narrower_port_is_accepted() {
        let registry = bench();
        let table = BindingTable::new().with("vid", BindingTarget::field("scal", "vid"));
        let core = component(vec![ComponentPort::new("vid", Direction::InOut, 8)]);
        let bindings = Resolver::new(&registry, &table)
            .resolve(&core, "core", &DiagnosticSink::new())
            .unwrap();
        let BoundSignal::Lane(lane) = &bindings[0].signal else {
            panic!("expected a lane");
        };
        assert_eq!(lane.width, 12);
        assert_eq!(lane.net_name(), "scal_vid");
    }

    #[test]
    fn constants_only_on_inputs() {
        let registry = bench();
        let table = BindingTable::new()
            .with("mode", BindingTarget::Constant { value: 2 })
            .with("done", BindingTarget::Constant { value: 0 });
        let core = component(vec![
            ComponentPort::new("mode", Direction::Input, 2),
            ComponentPort::new("done", Direction::Output, 1),
        ]);
        let err = Resolver::new(&registry, &table)
            .resolve(&core, "core", &DiagnosticSink::new())
            .unwrap_err();
        assert!(
            matches!(err, ElaborateError::InvalidConstantBinding { ref port, .. } if port == "done")
        );
    }

    #[test]
    fn constant_must_fit_port() {
        let registry = bench();
        let table = BindingTable::new().with("mode", BindingTarget::Constant { value: 4 });
        let core = component(vec![ComponentPort::new("mode", Direction::Input, 2)]);
        let err = Resolver::new(&registry, &table)
            .resolve(&core, "core", &DiagnosticSink::new())
            .unwrap_err();
        assert!(err.to_string().contains("does not fit in 2 bit(s)"));
    }

    #[test]
    fn two_drivers_on_one_net_rejected() {
        let registry = bench();
        let table = BindingTable::new()
            .with("a", BindingTarget::group("led"))
            .with("b", BindingTarget::group("led"));
        let core = component(vec![
            ComponentPort::new("a", Direction::Output, 4),
            ComponentPort::new("b", Direction::Output, 2),
        ]);
        let err = Resolver::new(&registry, &table)
            .resolve(&core, "core", &DiagnosticSink::new())
            .unwrap_err();
        assert_eq!(
            err,
            ElaborateError::MultipleDrivers {
                net: "led".to_string(),
                first: "a".to_string(),
                second: "b".to_string(),
            }
        );
    }

    #[test]
    fn shared_input_net_is_fine() {
        let registry = bench();
        let table = BindingTable::new()
            .with("clk_a", BindingTarget::group("clk"))
            .with("clk_b", BindingTarget::group("clk"));
        let core = component(vec![
            ComponentPort::new("clk_a", Direction::Input, 1),
            ComponentPort::new("clk_b", Direction::Input, 1),
        ]);
        assert!(Resolver::new(&registry, &table)
            .resolve(&core, "core", &DiagnosticSink::new())
            .is_ok());
    }

    #[test]
    fn internal_signals_are_unique_per_instance() {
        let registry = bench();
        let table = BindingTable::new()
            .with("x", BindingTarget::Internal)
            .with("led", BindingTarget::Internal);
        let core = component(vec![
            ComponentPort::new("x", Direction::Output, 3),
            ComponentPort::new("led", Direction::Output, 1),
        ]);
        let bindings = Resolver::new(&registry, &table)
            .resolve(&core, "u", &DiagnosticSink::new())
            .unwrap();
        assert_eq!(
            bindings[0].signal,
            BoundSignal::Internal {
                name: "u_x".to_string(),
                width: 3
            }
        );
        assert_eq!(bindings[1].signal.net_name().as_deref(), Some("u_led"));

        // An instance label that collides with a platform net gets a suffix.
        let table = BindingTable::new().with("led", BindingTarget::Internal);
        let core = component(vec![ComponentPort::new("led", Direction::Output, 1)]);
        let registry = {
            let mut builder = RegistryBuilder::new(registry.info().clone());
            builder
                .add(SignalGroup::scalar("u_led", Direction::Output, 1))
                .unwrap();
            builder.finish()
        };
        let bindings = Resolver::new(&registry, &table)
            .resolve(&core, "u", &DiagnosticSink::new())
            .unwrap();
        assert_eq!(bindings[0].signal.net_name().as_deref(), Some("u_led_1"));
    }

    #[test]
    fn stale_entries_follow_policy() {
        let registry = bench();
        let table = BindingTable::new()
            .with("clk", BindingTarget::group("clk"))
            .with("old", BindingTarget::group("led"));
        let core = component(vec![ComponentPort::new("clk", Direction::Input, 1)]);

        let sink = DiagnosticSink::new();
        Resolver::new(&registry, &table)
            .resolve(&core, "core", &sink)
            .unwrap();
        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, W301);
        assert!(!sink.has_errors());

        let sink = DiagnosticSink::new();
        Resolver::new(&registry, &table)
            .with_stale_policy(StalePolicy::Allow)
            .resolve(&core, "core", &sink)
            .unwrap();
        assert!(sink.diagnostics().is_empty());

        let err = Resolver::new(&registry, &table)
            .with_stale_policy(StalePolicy::Deny)
            .resolve(&core, "core", &DiagnosticSink::new())
            .unwrap_err();
        assert_eq!(
            err,
            ElaborateError::StaleBinding {
                ports: vec!["old".to_string()]
            }
        );
    }

    #[test]
    fn bindings_follow_declaration_order() {
        let registry = bench();
        let table = BindingTable::new()
            .with("z", BindingTarget::group("clk"))
            .with("a", BindingTarget::Internal);
        let core = component(vec![
            ComponentPort::new("z", Direction::Input, 1),
            ComponentPort::new("a", Direction::Output, 1),
        ]);
        let bindings = Resolver::new(&registry, &table)
            .resolve(&core, "core", &DiagnosticSink::new())
            .unwrap();
        let names: Vec<_> = bindings.iter().map(|b| b.port.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}
