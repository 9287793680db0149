//! Diagnostic codes and error types for binding resolution and composition.
//!
//! Error codes `E301`--`E308` and `E312` cover elaboration failures (unknown
//! groups, unbound ports, direction and width conflicts, and so on). Warning
//! code `W301` reports binding-table entries that name no declared port.

use tether_common::Direction;
use tether_diagnostics::{Category, Diagnostic, DiagnosticCode};
use tether_platform::RegistryError;
use thiserror::Error;

/// Binding target names an unknown signal group or field.
pub const E301: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 301,
};

/// Declared port has no binding rule.
pub const E302: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 302,
};

/// Port direction incompatible with its target.
pub const E303: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 303,
};

/// Port wider than its target.
pub const E304: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 304,
};

/// Constant bound to a non-input port, or too wide for the port.
pub const E305: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 305,
};

/// Bindings do not match the component's port list.
pub const E306: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 306,
};

/// Two ports drive the same net.
pub const E307: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 307,
};

/// Stale binding entries rejected by policy.
pub const E308: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 308,
};

/// Component module not found in its interface file.
pub const E312: DiagnosticCode = DiagnosticCode {
    category: Category::Error,
    number: 312,
};

/// Binding entry names a port the component does not declare.
pub const W301: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 301,
};

/// Errors raised while resolving bindings and composing the instance.
///
/// Every variant is a configuration error: it is detected before any backend
/// runs and is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElaborateError {
    /// The binding target names a group the platform does not register.
    #[error("port `{port}` is bound to unknown signal group `{group}` on platform `{platform}`")]
    UnknownSignalGroup {
        /// The port being bound.
        port: String,
        /// The active platform.
        platform: String,
        /// The requested group name.
        group: String,
    },

    /// The binding target addresses a field the group does not have, or a
    /// composite group without a field.
    #[error("port `{port}` is bound to `{target}`: {reason}")]
    UnknownField {
        /// The port being bound.
        port: String,
        /// The target as written, `group` or `group.field`.
        target: String,
        /// What was wrong with the address.
        reason: String,
    },

    /// A declared port has no binding rule.
    #[error("port `{port}` of `{component}` has no binding")]
    UnboundPort {
        /// The component name.
        component: String,
        /// The unbound port.
        port: String,
    },

    /// The port direction cannot use the target's direction.
    #[error("{port_direction} port `{port}` cannot bind to {target_direction} signal `{target}`")]
    DirectionConflict {
        /// The port being bound.
        port: String,
        /// The port's direction.
        port_direction: Direction,
        /// The target net name.
        target: String,
        /// The target's direction.
        target_direction: Direction,
    },

    /// The port is wider than its target.
    #[error("port `{port}` is {port_width} bits wide but `{target}` has {target_width}")]
    WidthMismatch {
        /// The port being bound.
        port: String,
        /// The port width in bits.
        port_width: u32,
        /// The target net name.
        target: String,
        /// The target width in bits.
        target_width: u32,
    },

    /// A constant was bound to a port that cannot take it.
    #[error("port `{port}` cannot be tied to constant {value}: {reason}")]
    InvalidConstantBinding {
        /// The port being bound.
        port: String,
        /// The constant value.
        value: u64,
        /// Why the constant was rejected.
        reason: String,
    },

    /// The binding list does not cover the component's ports exactly.
    #[error("instance of `{component}` is incomplete: {detail}")]
    IncompleteInstance {
        /// The component name.
        component: String,
        /// Which port was missing, extra, or out of order.
        detail: String,
    },

    /// Two ports drive the same platform net.
    #[error("net `{net}` is driven by both `{first}` and `{second}`")]
    MultipleDrivers {
        /// The platform net.
        net: String,
        /// The port that claimed the net first.
        first: String,
        /// The port that tried to drive it again.
        second: String,
    },

    /// The binding table names ports the component does not declare, and the
    /// stale-binding policy is `deny`.
    #[error("bindings name undeclared ports: {}", ports.join(", "))]
    StaleBinding {
        /// The undeclared port names, in table order.
        ports: Vec<String>,
    },

    /// The interface file does not declare the component's module.
    #[error("module `{module}` not found in component interface")]
    ComponentNotFound {
        /// The module name searched for.
        module: String,
    },

    /// The module header could not be read as an ANSI port list.
    #[error("cannot read port list of module `{module}`: {reason}")]
    InvalidInterface {
        /// The module being scanned.
        module: String,
        /// What could not be parsed.
        reason: String,
    },
}

impl ElaborateError {
    /// Builds an `UnknownSignalGroup` or `UnknownField` error for `port` from
    /// a registry lookup failure.
    pub fn from_registry(port: &str, target: &str, err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownSignalGroup { platform, group } => {
                ElaborateError::UnknownSignalGroup {
                    port: port.to_string(),
                    platform,
                    group,
                }
            }
            other => ElaborateError::UnknownField {
                port: port.to_string(),
                target: target.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Returns the diagnostic code for this error.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            ElaborateError::UnknownSignalGroup { .. } | ElaborateError::UnknownField { .. } => E301,
            ElaborateError::UnboundPort { .. } => E302,
            ElaborateError::DirectionConflict { .. } => E303,
            ElaborateError::WidthMismatch { .. } => E304,
            ElaborateError::InvalidConstantBinding { .. } => E305,
            ElaborateError::IncompleteInstance { .. } => E306,
            ElaborateError::MultipleDrivers { .. } => E307,
            ElaborateError::StaleBinding { .. } => E308,
            ElaborateError::ComponentNotFound { .. } | ElaborateError::InvalidInterface { .. } => {
                E312
            }
        }
    }

    /// Converts this error into an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string());
        match self {
            ElaborateError::UnknownSignalGroup { port, .. } => diag
                .with_subject(port.clone())
                .with_help("run `tether platform` to list the groups this platform provides"),
            ElaborateError::UnknownField { port, .. } => diag.with_subject(port.clone()),
            ElaborateError::UnboundPort { port, .. } => diag
                .with_subject(port.clone())
                .with_note("every declared port needs exactly one binding")
                .with_help(format!(
                    "add `{port} = {{ internal = true }}` to [bindings] to leave it unconnected"
                )),
            ElaborateError::DirectionConflict { port, .. } => diag.with_subject(port.clone()),
            ElaborateError::WidthMismatch { port, .. } => diag.with_subject(port.clone()),
            ElaborateError::InvalidConstantBinding { port, .. } => diag
                .with_subject(port.clone())
                .with_note("only input ports can be tied to constants"),
            ElaborateError::IncompleteInstance { component, .. } => {
                diag.with_subject(component.clone())
            }
            ElaborateError::MultipleDrivers { net, .. } => diag
                .with_subject(net.clone())
                .with_help("bind one of the ports to `{ internal = true }` instead"),
            ElaborateError::StaleBinding { .. } => diag.with_help(
                "remove the entries or set `stale_bindings = \"warn\"` under [elaborate]",
            ),
            ElaborateError::ComponentNotFound { module }
            | ElaborateError::InvalidInterface { module, .. } => diag
                .with_subject(module.clone())
                .with_help("the interface file must declare the module with an ANSI port list"),
        }
    }
}

/// Creates a warning for a binding entry naming an undeclared port.
pub fn warn_stale_binding(port: &str, component: &str) -> Diagnostic {
    Diagnostic::warning(
        W301,
        format!("binding for `{port}` ignored: `{component}` declares no such port"),
    )
    .with_subject(port)
    .with_help("remove the entry from [bindings]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_diagnostics::Severity;

    #[test]
    fn error_code_formats() {
        assert_eq!(format!("{E301}"), "E301");
        assert_eq!(format!("{E307}"), "E307");
        assert_eq!(format!("{E312}"), "E312");
        assert_eq!(format!("{W301}"), "W301");
    }

    #[test]
    fn unbound_port_diagnostic() {
        let err = ElaborateError::UnboundPort {
            component: "apf_top".to_string(),
            port: "reset".to_string(),
        };
        let d = err.to_diagnostic();
        assert_eq!(d.code, E302);
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.subject.as_deref(), Some("reset"));
        assert_eq!(d.message, "port `reset` of `apf_top` has no binding");
        assert!(d.help[0].contains("internal = true"));
    }

    #[test]
    fn registry_errors_map_to_e301() {
        let err = ElaborateError::from_registry(
            "x",
            "hdmi",
            RegistryError::UnknownSignalGroup {
                platform: "analog_pocket".to_string(),
                group: "hdmi".to_string(),
            },
        );
        assert!(matches!(err, ElaborateError::UnknownSignalGroup { .. }));
        assert_eq!(err.code(), E301);

        let err = ElaborateError::from_registry(
            "x",
            "cart",
            RegistryError::FieldRequired {
                group: "cart".to_string(),
            },
        );
        assert!(matches!(err, ElaborateError::UnknownField { .. }));
        assert_eq!(err.code(), E301);
    }

    #[test]
    fn direction_conflict_message() {
        let err = ElaborateError::DirectionConflict {
            port: "led".to_string(),
            port_direction: Direction::Output,
            target: "vblank".to_string(),
            target_direction: Direction::Input,
        };
        assert_eq!(
            err.to_string(),
            "output port `led` cannot bind to input signal `vblank`"
        );
    }

    #[test]
    fn stale_binding_lists_ports() {
        let err = ElaborateError::StaleBinding {
            ports: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "bindings name undeclared ports: a, b");
        assert_eq!(err.code(), E308);
    }

    #[test]
    fn stale_warning() {
        let d = warn_stale_binding("old", "apf_top");
        assert_eq!(d.code, W301);
        assert_eq!(d.severity, Severity::Warning);
    }
}
