//! Binding resolution and instance composition.
//!
//! Turns a component's declared ports, a binding table, and a platform's
//! [`SignalRegistry`] into one fully bound [`Instance`], then renders it as a
//! Verilog top level.
//!
//! # Usage
//!
//! ```ignore
//! let instance = elaborate(&component, "apf_top", &registry, &table, StalePolicy::Warn, &sink)?;
//! let verilog = emit_verilog(&instance, "pong_top");
//! ```

#![warn(missing_docs)]

pub mod binding;
pub mod component;
pub mod compose;
pub mod emit;
pub mod errors;
pub mod resolve;

pub use binding::{Binding, BindingTable, BindingTarget, BoundSignal};
pub use component::{scan_verilog_header, ComponentInterface, ComponentPort};
pub use compose::{compose, Instance};
pub use emit::emit_verilog;
pub use errors::ElaborateError;
pub use resolve::Resolver;

use tether_config::StalePolicy;
use tether_diagnostics::DiagnosticSink;
use tether_platform::SignalRegistry;

/// Resolves every port of `component` and composes the instance.
///
/// Warnings (stale binding entries) go to `sink`; the first hard error is
/// returned and no instance is produced.
pub fn elaborate(
    component: &ComponentInterface,
    instance_name: &str,
    registry: &SignalRegistry,
    table: &BindingTable,
    stale_policy: StalePolicy,
    sink: &DiagnosticSink,
) -> Result<Instance, ElaborateError> {
    let bindings = Resolver::new(registry, table)
        .with_stale_policy(stale_policy)
        .resolve(component, instance_name, sink)?;
    compose(component, instance_name, bindings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_common::Direction;

    #[test]
    fn elaborate_against_analog_pocket() {
        let registry = SignalRegistry::register("analog_pocket").unwrap();
        let component = ComponentInterface::new(
            "apf_top",
            vec![
                ComponentPort::new("clk_74a", Direction::Input, 1),
                ComponentPort::new("cart_tran_bank2", Direction::InOut, 8),
                ComponentPort::new("cart_tran_bank2_dir", Direction::Output, 1),
                ComponentPort::new("bridge_endian_little", Direction::Output, 1),
            ],
        );
        let table = BindingTable::new()
            .with("clk_74a", BindingTarget::group("clk_74a"))
            .with("cart_tran_bank2", BindingTarget::field("cart", "tran_bank2"))
            .with("cart_tran_bank2_dir", BindingTarget::field("cart", "tran_bank2_dir"))
            .with("bridge_endian_little", BindingTarget::Internal);
        let sink = DiagnosticSink::new();
        let instance = elaborate(
            &component,
            "apf_top",
            &registry,
            &table,
            StalePolicy::Warn,
            &sink,
        )
        .unwrap();
        let pads: Vec<_> = instance.pads.iter().map(|l| l.net_name()).collect();
        assert_eq!(pads, vec!["clk_74a", "cart_tran_bank2", "cart_tran_bank2_dir"]);
        assert!(!sink.has_errors());

        let text = emit_verilog(&instance, "pong_top");
        assert!(text.contains("inout  wire [7:0] cart_tran_bank2,"));
        assert!(text.contains("wire apf_top_bridge_endian_little;"));
    }
}
