//! Verilog-2001 emission of the composed top level.

use crate::binding::{Binding, BoundSignal};
use crate::compose::Instance;
use std::fmt::Write;

/// Renders `instance` as a Verilog top module named `top`.
///
/// The module's ports are the instance's pads. Internal signals become
/// `wire`s, and the component is instantiated with named connections. The
/// output depends only on its inputs.
pub fn emit_verilog(instance: &Instance, top: &str) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_module(&mut out, instance, top);
    out
}

fn write_module(out: &mut String, instance: &Instance, top: &str) -> std::fmt::Result {
    writeln!(
        out,
        "// Generated by tether from component `{}`. Do not edit.",
        instance.component
    )?;
    writeln!(out, "`default_nettype none")?;
    writeln!(out)?;

    if instance.pads.is_empty() {
        writeln!(out, "module {top};")?;
    } else {
        writeln!(out, "module {top} (")?;
        let decls: Vec<(String, String)> = instance
            .pads
            .iter()
            .map(|lane| {
                let head = format!(
                    "{:<6} wire {}",
                    lane.direction.verilog_keyword(),
                    range(lane.width)
                );
                (head.trim_end().to_string(), lane.net_name())
            })
            .collect();
        let head_width = decls.iter().map(|(h, _)| h.len()).max().unwrap_or(0);
        for (i, (head, name)) in decls.iter().enumerate() {
            let sep = if i + 1 == decls.len() { "" } else { "," };
            writeln!(out, "    {head:<head_width$} {name}{sep}")?;
        }
        writeln!(out, ");")?;
    }

    let internals: Vec<_> = instance.internal_signals().collect();
    if !internals.is_empty() {
        writeln!(out)?;
        for (name, width) in internals {
            let range = range(width);
            if range.is_empty() {
                writeln!(out, "    wire {name};")?;
            } else {
                writeln!(out, "    wire {range} {name};")?;
            }
        }
    }

    writeln!(out)?;
    if instance.bindings.is_empty() {
        writeln!(out, "    {} {} ();", instance.component, instance.instance_name)?;
    } else {
        writeln!(out, "    {} {} (", instance.component, instance.instance_name)?;
        let name_width = instance
            .bindings
            .iter()
            .map(|b| b.port.name.len())
            .max()
            .unwrap_or(0);
        for (i, binding) in instance.bindings.iter().enumerate() {
            let sep = if i + 1 == instance.bindings.len() { "" } else { "," };
            writeln!(
                out,
                "        .{:<name_width$} ({}){sep}",
                binding.port.name,
                connection(binding)
            )?;
        }
        writeln!(out, "    );")?;
    }

    writeln!(out)?;
    writeln!(out, "endmodule")?;
    writeln!(out)?;
    writeln!(out, "`default_nettype wire")
}

/// `[w-1:0]`, or nothing for a single bit.
fn range(width: u32) -> String {
    if width > 1 {
        format!("[{}:0]", width - 1)
    } else {
        String::new()
    }
}

/// The expression a port is connected to.
fn connection(binding: &Binding) -> String {
    let port_width = binding.port.width;
    match &binding.signal {
        BoundSignal::Lane(lane) if lane.width > port_width => {
            if port_width == 1 {
                format!("{}[0]", lane.net_name())
            } else {
                format!("{}[{}:0]", lane.net_name(), port_width - 1)
            }
        }
        BoundSignal::Lane(lane) => lane.net_name(),
        BoundSignal::Internal { name, .. } => name.clone(),
        BoundSignal::Constant { value, width } => format!("{width}'d{value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentPort;
    use tether_common::Direction;
    use tether_platform::{Lane, PhysicalConstraint};

    fn lane(group: &str, field: Option<&str>, direction: Direction, width: u32) -> Lane {
        Lane {
            group: group.to_string(),
            field: field.map(str::to_string),
            direction,
            width,
            constraint: PhysicalConstraint::unconstrained(),
        }
    }

    fn instance() -> Instance {
        let cart = lane("cart", Some("tran_bank2"), Direction::InOut, 8);
        let vid = lane("scal", Some("vid"), Direction::InOut, 12);
        let clk = lane("clk_74a", None, Direction::Input, 1);
        Instance {
            component: "apf_top".to_string(),
            instance_name: "apf_top".to_string(),
            bindings: vec![
                Binding {
                    port: ComponentPort::new("clk_74a", Direction::Input, 1),
                    signal: BoundSignal::Lane(clk.clone()),
                },
                Binding {
                    port: ComponentPort::new("cart_tran_bank2", Direction::InOut, 8),
                    signal: BoundSignal::Lane(cart.clone()),
                },
                Binding {
                    port: ComponentPort::new("vid", Direction::Output, 8),
                    signal: BoundSignal::Lane(vid.clone()),
                },
                Binding {
                    port: ComponentPort::new("mode", Direction::Input, 2),
                    signal: BoundSignal::Constant { value: 2, width: 2 },
                },
                Binding {
                    port: ComponentPort::new("scratch", Direction::Output, 4),
                    signal: BoundSignal::Internal {
                        name: "apf_top_scratch".to_string(),
                        width: 4,
                    },
                },
            ],
            pads: vec![clk, cart, vid],
        }
    }

    #[test]
    fn emits_top_module() {
        let expected = "\
// Generated by tether from component `apf_top`. Do not edit.
`default_nettype none

module pong_top (
    input  wire        clk_74a,
    inout  wire [7:0]  cart_tran_bank2,
    inout  wire [11:0] scal_vid
);

    wire [3:0] apf_top_scratch;

    apf_top apf_top (
        .clk_74a         (clk_74a),
        .cart_tran_bank2 (cart_tran_bank2),
        .vid             (scal_vid[7:0]),
        .mode            (2'd2),
        .scratch         (apf_top_scratch)
    );

endmodule

`default_nettype wire
";
        assert_eq!(emit_verilog(&instance(), "pong_top"), expected);
    }

    #[test]
    fn emission_is_deterministic() {
        let a = emit_verilog(&instance(), "top");
        let b = emit_verilog(&instance(), "top");
        assert_eq!(a, b);
    }

    #[test]
    fn single_bit_slice_of_wide_lane() {
        let binding = Binding {
            port: ComponentPort::new("bit", Direction::Input, 1),
            signal: BoundSignal::Lane(lane("bus", None, Direction::Input, 4)),
        };
        assert_eq!(connection(&binding), "bus[0]");
    }

    #[test]
    fn portless_instance() {
        let instance = Instance {
            component: "blinky".to_string(),
            instance_name: "u0".to_string(),
            bindings: Vec::new(),
            pads: Vec::new(),
        };
        let text = emit_verilog(&instance, "top");
        assert!(text.contains("module top;\n"));
        assert!(text.contains("    blinky u0 ();\n"));
    }
}
