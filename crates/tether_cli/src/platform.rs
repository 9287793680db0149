//! `tether platform`: inspect platforms and their signal groups.

use tether_platform::{load_registry, platforms, GroupLayout, SignalGroup, SignalRegistry};

use crate::project::load_project;
use crate::GlobalArgs;

/// Runs the `tether platform` command.
///
/// Without an id, lists the built-in platforms. With one, prints its signal
/// groups; platforms defined by the current project (if any) are visible too.
pub fn run(id: Option<&str>, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let Some(id) = id else {
        for id in platforms() {
            println!("{id}");
        }
        return Ok(0);
    };

    // Outside a project only the built-ins are available.
    let user_platforms = match load_project(global) {
        Ok((_, config)) => config.platforms,
        Err(e) => {
            tracing::debug!(error = %e, "no project configuration; using built-in platforms");
            Default::default()
        }
    };
    let registry = load_registry(id, &user_platforms)?;
    print!("{}", describe(&registry));
    Ok(0)
}

/// Formats a platform header followed by one line per signal or field.
fn describe(registry: &SignalRegistry) -> String {
    let info = registry.info();
    let mut out = format!(
        "{} ({} {}, {} groups)\n",
        info.id,
        info.family,
        info.device,
        registry.len()
    );
    for group in registry.groups() {
        out.push_str(&describe_group(group));
    }
    out
}

fn describe_group(group: &SignalGroup) -> String {
    match &group.layout {
        GroupLayout::Scalar {
            direction, width, ..
        } => format!("  {:<24} {:<13} {:>3}\n", group.name, direction.to_string(), width),
        GroupLayout::Composite(fields) => {
            let mut out = format!("  {}\n", group.name);
            for field in fields {
                out.push_str(&format!(
                    "    .{:<21} {:<13} {:>3}\n",
                    field.name,
                    field.direction.to_string(),
                    field.width
                ));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_analog_pocket() {
        let registry = SignalRegistry::register("analog_pocket").unwrap();
        let text = describe(&registry);
        assert!(text.starts_with("analog_pocket (cyclone_v 5CEBA4F23C8, 20 groups)\n"));
        assert!(text.contains("  cart\n"));
        assert!(text.contains("    .tran_bank2            bidirectional   8\n"));
        assert!(text.contains("  clk_74a                  input           1\n"));
    }
}
