//! `tether check`: resolve the binding table without building.

use tether_build::{BuildOptions, BuildSession};
use tether_elaborate::{Binding, BoundSignal, Instance};

use crate::project::load_project;
use crate::report::{render_diagnostics, summary};
use crate::{CheckArgs, GlobalArgs, ReportFormat};

/// Runs the `tether check` command.
///
/// Prints the resolved bindings (text) or the composed instance (JSON).
/// Returns exit code 0 if elaboration succeeded, 1 otherwise.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (project_dir, config) = load_project(global)?;

    if !global.quiet {
        eprintln!(
            "    Checking {} v{} for {}",
            config.project.name, config.project.version, config.platform.id
        );
    }

    let result = BuildSession::new(&project_dir, config).run(&BuildOptions::default());

    match args.format {
        ReportFormat::Text => {
            render_diagnostics(&result.diagnostics, global.color);
            if let Some(instance) = &result.instance {
                print!("{}", binding_table(instance));
            }
            if !global.quiet {
                eprintln!("{}", summary(&result));
            }
        }
        ReportFormat::Json => {
            let json = match &result.instance {
                Some(instance) => serde_json::to_string_pretty(instance)?,
                None => serde_json::to_string_pretty(&result.diagnostics)?,
            };
            println!("{json}");
        }
    }

    Ok(result.exit_code())
}

/// Formats one line per binding: port, direction, width, and connection.
fn binding_table(instance: &Instance) -> String {
    let name_width = instance
        .bindings
        .iter()
        .map(|b| b.port.name.len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for binding in &instance.bindings {
        out.push_str(&format!(
            "{:<name_width$}  {:<13}  {:>3}  {}\n",
            binding.port.name,
            binding.direction().to_string(),
            binding.port.width,
            connection(binding)
        ));
    }
    out
}

fn connection(binding: &Binding) -> String {
    match &binding.signal {
        BoundSignal::Lane(lane) => match &lane.field {
            Some(field) => format!("{}.{field}", lane.group),
            None => lane.group.clone(),
        },
        BoundSignal::Internal { name, .. } => format!("internal {name}"),
        BoundSignal::Constant { value, width } => format!("constant {width}'d{value}"),
    }
}
