//! `tether run`: elaborate, then optionally build and load.

use tether_build::{BuildOptions, BuildSession};
use tether_config::{parse_directive_override, BuildOverrides};

use crate::project::load_project;
use crate::report::report_result;
use crate::{GlobalArgs, RunArgs};

/// Runs the `tether run` command.
///
/// Returns exit code 0 if the build reached `ProgrammedOrDone`, 1 if any
/// stage failed.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (project_dir, config) = load_project(global)?;
    let options = build_options(args)?;

    if !global.quiet {
        let verb = match (options.build, options.load) {
            (_, true) => "Loading",
            (true, false) => "Building",
            (false, false) => "Elaborating",
        };
        eprintln!(
            "{verb:>12} {} v{} for {}",
            config.project.name, config.project.version, config.platform.id
        );
    }

    let session = BuildSession::new(&project_dir, config);
    let result = session.run(&options);
    report_result(&result, args.format, global);
    Ok(result.exit_code())
}

/// Folds the command-line flags into build options.
fn build_options(args: &RunArgs) -> Result<BuildOptions, Box<dyn std::error::Error>> {
    let directives = args
        .directives
        .iter()
        .map(|raw| parse_directive_override(raw))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(BuildOptions {
        build: args.build,
        load: args.load,
        overrides: BuildOverrides {
            directives,
            output_dir: args.output_dir.clone(),
            run_toolchain: args.no_toolchain.then_some(false),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cli, Command};
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        match Cli::parse_from(argv).command {
            Command::Run(args) => args,
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn flags_become_overrides() {
        let args = run_args(&[
            "tether",
            "run",
            "--build",
            "--directive",
            "SEED=3",
            "--no-toolchain",
            "--output-dir",
            "out",
        ]);
        let options = build_options(&args).unwrap();
        assert!(options.build);
        assert!(!options.load);
        assert_eq!(
            options.overrides.directives,
            vec![("SEED".to_string(), "3".to_string())]
        );
        assert_eq!(options.overrides.run_toolchain, Some(false));
        assert_eq!(options.overrides.output_dir.as_deref(), Some("out"));
    }

    #[test]
    fn toolchain_left_to_config_by_default() {
        let options = build_options(&run_args(&["tether", "run"])).unwrap();
        assert_eq!(options.overrides.run_toolchain, None);
    }

    #[test]
    fn malformed_directive_rejected() {
        let args = run_args(&["tether", "run", "--directive", "NOVALUE"]);
        assert!(build_options(&args).is_err());
    }
}
