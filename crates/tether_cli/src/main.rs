//! tether CLI: bind a hardware core to a platform and build it.
//!
//! Provides `tether run` to elaborate, build, and load a project,
//! `tether check` to validate the binding table without building, and
//! `tether platform` to inspect the signal groups a platform offers.

#![warn(missing_docs)]

mod check;
mod platform;
mod project;
mod report;
mod run;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// tether: platform integration for FPGA cores.
#[derive(Parser, Debug)]
#[command(name = "tether", version, about = "Bind FPGA cores to platform pins")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `tether.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Elaborate the project and optionally build and load it.
    Run(RunArgs),
    /// Resolve the binding table and report problems without building.
    Check(CheckArgs),
    /// List built-in platforms, or the signal groups of one platform.
    Platform {
        /// Platform id. Lists every built-in platform if omitted.
        id: Option<String>,
    },
}

/// Arguments for the `tether run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Synthesize the composed design.
    #[arg(long)]
    pub build: bool,

    /// Load the bitstream onto the device.
    #[arg(long)]
    pub load: bool,

    /// Output directory, overriding `build.output_dir`.
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Toolchain directive as `KEY=VALUE`; repeatable, later values win.
    #[arg(long = "directive", value_name = "KEY=VALUE")]
    pub directives: Vec<String>,

    /// Write project files but do not invoke the vendor toolchain.
    #[arg(long)]
    pub no_toolchain: bool,

    /// Output format for the build result.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `tether check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Output format: a binding table, or the composed instance as JSON.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a config file or project directory.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
        Command::Platform { ref id } => platform::run(id.as_deref(), &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over
/// the `--quiet`/`--verbose` defaults.
fn init_tracing(global: &GlobalArgs) {
    let level = if global.verbose {
        "debug"
    } else if global.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false)
                .with_ansi(global.color)
                .with_writer(std::io::stderr),
        )
        .init();
}
