//! Rendering diagnostics and build results.

use tether_build::BuildResult;
use tether_diagnostics::{Diagnostic, DiagnosticRenderer, JsonRenderer, TerminalRenderer};

use crate::{GlobalArgs, ReportFormat};

/// Prints diagnostics to stderr in text form.
pub fn render_diagnostics(diagnostics: &[Diagnostic], color: bool) {
    let renderer = TerminalRenderer::new(color);
    for diag in diagnostics {
        eprintln!("{}", renderer.render(diag));
    }
}

/// Reports a finished build: diagnostics and a summary line in text mode,
/// or the whole result as JSON on stdout.
pub fn report_result(result: &BuildResult, format: ReportFormat, global: &GlobalArgs) {
    match format {
        ReportFormat::Text => {
            render_diagnostics(&result.diagnostics, global.color);
            if !global.quiet {
                eprintln!("{}", summary(result));
            }
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                tracing::error!(error = %e, "cannot serialize build result");
                JsonRenderer.render_all(&result.diagnostics)
            });
            println!("{json}");
        }
    }
}

/// The one-line outcome of a build.
pub fn summary(result: &BuildResult) -> String {
    let warnings = result.warning_count();
    if result.succeeded {
        match &result.artifact_path {
            Some(path) => format!(
                "   Finished {} ({warnings} warning(s)): {}",
                result.stage,
                path.display()
            ),
            None => format!("   Finished {} ({warnings} warning(s))", result.stage),
        }
    } else {
        match result.first_error() {
            Some(error) => format!(
                "     Failed {}: {}[{}] {}",
                result.stage, error.severity, error.code, error.message
            ),
            None => format!("     Failed {}", result.stage),
        }
    }
}
