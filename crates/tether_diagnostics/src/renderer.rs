//! Diagnostic rendering backends for human-readable and machine-readable output.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// error[E302]: component port 'reset' has no binding
///   --> reset
///    = help: add an entry for 'reset' to [bindings]
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let label = format!("{}[{}]", diag.severity, diag.code);
        if !self.color {
            return label;
        }
        let ansi = match diag.severity {
            Severity::Error => "\x1b[1;31m",
            Severity::Warning => "\x1b[1;33m",
            Severity::Note => "\x1b[1;36m",
        };
        format!("{ansi}{label}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!("{}: {}\n", self.header(diag), diag.message);

        if let Some(subject) = &diag.subject {
            out.push_str(&format!("  --> {subject}\n"));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}

/// Renders diagnostics as JSON objects, one per diagnostic.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Renders a whole batch of diagnostics as a pretty-printed JSON array.
    pub fn render_all(&self, diags: &[Diagnostic]) -> String {
        serde_json::to_string_pretty(diags).unwrap_or_else(|_| "[]".to_string())
    }
}

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        serde_json::to_string(diag).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};

    #[test]
    fn render_error_with_subject() {
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 302),
            "component port 'reset' has no binding",
        )
        .with_subject("reset")
        .with_help("add an entry for 'reset' to [bindings]");

        let output = TerminalRenderer::new(false).render(&diag);

        assert!(output.starts_with("error[E302]: component port 'reset' has no binding"));
        assert!(output.contains("  --> reset"));
        assert!(output.contains("= help: add an entry for 'reset' to [bindings]"));
    }

    #[test]
    fn render_without_subject_has_no_arrow() {
        let diag = Diagnostic::warning(DiagnosticCode::new(Category::Warning, 301), "ignored");
        let output = TerminalRenderer::new(false).render(&diag);
        assert!(output.contains("warning[W301]: ignored"));
        assert!(!output.contains("-->"));
    }

    #[test]
    fn color_wraps_header() {
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Backend, 502), "tool failed");
        let output = TerminalRenderer::new(true).render(&diag);
        assert!(output.starts_with("\x1b[1;31merror[B502]\x1b[0m: tool failed"));
    }

    #[test]
    fn json_batch_is_an_array() {
        let diags = vec![
            Diagnostic::error(DiagnosticCode::new(Category::Error, 309), "missing root")
                .with_subject("fpga/core"),
        ];
        let json = JsonRenderer.render_all(&diags);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["subject"], "fpga/core");
        assert_eq!(value[0]["code"]["number"], 309);
    }
}
