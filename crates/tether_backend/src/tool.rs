//! Running external tools.

use crate::error::BackendError;
use std::path::Path;
use std::process::Command;

/// Number of output lines kept in [`BackendError::ToolFailed`].
const OUTPUT_TAIL_LINES: usize = 20;

/// Runs `program` with `args` in `cwd` and waits for it to finish.
///
/// Output is captured and logged at `debug`. A missing program is
/// [`BackendError::ToolNotFound`]; a nonzero exit is
/// [`BackendError::ToolFailed`] carrying the tail of the output.
pub fn run_tool(program: &str, args: &[String], cwd: &Path) -> Result<(), BackendError> {
    tracing::info!(tool = program, args = %args.join(" "), cwd = %cwd.display(), "running tool");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BackendError::ToolNotFound {
                tool: program.to_string(),
            },
            _ => BackendError::Io {
                path: cwd.to_path_buf(),
                source: e,
            },
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stdout.lines().chain(stderr.lines()) {
        tracing::debug!(tool = program, "{line}");
    }

    if output.status.success() {
        return Ok(());
    }

    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    Err(BackendError::ToolFailed {
        tool: program.to_string(),
        status: output.status.code(),
        output: lines[start..].join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = run_tool("tether-no-such-tool-1f3a", &[], tmp.path()).unwrap_err();
        assert!(
            matches!(err, BackendError::ToolNotFound { ref tool } if tool == "tether-no-such-tool-1f3a")
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_reports_output_tail() {
        let tmp = tempfile::TempDir::new().unwrap();
        let args = vec!["-c".to_string(), "echo first; echo last >&2; exit 4".to_string()];
        let err = run_tool("sh", &args, tmp.path()).unwrap_err();
        match err {
            BackendError::ToolFailed {
                tool,
                status,
                output,
            } => {
                assert_eq!(tool, "sh");
                assert_eq!(status, Some(4));
                assert_eq!(output, "first\nlast");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn successful_tool() {
        let tmp = tempfile::TempDir::new().unwrap();
        run_tool("true", &[], tmp.path()).unwrap();
    }
}
