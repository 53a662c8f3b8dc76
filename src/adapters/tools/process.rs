//! Cancellation-aware subprocess execution shared by the tool adapters.

use crate::error::ToolError;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Lines of stderr kept in an exit error.
const STDERR_TAIL_LINES: usize = 20;

/// Run `command` to completion, capturing its output.
///
/// If `cancel` fires first the child is killed and `ToolError::Cancelled` is
/// returned. There is no timeout: a hung tool blocks until cancelled.
pub async fn run_to_completion(
    program: &str,
    mut command: Command,
    cancel: &CancellationToken,
) -> Result<Output, ToolError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command.spawn().map_err(|source| ToolError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let output = tokio::select! {
        output = child.wait_with_output() => output.map_err(|source| ToolError::Spawn {
            program: program.to_string(),
            source,
        })?,
        _ = cancel.cancelled() => {
            tracing::warn!(program, "Cancelling running tool");
            return Err(ToolError::Cancelled {
                program: program.to_string(),
            });
        }
    };

    if !output.status.success() {
        return Err(ToolError::Exit {
            program: program.to_string(),
            status: output.status,
            stderr: stderr_tail(&output.stderr),
        });
    }

    Ok(output)
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
