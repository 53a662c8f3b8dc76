use super::process::run_to_completion;
use crate::domain::params::parse_frame_rate;
use crate::error::ToolError;
use crate::ports::probe::FrameRateProbe;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command as TokioCommand;
use tokio_util::sync::CancellationToken;

/// Reads `avg_frame_rate` of the first video stream with ffprobe.
#[derive(Clone, Debug)]
pub struct FfprobeAdapter {
    program: PathBuf,
}

impl FfprobeAdapter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, input: &Path) -> TokioCommand {
        let mut command = TokioCommand::new(&self.program);
        command
            .args(["-v", "0"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .args(["-select_streams", "v:0"])
            .args(["-show_entries", "stream=avg_frame_rate"])
            .arg(input);
        command
    }
}

#[async_trait]
impl FrameRateProbe for FfprobeAdapter {
    async fn frame_rate(&self, input: &Path, cancel: &CancellationToken) -> Result<u32, ToolError> {
        let output = run_to_completion("ffprobe", self.command(input), cancel).await?;
        let raw = String::from_utf8_lossy(&output.stdout);
        let line = raw.lines().next().unwrap_or_default();
        let frame_rate = parse_frame_rate(line);
        tracing::debug!(raw = line.trim(), frame_rate, "Parsed source frame rate");
        Ok(frame_rate)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Writes an executable script standing in for ffprobe.
    fn fake_tool(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-ffprobe");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_parses_prober_output() {
        let dir = tempfile::tempdir().unwrap();
        let probe = FfprobeAdapter::new(fake_tool(dir.path(), "echo 30000/1001"));
        let fps = probe
            .frame_rate(Path::new("input.mp4"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(fps, 29);
    }

    #[tokio::test]
    async fn test_garbage_output_degrades_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let probe = FfprobeAdapter::new(fake_tool(dir.path(), "echo N/A"));
        let fps = probe
            .frame_rate(Path::new("input.mp4"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(fps, 30);
    }

    #[tokio::test]
    async fn test_failing_prober_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let probe = FfprobeAdapter::new(fake_tool(dir.path(), "exit 1"));
        let result = probe
            .frame_rate(Path::new("input.mp4"), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ToolError::Exit { .. })));
    }
}
