use super::process::run_to_completion;
use crate::domain::invocation::EncoderInvocation;
use crate::error::ToolError;
use crate::ports::encoder::EncoderPort;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command as TokioCommand;
use tokio_util::sync::CancellationToken;

/// Runs each rendition as its own ffmpeg process.
#[derive(Clone, Debug)]
pub struct FfmpegAdapter {
    program: PathBuf,
}

impl FfmpegAdapter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl EncoderPort for FfmpegAdapter {
    async fn encode(
        &self,
        invocation: &EncoderInvocation,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        let mut command = TokioCommand::new(&self.program);
        command.arg("-hide_banner").arg("-nostats").args(&invocation.args);

        run_to_completion("ffmpeg", command, cancel).await?;
        Ok(())
    }
}
