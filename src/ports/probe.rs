use crate::error::ToolError;
use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameRateProbe: Send + Sync {
    /// Whole frames per second of the first video stream.
    ///
    /// Unreadable prober output degrades to a default rate; only a failure to
    /// run the prober is an error.
    async fn frame_rate(&self, input: &Path, cancel: &CancellationToken) -> Result<u32, ToolError>;
}
