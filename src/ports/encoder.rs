use crate::domain::invocation::EncoderInvocation;
use crate::error::ToolError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait EncoderPort: Send + Sync {
    /// Run one encode to completion. Writes the rendition's segments and
    /// playlist into the job's output directory.
    async fn encode(
        &self,
        invocation: &EncoderInvocation,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError>;
}
