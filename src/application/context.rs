use tokio_util::sync::CancellationToken;
use tracing::Span;
use uuid::Uuid;

/// Per-job context handed explicitly to every pipeline stage.
#[derive(Clone, Debug)]
pub struct JobContext {
    pub job_id: Uuid,
    pub span: Span,
    pub cancel: CancellationToken,
}

impl JobContext {
    pub fn new() -> Self {
        let job_id = Uuid::new_v4();
        Self {
            job_id,
            span: tracing::info_span!("job", id = %job_id),
            cancel: CancellationToken::new(),
        }
    }
}

impl Default for JobContext {
    fn default() -> Self {
        Self::new()
    }
}
