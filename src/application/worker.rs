//! Bounded fan-out of one encoder run per rendition.

use super::context::JobContext;
use crate::domain::invocation::EncoderInvocation;
use crate::domain::jobs::{TranscodeJob, TranscodeResult};
use crate::error::ToolError;
use crate::ports::encoder::EncoderPort;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tracing::Instrument;

/// Runs every rendition of a job with at most `max_parallel` encoders alive.
///
/// A failing rendition never cancels the others: every rendition runs to
/// completion and reports its own outcome.
pub struct TranscodePool<E> {
    encoder: Arc<E>,
    max_parallel: usize,
}

impl<E> TranscodePool<E>
where
    E: EncoderPort + 'static,
{
    pub fn new(encoder: Arc<E>, max_parallel: usize) -> Self {
        Self {
            encoder,
            max_parallel: max_parallel.max(1),
        }
    }

    /// One slot per available processing unit.
    pub fn with_available_parallelism(encoder: Arc<E>) -> Self {
        Self::new(encoder, num_cpus::get())
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Results come back in ladder order, whatever order the tasks finish in.
    pub async fn run(&self, ctx: &JobContext, job: &TranscodeJob) -> Vec<TranscodeResult> {
        let total = job.renditions.len();
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        // Each worker sends exactly once, so sends never wait.
        let (tx, mut rx) = mpsc::channel::<(usize, Result<(), ToolError>)>(total.max(1));

        let mut handles = Vec::with_capacity(total);
        for (index, rendition) in job.renditions.iter().enumerate() {
            let invocation = EncoderInvocation::for_rendition(job, rendition);
            let encoder = self.encoder.clone();
            let semaphore = semaphore.clone();
            let cancel = ctx.cancel.clone();
            let tx = tx.clone();
            let span = tracing::info_span!(parent: &ctx.span, "rendition", name = %rendition.name);

            let task = async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(permit) => {
                        tracing::info!(
                            maxrate_kbps = invocation.params.maxrate_kbps,
                            bufsize_kbps = invocation.params.bufsize_kbps,
                            gop = invocation.params.gop_size,
                            "Encoding rendition"
                        );
                        let started = Instant::now();
                        let outcome = encoder.encode(&invocation, &cancel).await;
                        drop(permit);

                        match &outcome {
                            Ok(()) => tracing::info!(
                                elapsed_ms = started.elapsed().as_millis() as u64,
                                playlist = %invocation.playlist_path.display(),
                                "Rendition finished"
                            ),
                            Err(e) => tracing::error!(error = %e, "Error processing rendition"),
                        }
                        outcome
                    }
                    Err(closed) => Err(ToolError::Aborted(closed.to_string())),
                };
                let _ = tx.send((index, outcome)).await;
            };
            handles.push(tokio::spawn(task.instrument(span)));
        }
        drop(tx);

        // Join barrier: every task has finished (or panicked) past this point.
        let joined = join_all(handles).await;

        let mut outcomes: Vec<Option<Result<(), ToolError>>> = (0..total).map(|_| None).collect();
        while let Some((index, outcome)) = rx.recv().await {
            outcomes[index] = Some(outcome);
        }
        for (index, join_result) in joined.into_iter().enumerate() {
            if let Err(e) = join_result {
                tracing::error!(
                    rendition = %job.renditions[index].name,
                    error = %e,
                    "Worker task died"
                );
                outcomes[index].get_or_insert(Err(ToolError::Aborted(e.to_string())));
            }
        }

        job.renditions
            .iter()
            .zip(outcomes)
            .map(|(rendition, outcome)| TranscodeResult {
                rendition: rendition.clone(),
                playlist_path: job.playlist_path(rendition),
                error: match outcome {
                    Some(Ok(())) => None,
                    Some(Err(e)) => Some(e),
                    None => Some(ToolError::Aborted("no outcome reported".to_string())),
                },
            })
            .collect()
    }
}
