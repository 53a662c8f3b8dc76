use super::context::JobContext;
use super::worker::TranscodePool;
use crate::domain::hls::MasterPlaylist;
use crate::domain::jobs::{JobSettings, TranscodeJob, TranscodeResult, TranscodeRun};
use crate::domain::ladder::validate_ladder;
use crate::error::PackagerError;
use crate::ports::encoder::EncoderPort;
use crate::ports::probe::FrameRateProbe;
use std::path::PathBuf;
use std::sync::Arc;

/// A job whose renditions and master playlist are all on disk.
#[derive(Debug)]
pub struct PackagedJob {
    pub job: TranscodeJob,
    pub results: Vec<TranscodeResult>,
    pub master_playlist: PathBuf,
}

/// Probes the source, fans out the renditions, then writes the master playlist.
pub struct OrchestratorService<P, E> {
    probe: P,
    pool: TranscodePool<E>,
}

impl<P, E> OrchestratorService<P, E>
where
    P: FrameRateProbe,
    E: EncoderPort + 'static,
{
    pub fn new(probe: P, pool: TranscodePool<E>) -> Self {
        Self { probe, pool }
    }

    pub fn with_encoder(probe: P, encoder: E, max_parallel: usize) -> Self {
        Self::new(probe, TranscodePool::new(Arc::new(encoder), max_parallel))
    }

    /// Probe once, then encode every rendition. Only a probe failure (or an
    /// invalid ladder) is returned as `Err`; encode failures are recorded in
    /// the run's results.
    pub async fn run_all(
        &self,
        ctx: &JobContext,
        settings: JobSettings,
    ) -> Result<TranscodeRun, PackagerError> {
        validate_ladder(&settings.renditions)?;

        let frame_rate = self
            .probe
            .frame_rate(&settings.input_path, &ctx.cancel)
            .await
            .map_err(|source| PackagerError::Probe {
                path: settings.input_path.clone(),
                source,
            })?;

        let job = TranscodeJob::new(settings, frame_rate);
        tracing::info!(
            frame_rate = job.frame_rate,
            gop = job.gop_size,
            renditions = job.renditions.len(),
            max_parallel = self.pool.max_parallel(),
            "Processing video into segments"
        );

        let results = self.pool.run(ctx, &job).await;
        Ok(TranscodeRun { job, results })
    }

    /// Full packaging: all renditions, then the master playlist. The playlist
    /// is only written when every rendition succeeded.
    pub async fn process(
        &self,
        ctx: &JobContext,
        settings: JobSettings,
    ) -> Result<PackagedJob, PackagerError> {
        let run = self.run_all(ctx, settings).await?;

        let failed = run.failed_count();
        if failed > 0 {
            tracing::error!(
                failed,
                total = run.results.len(),
                "Renditions failed, skipping master playlist"
            );
        }
        let (job, results) = run.into_outcome()?;

        let master_playlist = write_master_manifest(&job, &results).await?;
        tracing::info!("Video processing completed successfully");

        Ok(PackagedJob {
            job,
            results,
            master_playlist,
        })
    }
}

/// Write `playlist.m3u8` into the job's output directory.
pub async fn write_master_manifest(
    job: &TranscodeJob,
    results: &[TranscodeResult],
) -> Result<PathBuf, PackagerError> {
    let path = job.master_playlist_path();
    tracing::info!(path = %path.display(), "Generating master playlist");

    MasterPlaylist::from_results(results)
        .write_to(&path)
        .await
        .map_err(|source| PackagerError::ManifestWrite {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}
