use super::ladder::RenditionSpec;
use super::params::{self, DEFAULT_FRAME_RATE};
use crate::error::{PackagerError, ToolError};
use std::path::PathBuf;

/// Encoder knobs shared by every rendition of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    pub preset: String,
    pub crf: u8,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            preset: "slow".to_string(),
            crf: 12,
        }
    }
}

/// What the caller asks for, before the source has been probed.
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub renditions: Vec<RenditionSpec>,
    pub encoder: EncoderSettings,
    pub segment_seconds: u32,
}

/// One packaging run. Read-only once the frame rate is known.
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub frame_rate: u32,
    pub segment_seconds: u32,
    pub gop_size: u32,
    pub renditions: Vec<RenditionSpec>,
    pub encoder: EncoderSettings,
}

impl TranscodeJob {
    /// A probed rate of 0 (e.g. `0/1` or `1/2`) would give a zero GOP, so it
    /// is replaced with the default rate.
    pub fn new(settings: JobSettings, frame_rate: u32) -> Self {
        let frame_rate = if frame_rate == 0 {
            tracing::warn!(
                default = DEFAULT_FRAME_RATE,
                "Probed frame rate is 0, using default"
            );
            DEFAULT_FRAME_RATE
        } else {
            frame_rate
        };

        Self {
            input_path: settings.input_path,
            output_dir: settings.output_dir,
            frame_rate,
            segment_seconds: settings.segment_seconds,
            gop_size: params::gop_size(frame_rate, settings.segment_seconds),
            renditions: settings.renditions,
            encoder: settings.encoder,
        }
    }

    pub fn playlist_path(&self, rendition: &RenditionSpec) -> PathBuf {
        self.output_dir.join(rendition.playlist_file_name())
    }

    pub fn master_playlist_path(&self) -> PathBuf {
        self.output_dir.join(MASTER_PLAYLIST_NAME)
    }
}

pub const MASTER_PLAYLIST_NAME: &str = "playlist.m3u8";

/// Outcome of one rendition's encode.
#[derive(Debug)]
pub struct TranscodeResult {
    pub rendition: RenditionSpec,
    pub playlist_path: PathBuf,
    pub error: Option<ToolError>,
}

impl TranscodeResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Every rendition's result, in ladder order.
#[derive(Debug)]
pub struct TranscodeRun {
    pub job: TranscodeJob,
    pub results: Vec<TranscodeResult>,
}

impl TranscodeRun {
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }

    /// Fails with the first error in ladder order, regardless of which task
    /// finished first.
    pub fn into_outcome(self) -> Result<(TranscodeJob, Vec<TranscodeResult>), PackagerError> {
        let TranscodeRun { job, mut results } = self;
        if let Some(failed) = results.iter_mut().find(|r| r.error.is_some()) {
            if let Some(source) = failed.error.take() {
                return Err(PackagerError::Encode {
                    rendition: failed.rendition.name.clone(),
                    source,
                });
            }
        }
        Ok((job, results))
    }
}
