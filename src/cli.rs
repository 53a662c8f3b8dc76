use crate::config::PublishTarget;
use crate::domain::jobs::{EncoderSettings, JobSettings};
use crate::domain::ladder::{default_ladder, load_ladder};
use crate::error::PackagerError;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "packager")]
#[command(version, about = "Package a video into HLS renditions and optionally upload them")]
pub struct Cli {
    /// Source video file
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output directory, cleared before packaging
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Publish target: an S3 bucket name, or file://<dir> for a local copy
    #[arg(short, long, env = "S3_BUCKET")]
    pub bucket: Option<String>,

    /// JSON rendition ladder (defaults to 1080p + 720p)
    #[arg(long)]
    pub ladder: Option<PathBuf>,

    /// x264 preset
    #[arg(long, default_value = "slow")]
    pub preset: String,

    /// x264 constant rate factor
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: u8,

    /// Segment duration in seconds
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
    pub segment_seconds: u32,

    /// Maximum simultaneous encoder processes (defaults to the CPU count)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn publish_target(&self) -> Option<PublishTarget> {
        self.bucket
            .as_deref()
            .filter(|target| !target.is_empty())
            .map(PublishTarget::parse)
    }

    pub fn max_parallel(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get).max(1)
    }

    pub async fn job_settings(&self) -> Result<JobSettings, PackagerError> {
        let renditions = match &self.ladder {
            Some(path) => load_ladder(path).await?,
            None => default_ladder(),
        };

        Ok(JobSettings {
            input_path: self.input.clone(),
            output_dir: self.output.clone(),
            renditions,
            encoder: EncoderSettings {
                preset: self.preset.clone(),
                crf: self.crf,
            },
            segment_seconds: self.segment_seconds,
        })
    }
}
