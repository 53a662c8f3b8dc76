//! Packager Binary
//!
//! Packages one source video into HLS renditions and a master playlist, then
//! optionally publishes the output directory.
//!
//! Environment Variables:
//! - FFMPEG_BIN / FFPROBE_BIN: tool overrides (default: looked up in PATH)
//! - S3_BUCKET: publish target, same as --bucket
//! - REGION, AWS_ACCESS_KEY_ID_S3, AWS_SECRET_ACCESS_KEY_S3: S3 credentials
//! - S3_ENDPOINT_URL: S3-compatible endpoint (e.g. MinIO)
//! - RUST_LOG: log filter

use abr_packager::adapters::aws::S3Adapter;
use abr_packager::adapters::local::FsAdapter;
use abr_packager::adapters::tools::{FfmpegAdapter, FfprobeAdapter};
use abr_packager::application::{preflight, uploader};
use abr_packager::cli::Cli;
use abr_packager::config::{PublishTarget, S3Config, ToolConfig};
use abr_packager::ports::storage::StoragePort;
use abr_packager::{JobContext, OrchestratorService, PackagerError};
use clap::Parser;
use std::process::ExitCode;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let stage = e
                .downcast_ref::<PackagerError>()
                .map(PackagerError::stage)
                .unwrap_or("setup");
            tracing::error!(stage, error = %e, "Packaging failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Setup errors surface before any encoding starts.
    preflight::ensure_input_exists(&cli.input).await?;
    let tools = preflight::check_required_tools(&ToolConfig::from_env())?;
    let settings = cli.job_settings().await?;
    preflight::prepare_output_dir(&settings.output_dir).await?;
    let publish_target = cli.publish_target();
    preflight::check_publish_target(&settings.output_dir, publish_target.as_ref()).await?;

    let ctx = JobContext::new();
    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping running encoders");
            cancel.cancel();
        }
    });

    let service = OrchestratorService::with_encoder(
        FfprobeAdapter::new(tools.ffprobe),
        FfmpegAdapter::new(tools.ffmpeg),
        cli.max_parallel(),
    );
    let packaged = service
        .process(&ctx, settings)
        .instrument(ctx.span.clone())
        .await?;
    println!(
        "Packaged {} renditions, master playlist at {}",
        packaged.results.len(),
        packaged.master_playlist.display()
    );

    if let Some(target) = publish_target {
        let storage: Box<dyn StoragePort> = match target {
            PublishTarget::S3 { bucket } => {
                Box::new(S3Adapter::from_config(&S3Config::from_env(), bucket).await)
            }
            PublishTarget::Directory(dir) => Box::new(FsAdapter::new(dir)),
        };
        let uploaded = uploader::upload_all(&ctx, &packaged.job.output_dir, storage.as_ref())
            .instrument(ctx.span.clone())
            .await?;
        tracing::info!(files = uploaded, "Upload completed");
    }

    println!("Processing and upload completed successfully.");
    Ok(())
}
