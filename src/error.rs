//! Error types for the packaging pipeline.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Boxed error returned by port implementations.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of one external tool invocation (ffprobe or ffmpeg).
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("{program} was cancelled")]
    Cancelled { program: String },
    #[error("worker task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Error)]
pub enum PackagerError {
    #[error("{tool} is not installed or not in PATH")]
    ToolNotFound { tool: String },

    #[error("input file {} does not exist", .0.display())]
    MissingInput(PathBuf),

    #[error("failed to prepare output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to get frame rate of {}: {source}", .path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: ToolError,
    },

    #[error("error processing rendition {rendition}: {source}")]
    Encode {
        rendition: String,
        #[source]
        source: ToolError,
    },

    #[error("failed to write master playlist {}: {source}", .path.display())]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error walking through {}: {source}", .root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("scan of {} did not complete: {source}", .root.display())]
    ScanAborted {
        root: PathBuf,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("failed to upload file {key}: {source}")]
    Publish {
        key: String,
        #[source]
        source: PortError,
    },
}

impl PackagerError {
    /// Short name of the pipeline stage that failed, used as a log field.
    pub fn stage(&self) -> &'static str {
        match self {
            PackagerError::ToolNotFound { .. }
            | PackagerError::MissingInput(_)
            | PackagerError::OutputDirectory { .. }
            | PackagerError::Config(_) => "setup",
            PackagerError::Probe { .. } => "probe",
            PackagerError::Encode { .. } => "encode",
            PackagerError::ManifestWrite { .. } => "manifest",
            PackagerError::Scan { .. }
            | PackagerError::ScanAborted { .. }
            | PackagerError::Publish { .. } => "publish",
        }
    }
}
