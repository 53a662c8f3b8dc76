//! Configuration read from the environment (and an optional `.env` file).

use std::env;
use std::path::PathBuf;

/// Locations of the external tools. Bare names are resolved through `PATH`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl ToolConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            ffmpeg: lookup("FFMPEG_BIN").map(PathBuf::from).unwrap_or(defaults.ffmpeg),
            ffprobe: lookup("FFPROBE_BIN").map(PathBuf::from).unwrap_or(defaults.ffprobe),
        }
    }
}

/// Settings for the S3 publish target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct S3Config {
    /// AWS region, e.g. `us-east-1`
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Custom endpoint for S3-compatible stores such as MinIO
    pub endpoint_url: Option<String>,
}

impl S3Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            region: non_empty("REGION"),
            access_key_id: non_empty("AWS_ACCESS_KEY_ID_S3"),
            secret_access_key: non_empty("AWS_SECRET_ACCESS_KEY_S3"),
            endpoint_url: non_empty("S3_ENDPOINT_URL"),
        }
    }
}

/// Where finished artifacts are published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublishTarget {
    S3 { bucket: String },
    Directory(PathBuf),
}

impl PublishTarget {
    /// `file://<dir>` selects a local directory, anything else is a bucket name.
    pub fn parse(target: &str) -> Self {
        match target.strip_prefix("file://") {
            Some(dir) => PublishTarget::Directory(PathBuf::from(dir)),
            None => PublishTarget::S3 {
                bucket: target.to_string(),
            },
        }
    }
}
