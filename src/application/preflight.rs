//! Checks run before any encoding work starts.

use crate::config::{PublishTarget, ToolConfig};
use crate::error::PackagerError;
use std::path::{Path, PathBuf};

/// Absolute paths of the tools a job needs.
#[derive(Clone, Debug)]
pub struct ResolvedTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

pub fn check_required_tools(tools: &ToolConfig) -> Result<ResolvedTools, PackagerError> {
    Ok(ResolvedTools {
        ffmpeg: resolve("ffmpeg", &tools.ffmpeg)?,
        ffprobe: resolve("ffprobe", &tools.ffprobe)?,
    })
}

fn resolve(tool: &str, configured: &Path) -> Result<PathBuf, PackagerError> {
    which::which(configured).map_err(|e| {
        tracing::error!(
            tool,
            configured = %configured.display(),
            error = %e,
            "Required tool not found"
        );
        PackagerError::ToolNotFound {
            tool: tool.to_string(),
        }
    })
}

pub async fn ensure_input_exists(input: &Path) -> Result<(), PackagerError> {
    match tokio::fs::metadata(input).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(PackagerError::MissingInput(input.to_path_buf())),
    }
}

/// Clear `output_dir` and recreate it empty.
pub async fn prepare_output_dir(output_dir: &Path) -> Result<(), PackagerError> {
    let wrap = |source| PackagerError::OutputDirectory {
        path: output_dir.to_path_buf(),
        source,
    };

    match tokio::fs::remove_dir_all(output_dir).await {
        Ok(()) => tracing::debug!(path = %output_dir.display(), "Cleared output directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(wrap(e)),
    }
    tokio::fs::create_dir_all(output_dir).await.map_err(wrap)
}

/// A local publish directory must not be the output directory or lie inside
/// it: publishing would then overwrite the artifacts it is reading.
pub async fn check_publish_target(
    output_dir: &Path,
    target: Option<&PublishTarget>,
) -> Result<(), PackagerError> {
    let Some(PublishTarget::Directory(publish_dir)) = target else {
        return Ok(());
    };
    let output = resolve_path(output_dir).await;
    let publish = resolve_path(publish_dir).await;
    if publish.starts_with(&output) {
        return Err(PackagerError::Config(format!(
            "publish directory {} overlaps output directory {}",
            publish_dir.display(),
            output_dir.display()
        )));
    }
    Ok(())
}

/// Canonical form of `path`, resolving through its deepest existing ancestor
/// so paths that do not exist yet still compare correctly.
async fn resolve_path(path: &Path) -> PathBuf {
    let mut missing = Vec::new();
    let mut current = path.to_path_buf();
    loop {
        if let Ok(resolved) = tokio::fs::canonicalize(&current).await {
            return missing.iter().rev().fold(resolved, |acc, part| acc.join(part));
        }
        match (current.file_name(), current.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name.to_os_string());
                current = if parent.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    parent.to_path_buf()
                };
            }
            _ => return path.to_path_buf(),
        }
    }
}
