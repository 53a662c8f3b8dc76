use crate::ports::storage::{ByteStream, StoragePort};
use async_trait::async_trait;
use std::error::Error;
use std::path::{Component, Path, PathBuf};

/// Publishes artifacts into a directory on the local filesystem.
#[derive(Clone, Debug)]
pub struct FsAdapter {
    root: PathBuf,
}

impl FsAdapter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn destination(&self, key: &str) -> Result<PathBuf, Box<dyn Error + Send + Sync>> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(format!("invalid key {:?}", key).into());
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StoragePort for FsAdapter {
    /// The body is staged next to the destination and renamed over it, so an
    /// existing file is never truncated while it may still be the one being read.
    async fn put(
        &self,
        key: &str,
        mut body: ByteStream,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let destination = self.destination(key)?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = staging_path(&destination);
        let mut file = tokio::fs::File::create(&staging).await?;
        let copied = tokio::io::copy(&mut body, &mut file).await;
        drop(file);
        if let Err(e) = copied {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        tokio::fs::rename(&staging, &destination).await?;
        Ok(())
    }
}

fn staging_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    destination.with_file_name(format!(".{}.part", name))
}
