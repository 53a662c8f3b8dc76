//! Publishes a finished output tree through a storage port.

use super::context::JobContext;
use crate::error::PackagerError;
use crate::ports::storage::StoragePort;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactUploadEntry {
    /// Forward-slash path relative to the output directory, used as the key
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

/// Storage key for `relative`, with `/` separators on every platform.
pub fn upload_key(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every regular file under `output_dir`, sorted by path.
pub fn scan_artifacts(output_dir: &Path) -> Result<Vec<ArtifactUploadEntry>, PackagerError> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(output_dir).sort_by_file_name() {
        let entry = entry.map_err(|source| PackagerError::Scan {
            root: output_dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(output_dir) else {
            continue;
        };
        entries.push(ArtifactUploadEntry {
            relative_path: upload_key(relative),
            absolute_path: entry.path().to_path_buf(),
        });
    }
    Ok(entries)
}

/// Upload every artifact, stopping at the first failure.
///
/// Files published before a failure stay published. Returns the number of
/// files uploaded.
pub async fn upload_all<S>(
    ctx: &JobContext,
    output_dir: &Path,
    storage: &S,
) -> Result<usize, PackagerError>
where
    S: StoragePort + ?Sized,
{
    let root = output_dir.to_path_buf();
    let entries = tokio::task::spawn_blocking(move || scan_artifacts(&root))
        .await
        .map_err(|source| PackagerError::ScanAborted {
            root: output_dir.to_path_buf(),
            source,
        })??;

    tracing::info!(files = entries.len(), "Uploading artifacts");

    let mut uploaded = 0;
    for entry in entries {
        if ctx.cancel.is_cancelled() {
            return Err(PackagerError::Publish {
                key: entry.relative_path,
                source: "upload cancelled".into(),
            });
        }

        let file = tokio::fs::File::open(&entry.absolute_path)
            .await
            .map_err(|e| PackagerError::Publish {
                key: entry.relative_path.clone(),
                source: Box::new(e),
            })?;

        if let Err(source) = storage.put(&entry.relative_path, Box::new(file)).await {
            tracing::error!(key = %entry.relative_path, error = %source, "Failed to upload file");
            return Err(PackagerError::Publish {
                key: entry.relative_path,
                source,
            });
        }
        tracing::debug!(key = %entry.relative_path, "Uploaded");
        uploaded += 1;
    }
    Ok(uploaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::FsAdapter;
    use crate::ports::storage::{ByteStream, MockStoragePort};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::io::AsyncReadExt;

    async fn output_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir_all(dir.path().join("a")).await.unwrap();
        tokio::fs::write(dir.path().join("a").join("b.ts"), b"segment").await.unwrap();
        tokio::fs::write(dir.path().join("playlist.m3u8"), b"#EXTM3U\n").await.unwrap();
        dir
    }

    #[test]
    fn test_upload_key_uses_forward_slashes() {
        let relative: PathBuf = ["hls", "720p", "720p_000.ts"].iter().collect();
        assert_eq!(upload_key(&relative), "hls/720p/720p_000.ts");
        assert_eq!(upload_key(Path::new("playlist.m3u8")), "playlist.m3u8");
    }

    #[tokio::test]
    async fn test_scan_skips_directories() {
        let dir = output_tree().await;
        let entries = scan_artifacts(dir.path()).unwrap();
        let keys: Vec<&str> = entries.iter().map(|e| e.relative_path.as_str()).collect();
        assert_eq!(keys, vec!["a/b.ts", "playlist.m3u8"]);
        assert_eq!(entries[0].absolute_path, dir.path().join("a").join("b.ts"));
    }

    /// Storage double that keeps every object in memory.
    #[derive(Default)]
    struct RecordingStorage {
        objects: Mutex<Vec<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl StoragePort for RecordingStorage {
        async fn put(
            &self,
            key: &str,
            mut body: ByteStream,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let mut content = Vec::new();
            body.read_to_end(&mut content).await?;
            self.objects.lock().unwrap().push((key.to_string(), content));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_publishes_each_file_once() {
        let dir = output_tree().await;
        let storage = RecordingStorage::default();

        let uploaded = upload_all(&JobContext::new(), dir.path(), &storage).await.unwrap();

        assert_eq!(uploaded, 2);
        let objects = storage.objects.lock().unwrap();
        assert_eq!(
            *objects,
            vec![
                ("a/b.ts".to_string(), b"segment".to_vec()),
                ("playlist.m3u8".to_string(), b"#EXTM3U\n".to_vec()),
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_context_stops_upload() {
        let dir = output_tree().await;
        let storage = RecordingStorage::default();
        let ctx = JobContext::new();
        ctx.cancel.cancel();

        let err = upload_all(&ctx, dir.path(), &storage).await.unwrap_err();
        assert!(matches!(err, PackagerError::Publish { .. }));
        assert!(storage.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_scan() {
        let dir = output_tree().await;

        let mut storage = MockStoragePort::new();
        storage
            .expect_put()
            .withf(|k, _| k == "a/b.ts")
            .times(1)
            .returning(|_, _| Err("access denied".into()));
        storage
            .expect_put()
            .withf(|k, _| k == "playlist.m3u8")
            .times(0);

        let err = upload_all(&JobContext::new(), dir.path(), &storage)
            .await
            .unwrap_err();

        match err {
            PackagerError::Publish { key, source } => {
                assert_eq!(key, "a/b.ts");
                assert_eq!(source.to_string(), "access denied");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_output_dir_is_a_scan_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MockStoragePort::new();

        let err = upload_all(&JobContext::new(), &dir.path().join("absent"), &storage)
            .await
            .unwrap_err();
        assert!(matches!(err, PackagerError::Scan { .. }));
    }

    #[tokio::test]
    async fn test_publishing_into_the_output_dir_keeps_artifacts() {
        let dir = output_tree().await;
        let storage = FsAdapter::new(dir.path());

        let uploaded = upload_all(&JobContext::new(), dir.path(), &storage).await.unwrap();

        assert_eq!(uploaded, 2);
        let playlist = tokio::fs::read(dir.path().join("playlist.m3u8")).await.unwrap();
        assert_eq!(playlist, b"#EXTM3U\n");
        let segment = tokio::fs::read(dir.path().join("a").join("b.ts")).await.unwrap();
        assert_eq!(segment, b"segment");
    }
}
