use async_trait::async_trait;
use std::error::Error;
use tokio::io::AsyncRead;

/// Readable body of one artifact.
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// Store `body` under `key`. Keys always use forward slashes.
    async fn put(&self, key: &str, body: ByteStream) -> Result<(), Box<dyn Error + Send + Sync>>;
}
