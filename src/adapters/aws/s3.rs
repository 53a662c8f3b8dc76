use crate::config::S3Config;
use crate::ports::storage::{ByteStream, StoragePort};
use async_trait::async_trait;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::Client;
use std::error::Error;
use tokio::io::AsyncReadExt;

/// S3Adapter implements StoragePort for AWS S3 and S3-compatible stores.
#[derive(Clone)]
pub struct S3Adapter {
    client: Client,
    bucket: String,
}

impl S3Adapter {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Build a client from `config`, falling back to the default AWS provider
    /// chain when no static credentials are set.
    pub async fn from_config(config: &S3Config, bucket: String) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "packager-env",
            ));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        tracing::info!(bucket = %bucket, "S3 client initialized");
        Self::new(Client::from_conf(builder.build()), bucket)
    }
}

#[async_trait]
impl StoragePort for S3Adapter {
    async fn put(
        &self,
        key: &str,
        mut body: ByteStream,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut buffer = Vec::new();
        body.read_to_end(&mut buffer).await?;
        let byte_stream = aws_sdk_s3::primitives::ByteStream::from(buffer);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(byte_stream)
            .send()
            .await?;
        Ok(())
    }
}
