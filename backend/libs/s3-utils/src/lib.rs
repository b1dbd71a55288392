/// S3 access for CondoVoice uploads
///
/// Wraps the AWS SDK client together with the bucket settings so callers
/// only deal with object keys and public URLs.
use aws_sdk_s3::{primitives::ByteStream, Client};
use std::sync::Arc;
use thiserror::Error;

pub mod config;

pub use config::{avatar_key, S3Config};

#[derive(Debug, Error)]
pub enum S3Error {
    #[error("S3 request failed: {0}")]
    Request(String),
}

/// Shared S3 client wrapper
#[derive(Clone)]
pub struct S3Client {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Client {
    /// Build a client using the ambient AWS credential chain
    pub async fn with_config(config: S3Config) -> Self {
        let aws_config = aws_config::load_from_env().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&aws_config)
            .region(aws_sdk_s3::config::Region::new(config.region.clone()))
            .force_path_style(config.path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Arc::new(Client::from_conf(builder.build())),
            config,
        }
    }

    /// Upload an object, overwriting any existing one, and return its public URL
    pub async fn upload(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, S3Error> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| S3Error::Request(e.to_string()))?;

        tracing::debug!(bucket = %self.config.bucket, key = %key, "Uploaded object");
        Ok(self.config.public_url(key))
    }

    /// Health check for S3 connectivity
    pub async fn health_check(&self) -> Result<(), S3Error> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| S3Error::Request(e.to_string()))?;

        Ok(())
    }
}
