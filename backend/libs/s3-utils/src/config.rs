/// Object storage settings for uploaded avatars
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Public base URL that uploaded objects are served from
    pub base_url: String,
    /// Custom endpoint (MinIO, localstack); implies path-style addressing
    pub endpoint: Option<String>,
    /// Whether to use path-style URLs (false = virtual-hosted-style)
    pub path_style: bool,
}

impl S3Config {
    /// Load from the environment. Returns `None` when `S3_BUCKET` is unset,
    /// which disables uploads for the process.
    pub fn from_env() -> Option<Self> {
        let bucket = std::env::var("S3_BUCKET").ok().filter(|b| !b.is_empty())?;
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let endpoint = std::env::var("S3_ENDPOINT").ok().filter(|e| !e.is_empty());
        let path_style = endpoint.is_some()
            || std::env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false);
        let base_url = std::env::var("S3_BASE_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| match &endpoint {
                Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
                None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
            });

        Some(Self {
            bucket,
            region,
            base_url,
            endpoint,
            path_style,
        })
    }

    /// Public URL for an object
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// Storage key for a resident's avatar. Re-uploads overwrite the same object.
pub fn avatar_key(resident_id: &str) -> String {
    format!("avatars/{}", resident_id)
}
