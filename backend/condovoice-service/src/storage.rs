/// Avatar image storage
///
/// Uploads go to S3 under `avatars/<resident id>`, overwriting the previous
/// image. The returned URL carries a version parameter so clients drop any
/// cached copy.
use crate::error::Result;
use chrono::Utc;
use s3_utils::{avatar_key, S3Client};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait AvatarStorage: Send + Sync {
    /// Store the image and return the URL clients should load it from
    async fn store_avatar(&self, resident_id: Uuid, body: Vec<u8>, content_type: &str)
        -> Result<String>;

    async fn health_check(&self) -> Result<()>;
}

fn versioned(url: String) -> String {
    format!("{}?v={}", url, Utc::now().timestamp_millis())
}

pub struct S3AvatarStorage {
    client: S3Client,
}

impl S3AvatarStorage {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl AvatarStorage for S3AvatarStorage {
    async fn store_avatar(
        &self,
        resident_id: Uuid,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let key = avatar_key(&resident_id.to_string());
        let url = self.client.upload(&key, body, content_type).await?;
        Ok(versioned(url))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(self.client.health_check().await?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Keeps uploads in memory; used when exercising the upload flow without S3
pub struct MemoryAvatarStorage {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryAvatarStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }
}

#[async_trait::async_trait]
impl AvatarStorage for MemoryAvatarStorage {
    async fn store_avatar(
        &self,
        resident_id: Uuid,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let key = avatar_key(&resident_id.to_string());
        self.objects.write().await.insert(
            key.clone(),
            StoredObject {
                content_type: content_type.to_string(),
                body,
            },
        );
        Ok(versioned(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            key
        )))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
