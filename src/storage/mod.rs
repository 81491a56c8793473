//! Photo object storage.
//!
//! Uploads go to an S3-compatible bucket under a per-entity prefix such
//! as `proyectos/{id}/activos`; the resulting public URL is what gets
//! stored as the asset's `AV_URL`.

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use uuid::Uuid;

use crate::config::StorageConfig;

pub struct ObjectStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url_base: Option<String>,
}

impl ObjectStorage {
    /// Build the storage handle from config. Returns `None` when no
    /// bucket is configured; upload endpoints answer 500 in that case.
    pub async fn from_config(config: &StorageConfig) -> Option<Self> {
        let bucket = config.bucket.clone()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        Some(Self {
            client: aws_sdk_s3::Client::new(&sdk_config),
            bucket,
            public_url_base: config.public_url_base.clone(),
        })
    }

    /// Unique object key: directory prefix, a v4 UUID, and the original
    /// file name with anything outside `[A-Za-z0-9.-]` replaced by `_`.
    pub fn object_key(directory: &str, file_name: &str) -> String {
        let sanitized: String = file_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        format!(
            "{}/{}_{}",
            directory.trim_matches('/'),
            Uuid::new_v4(),
            sanitized
        )
    }

    /// Public download URL for an object key.
    pub fn public_url(&self, key: &str) -> String {
        match &self.public_url_base {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, key),
        }
    }

    /// Upload a file and return its public URL.
    pub async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| format!("Failed to upload object {}", key))?;

        Ok(self.public_url(key))
    }
}
