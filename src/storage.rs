use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client};
use tracing::debug;

use crate::config::StorageConfig;

/// Failure modes of an upload. `Rejected` carries the remote response body.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to upload image: {0}")]
    Rejected(String),
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Stores `body` under `filename` and returns its public URL.
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, UploadError>;
}

/// Storage-v1 style HTTP object store (e.g. Supabase Storage).
#[derive(Clone)]
pub struct ObjectStorage {
    client: Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

impl ObjectStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/storage/v1/object/upload/{}", self.base_url, self.bucket)
    }

    /// The URL is derived from the filename alone, so a repeated filename
    /// aliases the earlier object.
    pub fn public_url(&self, filename: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, filename
        )
    }
}

#[async_trait]
impl StorageClient for ObjectStorage {
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, UploadError> {
        let part = multipart::Part::stream(body)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .context("invalid content type")?;
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .client
            .post(self.upload_url())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("storage upload request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UploadError::Rejected(body));
        }

        debug!(%status, filename, "object uploaded");
        Ok(self.public_url(filename))
    }
}
