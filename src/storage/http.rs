use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::storage::ObjectStore;
use crate::utils::error::AppError;

/// Bucket-backed object store speaking the hosted storage HTTP API: objects
/// are written to `{base}/object/{bucket}/{key}` with a bearer credential and
/// served publicly from `{base}/object/public/{bucket}/{key}`.
pub struct HttpObjectStore {
    http: Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

impl HttpObjectStore {
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalServerError(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        let response = self
            .http
            .post(format!("{}/object/{}/{key}", self.base_url, self.bucket))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("upload failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::StorageError(format!(
                "upload returned {}",
                response.status()
            )));
        }

        Ok(format!(
            "{}/object/public/{}/{key}",
            self.base_url, self.bucket
        ))
    }
}
