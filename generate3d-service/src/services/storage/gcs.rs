//! Google Cloud Storage backend.
//!
//! Uploads use the JSON API "media" upload, streamed from disk:
//! `POST {api}/upload/storage/v1/b/{bucket}/o?uploadType=media&name={key}`.
//! Objects are linked as `{public_base}/{bucket}/{key}`.

use super::{detect_content_type, Storage, StorageError};
use crate::config::GcsConfig;
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::Path;
use tokio_util::io::ReaderStream;

const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Where the bearer token for uploads comes from.
#[derive(Debug, Clone)]
pub enum GcsCredentials {
    /// A token supplied through configuration.
    Static(Secret<String>),
    /// The instance metadata server (Cloud Run, GCE, GKE).
    MetadataServer { base_url: String },
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

pub struct GcsStorage {
    client: Client,
    bucket: String,
    api_base_url: String,
    public_base_url: String,
    credentials: GcsCredentials,
}

impl GcsStorage {
    pub fn new(
        bucket: impl Into<String>,
        api_base_url: impl Into<String>,
        public_base_url: impl Into<String>,
        credentials: GcsCredentials,
    ) -> Self {
        Self {
            client: Client::new(),
            bucket: bucket.into(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn from_config(bucket: &str, config: &GcsConfig) -> Self {
        let credentials = match &config.access_token {
            Some(token) => GcsCredentials::Static(token.clone()),
            None => GcsCredentials::MetadataServer {
                base_url: config.metadata_url.trim_end_matches('/').to_string(),
            },
        };
        Self::new(
            bucket,
            &config.api_base_url,
            &config.public_base_url,
            credentials,
        )
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket, key)
    }

    async fn access_token(&self) -> Result<Secret<String>, StorageError> {
        match &self.credentials {
            GcsCredentials::Static(token) => Ok(token.clone()),
            GcsCredentials::MetadataServer { base_url } => {
                let response = self
                    .client
                    .get(format!("{}{}", base_url, METADATA_TOKEN_PATH))
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .map_err(|e| StorageError::Auth(e.to_string()))?;

                if !response.status().is_success() {
                    return Err(StorageError::Auth(format!(
                        "metadata server returned status {}",
                        response.status()
                    )));
                }

                let token: MetadataToken = response
                    .json()
                    .await
                    .map_err(|e| StorageError::Auth(e.to_string()))?;
                Ok(Secret::new(token.access_token))
            }
        }
    }
}

#[async_trait]
impl Storage for GcsStorage {
    async fn upload_file(&self, local_path: &Path, key: &str) -> Result<String, StorageError> {
        let token = self.access_token().await?;

        let file = tokio::fs::File::open(local_path).await?;
        let size = file.metadata().await?.len();

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size = size,
            "Uploading artifact to GCS"
        );

        let response = self
            .client
            .post(format!(
                "{}/upload/storage/v1/b/{}/o",
                self.api_base_url, self.bucket
            ))
            .query(&[("uploadType", "media"), ("name", key)])
            .bearer_auth(token.expose_secret())
            .header(CONTENT_TYPE, detect_content_type(key))
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        Ok(self.public_url(key))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        if self.bucket.is_empty() {
            return Err(StorageError::NotConfigured(
                "GCS bucket name is empty".to_string(),
            ));
        }
        Ok(())
    }
}
