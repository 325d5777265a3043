//! Object storage for generated artifacts.

pub mod gcs;
pub mod local;

pub use gcs::{GcsCredentials, GcsStorage};
pub use local::LocalStorage;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to obtain storage credentials: {0}")]
    Auth(String),

    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upload of {key} to bucket {bucket} was rejected with status {status}: {message}")]
    Rejected {
        bucket: String,
        key: String,
        status: u16,
        message: String,
    },

    #[error("Storage not configured: {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Uploads a local file under `key` and returns the object's public URL.
    async fn upload_file(&self, local_path: &Path, key: &str) -> Result<String, StorageError>;

    /// Bucket (or directory) artifacts land in.
    fn bucket(&self) -> &str;

    async fn health_check(&self) -> Result<(), StorageError>;
}

pub fn detect_content_type(key: &str) -> &'static str {
    match Path::new(key).extension().and_then(|ext| ext.to_str()) {
        Some("glb") => "model/gltf-binary",
        Some("gltf") => "model/gltf+json",
        Some("obj") => "model/obj",
        Some("stl") => "model/stl",
        Some("ply") => "application/ply",
        _ => "application/octet-stream",
    }
}
