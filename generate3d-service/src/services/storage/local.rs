use super::{Storage, StorageError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Stores artifacts in a local directory and links them with `file://` URLs.
pub struct LocalStorage {
    base_path: PathBuf,
    name: String,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        let base_path = fs::canonicalize(&base_path).await?;
        let name = base_path.display().to_string();
        Ok(Self { base_path, name })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_file(&self, local_path: &Path, key: &str) -> Result<String, StorageError> {
        let destination = self.base_path.join(key);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(local_path, &destination).await?;
        Ok(format!("file://{}", destination.display()))
    }

    fn bucket(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        let metadata = fs::metadata(&self.base_path).await?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(StorageError::NotConfigured(format!(
                "{} is not a directory",
                self.base_path.display()
            )))
        }
    }
}
