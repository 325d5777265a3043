#![allow(dead_code)]

use async_trait::async_trait;
use generate3d_service::config::{
    ArtifactConfig, GcsConfig, Generate3dConfig, GeneratorBackend, GeneratorConfig,
    StorageBackend, StorageConfig,
};
use generate3d_service::models::GenerationParams;
use generate3d_service::services::{GenerationError, ModelGenerator, Storage, StorageError};
use generate3d_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const TEST_BUCKET: &str = "test-bucket";
pub const ARTIFACT_BYTES: &[u8] = b"glTF-test-artifact";

/// Generator double: records every call and writes a fixed artifact, or
/// leaves a partial file behind and fails.
pub struct StubGenerator {
    calls: Mutex<Vec<GenerationParams>>,
    failure: Option<String>,
    delay: Option<Duration>,
    relocate: bool,
}

impl StubGenerator {
    fn build(failure: Option<String>, delay: Option<Duration>, relocate: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failure,
            delay,
            relocate,
        })
    }

    pub fn succeeding() -> Arc<Self> {
        Self::build(None, None, false)
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::build(Some(message.to_string()), None, false)
    }

    /// Succeeds after `delay`.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::build(None, Some(delay), false)
    }

    /// Writes next to the requested path and returns that other path.
    pub fn relocating() -> Arc<Self> {
        Self::build(None, None, true)
    }

    pub fn calls(&self) -> Vec<GenerationParams> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelGenerator for StubGenerator {
    async fn generate(&self, params: &GenerationParams) -> Result<PathBuf, GenerationError> {
        self.calls.lock().unwrap().push(params.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.failure {
            Some(message) => {
                tokio::fs::write(&params.output_path, b"partial").await?;
                Err(GenerationError::Failed(message.clone()))
            }
            None => {
                let output_path = if self.relocate {
                    relocated_path(&params.output_path)
                } else {
                    params.output_path.clone()
                };
                tokio::fs::write(&output_path, ARTIFACT_BYTES).await?;
                Ok(output_path)
            }
        }
    }

    async fn health_check(&self) -> Result<(), GenerationError> {
        Ok(())
    }
}

pub fn relocated_path(requested: &Path) -> PathBuf {
    let name = requested
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    requested.with_file_name(format!("relocated_{}", name))
}

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub key: String,
    pub local_path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Storage double: keeps uploaded bytes in memory.
pub struct StubStorage {
    uploads: Mutex<Vec<RecordedUpload>>,
    failure: Option<String>,
    healthy: bool,
    consume: bool,
}

impl StubStorage {
    fn build(failure: Option<String>, healthy: bool, consume: bool) -> Arc<Self> {
        Arc::new(Self {
            uploads: Mutex::new(Vec::new()),
            failure,
            healthy,
            consume,
        })
    }

    pub fn succeeding() -> Arc<Self> {
        Self::build(None, true, false)
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::build(Some(message.to_string()), true, false)
    }

    pub fn unhealthy() -> Arc<Self> {
        Self::build(None, false, false)
    }

    /// Succeeds, but deletes the local file while uploading it.
    pub fn consuming() -> Arc<Self> {
        Self::build(None, true, true)
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for StubStorage {
    async fn upload_file(&self, local_path: &Path, key: &str) -> Result<String, StorageError> {
        let bytes = tokio::fs::read(local_path).await?;
        self.uploads.lock().unwrap().push(RecordedUpload {
            key: key.to_string(),
            local_path: local_path.to_path_buf(),
            bytes,
        });

        if self.consume {
            tokio::fs::remove_file(local_path).await?;
        }

        match &self.failure {
            Some(message) => Err(StorageError::Io(std::io::Error::other(message.clone()))),
            None => Ok(format!(
                "https://storage.googleapis.com/{}/{}",
                TEST_BUCKET, key
            )),
        }
    }

    fn bucket(&self) -> &str {
        TEST_BUCKET
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        if self.healthy {
            Ok(())
        } else {
            Err(StorageError::NotConfigured("bucket unreachable".to_string()))
        }
    }
}

/// Configuration for tests: random port, private artifact directory.
pub fn test_config(artifact_dir: &Path) -> Generate3dConfig {
    Generate3dConfig {
        common: CoreConfig { port: 0 },
        storage: StorageConfig {
            backend: StorageBackend::Gcs,
            bucket: TEST_BUCKET.to_string(),
            local_path: artifact_dir.join("storage").display().to_string(),
            gcs: GcsConfig {
                api_base_url: "http://127.0.0.1:1".to_string(),
                public_base_url: "https://storage.googleapis.com".to_string(),
                access_token: None,
                metadata_url: "http://127.0.0.1:1".to_string(),
            },
        },
        generator: GeneratorConfig {
            backend: GeneratorBackend::Mock,
            command: String::new(),
        },
        artifacts: ArtifactConfig {
            dir: artifact_dir.to_path_buf(),
            extension: "glb".to_string(),
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub artifact_dir: PathBuf,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn(generator: Arc<StubGenerator>, storage: Arc<StubStorage>) -> Self {
        let artifact_dir = std::env::temp_dir().join(format!("generate3d-test-{}", Uuid::new_v4()));
        Self::spawn_with(test_config(&artifact_dir), generator, storage).await
    }

    pub async fn spawn_with(
        config: Generate3dConfig,
        generator: Arc<dyn ModelGenerator>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let artifact_dir = config.artifacts.dir.clone();

        let app = Application::build_with(config, generator, storage)
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
            artifact_dir,
            client: reqwest::Client::new(),
        }
    }

    pub async fn post_generate(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/generate-3d", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Files currently left in the artifact directory.
    pub fn leftover_artifacts(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.artifact_dir)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path())
                    .filter(|path| path.is_file())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.artifact_dir).await;
    }
}
