use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

/// Bucket used when `GCS_BUCKET_NAME` is not set.
pub const PLACEHOLDER_BUCKET: &str = "your-hunyuan3d-output-bucket";

const DEFAULT_GCS_BASE_URL: &str = "https://storage.googleapis.com";
const DEFAULT_METADATA_URL: &str = "http://metadata.google.internal";
const DEFAULT_GENERATOR_COMMAND: &str = "python3 demo.py";

#[derive(Debug, Clone)]
pub struct Generate3dConfig {
    pub common: core_config::Config,
    pub storage: StorageConfig,
    pub generator: GeneratorConfig,
    pub artifacts: ArtifactConfig,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub local_path: String,
    pub gcs: GcsConfig,
}

#[derive(Debug, Clone)]
pub struct GcsConfig {
    /// Base URL of the JSON upload API.
    pub api_base_url: String,
    /// Base URL public object links are built from.
    pub public_base_url: String,
    /// Static bearer token; the metadata server is used when absent.
    pub access_token: Option<Secret<String>>,
    pub metadata_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Gcs,
    Local,
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub backend: GeneratorBackend,
    /// Program followed by its leading arguments, whitespace separated.
    pub command: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorBackend {
    Command,
    Mock,
}

#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub dir: PathBuf,
    pub extension: String,
}

impl Generate3dConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env, APP__ prefix and PORT)
        let common_config = core_config::Config::load()?;

        let bucket = get_env("GCS_BUCKET_NAME", Some(PLACEHOLDER_BUCKET))?;
        if bucket == PLACEHOLDER_BUCKET {
            tracing::warn!(
                bucket = %bucket,
                "GCS_BUCKET_NAME is not set, falling back to the placeholder bucket"
            );
        }

        Ok(Generate3dConfig {
            common: common_config,
            storage: StorageConfig {
                backend: get_env("STORAGE_BACKEND", Some("gcs"))?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                bucket,
                local_path: get_env("STORAGE_LOCAL_PATH", Some("storage"))?,
                gcs: GcsConfig {
                    api_base_url: get_env("GCS_API_BASE_URL", Some(DEFAULT_GCS_BASE_URL))?,
                    public_base_url: get_env(
                        "GCS_PUBLIC_BASE_URL",
                        Some(DEFAULT_GCS_BASE_URL),
                    )?,
                    access_token: env::var("GCS_ACCESS_TOKEN")
                        .ok()
                        .filter(|t| !t.is_empty())
                        .map(Secret::new),
                    metadata_url: get_env("GCE_METADATA_URL", Some(DEFAULT_METADATA_URL))?,
                },
            },
            generator: GeneratorConfig {
                backend: get_env("GENERATOR_BACKEND", Some("command"))?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                command: get_env("GENERATOR_COMMAND", Some(DEFAULT_GENERATOR_COMMAND))?,
            },
            artifacts: ArtifactConfig {
                dir: env::var("ARTIFACT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| env::temp_dir()),
                extension: get_env("ARTIFACT_EXTENSION", Some("glb"))?,
            },
        })
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gcs" => Ok(StorageBackend::Gcs),
            "local" => Ok(StorageBackend::Local),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

impl std::str::FromStr for GeneratorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "command" => Ok(GeneratorBackend::Command),
            "mock" => Ok(GeneratorBackend::Mock),
            _ => Err(format!("Invalid generator backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}
