//! Application startup and lifecycle management.

use crate::config::{
    ArtifactConfig, Generate3dConfig, GeneratorBackend, GeneratorConfig, StorageBackend,
    StorageConfig,
};
use crate::handlers;
use crate::services::{
    CommandGenerator, GcsStorage, GenerationPipeline, LocalStorage, MockGenerator,
    ModelGenerator, Storage,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: GenerationPipeline,
}

impl AppState {
    pub fn new(
        artifacts: &ArtifactConfig,
        generator: Arc<dyn ModelGenerator>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            pipeline: GenerationPipeline::new(generator, storage, artifacts),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/generate-3d", post(handlers::generate_3d_model))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

pub fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn ModelGenerator>, AppError> {
    match config.backend {
        GeneratorBackend::Command => {
            let generator = CommandGenerator::from_command_line(&config.command)
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
            tracing::info!(command = %config.command, "Initialized command generator");
            Ok(Arc::new(generator))
        }
        GeneratorBackend::Mock => {
            tracing::info!("Initialized mock generator");
            Ok(Arc::new(MockGenerator::new()))
        }
    }
}

pub async fn build_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>, AppError> {
    match config.backend {
        StorageBackend::Gcs => {
            tracing::info!(
                bucket = %config.bucket,
                api = %config.gcs.api_base_url,
                static_token = config.gcs.access_token.is_some(),
                "Initialized GCS storage"
            );
            Ok(Arc::new(GcsStorage::from_config(&config.bucket, &config.gcs)))
        }
        StorageBackend::Local => {
            let storage = LocalStorage::new(&config.local_path).await.map_err(|e| {
                tracing::error!(
                    "Failed to initialize local storage at {}: {}",
                    config.local_path,
                    e
                );
                AppError::ConfigError(anyhow::anyhow!(e))
            })?;
            tracing::info!(path = %config.local_path, "Initialized local storage");
            Ok(Arc::new(storage))
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with collaborators chosen by configuration.
    pub async fn build(config: Generate3dConfig) -> Result<Self, AppError> {
        let generator = build_generator(&config.generator)?;
        let storage = build_storage(&config.storage).await?;
        Self::build_with(config, generator, storage).await
    }

    /// Build the application around the given generator and storage.
    pub async fn build_with(
        config: Generate3dConfig,
        generator: Arc<dyn ModelGenerator>,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(&config.artifacts.dir)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create artifact directory {}: {}",
                    config.artifacts.dir.display(),
                    e
                );
                AppError::from(e)
            })?;

        // Port 0 picks a random port (tests)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let router = build_router(AppState::new(&config.artifacts, generator, storage));

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_with_graceful_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
