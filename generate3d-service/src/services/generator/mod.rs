//! Generator abstraction.
//!
//! The 3D model itself lives outside this service. A generator takes the
//! parameter bundle and leaves an artifact at `params.output_path`.

pub mod command;
pub mod mock;

pub use command::CommandGenerator;
pub use mock::MockGenerator;

use crate::models::GenerationParams;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for generator operations.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The generator ran and reported a failure.
    #[error("{0}")]
    Failed(String),

    #[error("Failed to start generator '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Generator not configured: {0}")]
    NotConfigured(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Trait for 3D model generators.
#[async_trait]
pub trait ModelGenerator: Send + Sync {
    /// Run one generation to completion and return the artifact path.
    ///
    /// May take arbitrarily long. The returned path is trusted as-is.
    async fn generate(&self, params: &GenerationParams) -> Result<PathBuf, GenerationError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), GenerationError>;
}
