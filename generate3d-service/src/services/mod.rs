pub mod artifact;
pub mod generator;
pub mod metrics;
pub mod pipeline;
pub mod storage;

pub use artifact::TempArtifact;
pub use generator::{CommandGenerator, GenerationError, MockGenerator, ModelGenerator};
pub use self::metrics::{get_metrics, init_metrics};
pub use pipeline::GenerationPipeline;
pub use storage::{GcsStorage, LocalStorage, Storage, StorageError};
