//! The generate → upload → clean up pipeline behind `POST /generate-3d`.

use crate::config::ArtifactConfig;
use crate::error::GenerateError;
use crate::models::{GenerationOutcome, GenerationParams, GenerationRequest};
use crate::services::artifact::TempArtifact;
use crate::services::generator::ModelGenerator;
use crate::services::metrics::record_stage_duration;
use crate::services::storage::Storage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct GenerationPipeline {
    generator: Arc<dyn ModelGenerator>,
    storage: Arc<dyn Storage>,
    artifact_dir: PathBuf,
    artifact_extension: String,
}

impl GenerationPipeline {
    pub fn new(
        generator: Arc<dyn ModelGenerator>,
        storage: Arc<dyn Storage>,
        artifacts: &ArtifactConfig,
    ) -> Self {
        Self {
            generator,
            storage,
            artifact_dir: artifacts.dir.clone(),
            artifact_extension: artifacts.extension.clone(),
        }
    }

    pub fn generator(&self) -> &Arc<dyn ModelGenerator> {
        &self.generator
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Runs one request to completion.
    ///
    /// The temporary artifact is deleted on every exit path; a failure to
    /// delete it after a successful upload is reported as a filesystem error.
    pub async fn run(&self, request: GenerationRequest) -> Result<GenerationOutcome, GenerateError> {
        let mut artifact = TempArtifact::allocate(&self.artifact_dir, &self.artifact_extension);
        let params = GenerationParams::new(&request, artifact.path());

        tracing::info!(
            prompt = %params.prompt,
            seed = params.seed,
            resolution = params.resolution,
            guidance_scale = params.guidance_scale,
            num_inference_steps = params.num_inference_steps,
            "Starting 3D generation"
        );
        tracing::info!(
            output_path = %params.output_path.display(),
            "Output will be saved to temporary path"
        );

        let started = Instant::now();
        let produced = self.generator.generate(&params).await?;
        record_stage_duration("generation", started.elapsed());

        if produced != artifact.path() {
            tracing::warn!(
                expected = %artifact.path().display(),
                produced = %produced.display(),
                "Generator wrote to a different path"
            );
            artifact.retarget(produced);
        }

        tracing::info!(
            path = %artifact.path().display(),
            bucket = %self.storage.bucket(),
            "3D generation completed, uploading artifact"
        );

        let started = Instant::now();
        let public_url = self
            .storage
            .upload_file(artifact.path(), artifact.file_name())
            .await?;
        record_stage_duration("upload", started.elapsed());

        artifact.remove().await?;

        tracing::info!(gcs_url = %public_url, "File uploaded");

        Ok(GenerationOutcome {
            public_url,
            prompt: request.prompt,
        })
    }
}
