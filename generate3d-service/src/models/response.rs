use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "3D model generated and uploaded to GCS";

/// Result of one completed generation pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub public_url: String,
    pub prompt: String,
}

/// Success body of `POST /generate-3d`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub status: String,
    pub message: String,
    pub gcs_url: String,
    pub prompt: String,
}

impl From<GenerationOutcome> for GenerateResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        Self {
            status: "success".to_string(),
            message: SUCCESS_MESSAGE.to_string(),
            gcs_url: outcome.public_url,
            prompt: outcome.prompt,
        }
    }
}
