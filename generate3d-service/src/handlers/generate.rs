use crate::error::GenerateError;
use crate::models::{GenerateResponse, GenerationOutcome, GenerationRequest};
use crate::services::metrics::record_generation;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// `POST /generate-3d`: generate a model from the JSON parameters and
/// publish it to object storage.
///
/// The pipeline runs on its own task, so a client that disconnects does not
/// cancel a generation halfway through; the run still uploads and cleans up.
pub async fn generate_3d_model(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, GenerateError> {
    match run(state, body).await {
        Ok(outcome) => {
            record_generation("success");
            Ok((StatusCode::OK, Json(GenerateResponse::from(outcome))))
        }
        Err(e) => {
            record_generation(e.kind());
            match &e {
                GenerateError::BadRequest | GenerateError::Body(_) => {
                    tracing::warn!(kind = e.kind(), "Rejected generation request: {}", e);
                }
                _ => {
                    tracing::error!(
                        kind = e.kind(),
                        error = ?e,
                        "Error during 3D generation: {}",
                        e
                    );
                }
            }
            Err(e)
        }
    }
}

async fn run(
    state: AppState,
    body: Result<Bytes, BytesRejection>,
) -> Result<GenerationOutcome, GenerateError> {
    let request = GenerationRequest::from_body(&body?)?;
    let pipeline = state.pipeline;
    tokio::spawn(async move { pipeline.run(request).await }).await?
}
