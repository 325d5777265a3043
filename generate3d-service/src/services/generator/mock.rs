//! Mock generator for local development.
//!
//! Writes a minimal but valid binary glTF (GLB) scene with no geometry, so the
//! rest of the pipeline can run without a model or GPU.

use super::{GenerationError, ModelGenerator};
use crate::models::GenerationParams;
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_TYPE_JSON: u32 = 0x4E4F_534A; // "JSON"

#[derive(Debug, Default, Clone)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }
}

/// Encodes an empty scene as GLB, recording the parameters under `extras`.
pub fn empty_scene_glb(params: &GenerationParams) -> Vec<u8> {
    let document = json!({
        "asset": {
            "version": "2.0",
            "generator": concat!("generate3d-service mock ", env!("CARGO_PKG_VERSION")),
            "extras": {
                "prompt": params.prompt,
                "seed": params.seed,
                "resolution": params.resolution,
                "guidance_scale": params.guidance_scale,
                "num_inference_steps": params.num_inference_steps,
            }
        },
        "scene": 0,
        "scenes": [{ "nodes": [] }]
    });

    let mut chunk = document.to_string().into_bytes();
    // JSON chunks are space padded to a 4 byte boundary.
    while chunk.len() % 4 != 0 {
        chunk.push(b' ');
    }

    let total_len = 12 + 8 + chunk.len();
    let mut glb = Vec::with_capacity(total_len);
    glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&(total_len as u32).to_le_bytes());
    glb.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
    glb.extend_from_slice(&chunk);
    glb
}

#[async_trait]
impl ModelGenerator for MockGenerator {
    async fn generate(&self, params: &GenerationParams) -> Result<PathBuf, GenerationError> {
        tracing::warn!(
            output_path = %params.output_path.display(),
            "Mock generator in use, writing an empty scene"
        );

        if let Some(parent) = params.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&params.output_path, empty_scene_glb(params)).await?;

        Ok(params.output_path.clone())
    }

    async fn health_check(&self) -> Result<(), GenerationError> {
        Ok(())
    }
}
