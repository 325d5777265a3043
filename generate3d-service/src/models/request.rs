//! Inbound generation request and the parameter bundle handed to the generator.

use crate::error::GenerateError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = "a cute dog";
pub const DEFAULT_SEED: i64 = 42;
pub const DEFAULT_RESOLUTION: i64 = 256;
pub const DEFAULT_GUIDANCE_SCALE: f64 = 7.5;
pub const DEFAULT_NUM_INFERENCE_STEPS: i64 = 50;

/// Generation inputs after defaulting and numeric coercion.
///
/// Every field is optional on the wire. Ranges are not validated; the
/// generator is the authority on what it accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub seed: i64,
    pub resolution: i64,
    pub guidance_scale: f64,
    pub num_inference_steps: i64,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            seed: DEFAULT_SEED,
            resolution: DEFAULT_RESOLUTION,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
            num_inference_steps: DEFAULT_NUM_INFERENCE_STEPS,
        }
    }
}

impl GenerationRequest {
    /// Parses a raw request body.
    ///
    /// An empty body, invalid JSON or anything other than a JSON object is a
    /// `BadRequest`. Fields that are present but cannot be coerced to their
    /// numeric type are a `ValueConversion` failure.
    pub fn from_body(body: &[u8]) -> Result<Self, GenerateError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(GenerateError::BadRequest);
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Self::from_fields(&fields),
            _ => Err(GenerateError::BadRequest),
        }
    }

    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, GenerateError> {
        let defaults = Self::default();

        Ok(Self {
            prompt: match fields.get("prompt") {
                Some(value) => coerce_text("prompt", value, defaults.prompt)?,
                None => defaults.prompt,
            },
            seed: optional(fields, "seed", coerce_int)?.unwrap_or(defaults.seed),
            resolution: optional(fields, "resolution", coerce_int)?
                .unwrap_or(defaults.resolution),
            guidance_scale: optional(fields, "guidance_scale", coerce_float)?
                .unwrap_or(defaults.guidance_scale),
            num_inference_steps: optional(fields, "num_inference_steps", coerce_int)?
                .unwrap_or(defaults.num_inference_steps),
        })
    }
}

fn optional<T>(
    fields: &Map<String, Value>,
    field: &str,
    coerce: fn(&str, &Value) -> Result<T, GenerateError>,
) -> Result<Option<T>, GenerateError> {
    fields.get(field).map(|value| coerce(field, value)).transpose()
}

fn coerce_text(field: &str, value: &Value, default: String) -> Result<String, GenerateError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(default),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(conversion_error(field, "a string", other)),
    }
}

/// Integers accept JSON integers, floats (truncated toward zero), numeric
/// strings and booleans.
fn coerce_int(field: &str, value: &Value) -> Result<i64, GenerateError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64().filter(|f| n.is_f64() && f.is_finite()) {
                let truncated = f.trunc();
                if truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
                    Ok(truncated as i64)
                } else {
                    Err(conversion_error(field, "an integer", value))
                }
            } else {
                Err(conversion_error(field, "an integer", value))
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| conversion_error(field, "an integer", value)),
        Value::Bool(b) => Ok(i64::from(*b)),
        other => Err(conversion_error(field, "an integer", other)),
    }
}

fn coerce_float(field: &str, value: &Value) -> Result<f64, GenerateError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| conversion_error(field, "a number", value)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| conversion_error(field, "a number", value)),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(conversion_error(field, "a number", other)),
    }
}

fn conversion_error(field: &str, expected: &str, value: &Value) -> GenerateError {
    GenerateError::ValueConversion(format!("{} must be {}, got {}", field, expected, value))
}

/// The bundle passed to the generator: request fields plus the output path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub prompt: String,
    pub output_path: PathBuf,
    pub seed: i64,
    pub resolution: i64,
    pub guidance_scale: f64,
    pub num_inference_steps: i64,
}

impl GenerationParams {
    pub fn new(request: &GenerationRequest, output_path: impl Into<PathBuf>) -> Self {
        Self {
            prompt: request.prompt.clone(),
            output_path: output_path.into(),
            seed: request.seed,
            resolution: request.resolution,
            guidance_scale: request.guidance_scale,
            num_inference_steps: request.num_inference_steps,
        }
    }
}
