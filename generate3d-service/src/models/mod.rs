pub mod request;
pub mod response;

pub use request::{GenerationParams, GenerationRequest};
pub use response::{GenerateResponse, GenerationOutcome};
