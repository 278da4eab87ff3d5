pub mod ollama;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use ollama::*;
pub use orchestrator::*;
pub use types::*;

use thiserror::Error;

/// Failure talking to the text-generation backend.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("AI service is not running at {0}")]
    Connection(String),

    #[error("AI service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("AI service returned an empty response")]
    EmptyResponse,

    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),
}

/// What the caller of a gateway operation sees.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidInput(String),

    /// Remote failure, empty reply or unparseable reply. `message` is
    /// safe to show to the user.
    #[error("{message}")]
    ServiceUnavailable {
        message: &'static str,
        #[source]
        cause: LlmError,
    },
}

impl GatewayError {
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}
