use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The endpoint answered with a non-success status. Absorbed by the
    /// loop controller; never fatal to monitoring.
    #[error("reasoner unavailable: HTTP {status}: {body}")]
    Unavailable { status: u16, body: String },

    /// The endpoint answered, but the payload could not be interpreted.
    /// Treated identically to `Unavailable` by callers.
    #[error("malformed response from provider: {0}")]
    MalformedResponse(String),

    #[error("invalid prompt template: {0}")]
    Template(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;
