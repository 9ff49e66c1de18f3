use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generateContent returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse generateContent response: {0}")]
    Parse(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GeminiError>;
