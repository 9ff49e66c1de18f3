use thiserror::Error;

#[derive(Debug, Error)]
pub enum FutureYouError {
    #[error("not initialized: run 'future-you init'")]
    NotInitialized,

    #[error("not authenticated: sign in first")]
    NotAuthenticated,

    #[error("invalid time horizon '{0}': expected one of 6 months, 1 year, 5 years")]
    InvalidTimeHorizon(String),

    #[error("invalid emotional focus '{0}': expected one of Reassurance, Courage, Perspective, Calm, Strength")]
    InvalidEmotionalFocus(String),

    #[error("unsupported language code: {0}")]
    UnsupportedLanguage(String),

    #[error("future description must not be empty")]
    EmptyDescription,

    #[error("reflection must not be empty")]
    EmptyReflection,

    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FutureYouError>;
