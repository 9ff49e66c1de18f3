//! Contract for the hosted text-generation boundary.
//!
//! The workflow controller only sees [`TextCompletion`]; the server wires a
//! concrete HTTP client behind it and tests substitute in-memory fakes.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// An instruction/style template plus user text sent to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction carrying persona, tone and language requirements.
    pub instruction: String,
    /// The user-turn text.
    pub user_text: String,
    /// `None` uses the provider default.
    pub temperature: Option<f32>,
    /// Returned in place of an empty provider answer.
    pub empty_default: String,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion provider failed: {0}")]
    Provider(String),

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Run one completion. Successful results are never empty.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Guard for providers that answer without text.
pub fn non_empty_or(text: Option<String>, default: &str) -> String {
    match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => default.to_string(),
    }
}

/// Run `request` against `client`, failing with [`CompletionError::Timeout`]
/// when the call does not settle within `limit`.
pub async fn complete_within(
    client: &dyn TextCompletion,
    request: &CompletionRequest,
    limit: Duration,
) -> Result<String, CompletionError> {
    match tokio::time::timeout(limit, client.complete(request)).await {
        Ok(result) => result,
        Err(_) => Err(CompletionError::Timeout(limit)),
    }
}
