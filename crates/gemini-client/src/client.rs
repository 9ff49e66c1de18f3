use crate::error::{GeminiError, Result};
use crate::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Per-call generation knobs. `None` leaves the provider default in place.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// Send one `generateContent` call.
    ///
    /// `Ok(None)` means the provider answered successfully but without text
    /// (e.g. a blocked candidate).
    pub async fn generate(
        &self,
        model: &str,
        instruction: &str,
        user_text: &str,
        options: GenerateOptions,
    ) -> Result<Option<String>> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;

        let body = GenerateContentRequest {
            system_instruction: Some(Content::system(instruction)),
            contents: vec![Content::user(user_text)],
            generation_config: options.temperature.map(|t| GenerationConfig {
                temperature: Some(t),
            }),
        };

        debug!(model, temperature = ?options.temperature, "generateContent request");
        let resp = self
            .http
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let raw = resp.text().await?;
        if !status.is_success() {
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body: raw,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&raw).map_err(GeminiError::Parse)?;
        let text = parsed.text();
        debug!(model, chars = text.as_ref().map_or(0, |t| t.len()), "generateContent response");
        Ok(text)
    }
}
