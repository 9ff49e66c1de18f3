use async_trait::async_trait;
use future_you_core::completion::{non_empty_or, CompletionError, CompletionRequest, TextCompletion};
use future_you_core::config::GenerationConfig;
use gemini_client::{GeminiClient, GenerateOptions};

/// [`TextCompletion`] over the hosted `generateContent` API.
pub struct GeminiCompletion {
    client: GeminiClient,
    model: String,
}

impl GeminiCompletion {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        let api_key = config.api_key();
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "no API key set, letters and prompts will use fallback text"
            );
        }
        Self::new(GeminiClient::new(&config.api_base, api_key), &config.model)
    }
}

#[async_trait]
impl TextCompletion for GeminiCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let text = self
            .client
            .generate(
                &self.model,
                &request.instruction,
                &request.user_text,
                GenerateOptions {
                    temperature: request.temperature,
                },
            )
            .await
            .map_err(|e| CompletionError::Provider(e.to_string()))?;
        Ok(non_empty_or(text, &request.empty_default))
    }
}
