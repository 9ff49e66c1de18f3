//! `gemini-client` — async client for the hosted `generateContent` API.
//!
//! One request, one response. The client does not retry, stream or cache;
//! callers decide what to do on failure.
//!
//! # Architecture
//!
//! ```text
//! GeminiClient::generate(model, instruction, user_text, options)
//!     │
//!     ▼
//! GenerateContentRequest   ← systemInstruction + one user turn + generationConfig
//!     │  POST {base}/v1beta/models/{model}:generateContent
//!     │  x-goog-api-key: …
//!     ▼
//! GenerateContentResponse  ← candidates[0].content.parts[*].text, concatenated
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use gemini_client::{GeminiClient, GenerateOptions};
//!
//! let client = GeminiClient::new(gemini_client::DEFAULT_BASE_URL, std::env::var("GEMINI_API_KEY").ok());
//! let text = client
//!     .generate("gemini-3-flash-preview", "Be brief.", "Say hello.", GenerateOptions::default())
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::{GeminiClient, GenerateOptions, DEFAULT_BASE_URL};
pub use error::{GeminiError, Result};
