//! Generate service abstraction
//!
//! Every AI behaviour in the app (story continuation, word lists, color
//! interpretation) is one non-streaming `generate` call. The model identifier
//! on the request is the only thing that selects which behaviour runs.

pub mod ollama;

pub use ollama::OllamaClient;

use async_trait::async_trait;
use thiserror::Error;

/// Sampling options sent alongside story continuation requests
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 150,
        }
    }
}

/// A single prompt for a single model
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub options: Option<GenerateOptions>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = Some(options);
        self
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error! status: {}", .0.as_u16())]
    Status(reqwest::StatusCode),
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Anything that can answer a generate request.
///
/// `OllamaClient` is the real implementation; tests plug in scripted ones.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateError>;
}
