use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{GenerateError, GenerateOptions, GenerateRequest, Generator};

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Deserialize)]
struct OllamaModelsResponse {
    models: Vec<OllamaModel>,
}

/// Generous enough for a cold model load on modest hardware
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Every request fails with a transport error once `timeout` elapses
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
            warn!(error = %e, "could not build HTTP client, requests will not time out");
            Client::new()
        });
        Self::with_client(client, base_url)
    }

    /// Use a preconfigured HTTP client (timeouts, proxies)
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn query(&self, request: &GenerateRequest) -> Result<String, GenerateError> {
        let url = format!("{}/api/generate", self.base_url);

        let body = OllamaRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: request.options,
        };

        debug!(model = %request.model, prompt_len = request.prompt.len(), "generate request");

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(GenerateError::Status(response.status()));
        }

        let text = response.text().await?;
        let ollama_response: OllamaResponse =
            serde_json::from_str(&text).map_err(|e| GenerateError::Decode(e.to_string()))?;
        Ok(ollama_response.response)
    }

    pub async fn list_models(&self) -> Result<Vec<String>, GenerateError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GenerateError::Status(response.status()));
        }

        let text = response.text().await?;
        let models_response: OllamaModelsResponse =
            serde_json::from_str(&text).map_err(|e| GenerateError::Decode(e.to_string()))?;
        let model_names: Vec<String> = models_response
            .models
            .into_iter()
            .map(|model| model.name)
            .collect();

        Ok(model_names)
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateError> {
        self.query(request).await
    }
}
