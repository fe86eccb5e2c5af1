// src/generation/ollama.rs
// Ollama-backed text generation

use super::{build_http_client, GenerationError, GenerationParams, TextGenerator, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "flan-t5";

pub struct OllamaProvider {
    url: String,
    model: String,
    client: reqwest::Client,
}

/// Ollama API options for generation parameters
#[derive(Debug, Serialize, Default, PartialEq)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    num_predict: i32,
}

impl From<&GenerationParams> for OllamaOptions {
    fn from(params: &GenerationParams) -> Self {
        let num_predict = i32::try_from(params.max_output_length).unwrap_or(i32::MAX);
        if params.deterministic {
            Self {
                temperature: Some(0.0),
                top_k: Some(1),
                seed: Some(0),
                num_predict,
            }
        } else {
            Self {
                num_predict,
                ..Self::default()
            }
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Result<Self, GenerationError> {
        Self::with_timeout(url, model, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            model,
            client: build_http_client(timeout)?,
        })
    }

    pub async fn health_check(&self) -> Result<(), GenerationError> {
        let health_url = format!("{}/api/tags", self.url);
        self.client.get(&health_url).send().await.map_err(|e| {
            GenerationError::ConnectionFailed(format!("Cannot reach Ollama at {}: {}", self.url, e))
        })?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TextGenerator for OllamaProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Generating with Ollama");

        let url = format!("{}/api/generate", self.url);
        let req = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions::from(params),
        };

        let response = self
            .client
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| GenerationError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationError::ServerError {
                status: status.as_u16(),
                body,
            });
        }

        let ollama_resp: OllamaResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        info!(model = %self.model, response_len = ollama_resp.response.len(), "Generation complete");
        Ok(ollama_resp.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
