// src/generation/mod.rs
// Text generation abstraction - pluggable providers behind one trait
// Default: flan-t5 via Ollama

pub mod huggingface;
pub mod ollama;

pub use huggingface::HuggingFaceProvider;
pub use ollama::OllamaProvider;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Output cap used for every analysis prompt
pub const DEFAULT_MAX_OUTPUT_LENGTH: usize = 512;

/// Client timeout for a single generation call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Decoding settings for one generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Upper bound on generated tokens
    pub max_output_length: usize,
    /// Greedy decoding, no sampling
    pub deterministic: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_length: DEFAULT_MAX_OUTPUT_LENGTH,
            deterministic: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation backend unreachable: {0}")]
    ConnectionFailed(String),

    #[error("generation backend returned status {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("invalid generation response: {0}")]
    InvalidResponse(String),

    #[error("generation provider config error: {0}")]
    ConfigError(String),
}

/// Text-to-text capability consumed by the analyzer.
///
/// Implementations must be deterministic for identical prompts when
/// `params.deterministic` is set.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError>;

    fn model_name(&self) -> &str;
}

/// Which backend serves generation requests
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum ProviderConfig {
    /// Local model served by Ollama
    Ollama { url: String, model: String },
    /// Hugging Face inference endpoint (hosted or text-generation-inference)
    HuggingFace {
        url: String,
        model: String,
        api_token: Option<String>,
    },
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::Ollama {
            url: ollama::DEFAULT_OLLAMA_URL.to_string(),
            model: ollama::DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GenerationError::ConfigError(format!("failed to build HTTP client: {}", e)))
}

/// Construct the configured provider. Ollama is health-checked up front so a
/// missing server fails before any chunk is analyzed.
pub async fn create_provider(
    config: &ProviderConfig,
    timeout: Duration,
) -> Result<Box<dyn TextGenerator>, GenerationError> {
    match config {
        ProviderConfig::Ollama { url, model } => {
            info!(url = %url, model = %model, "Initializing Ollama provider");
            let provider = OllamaProvider::with_timeout(url.clone(), model.clone(), timeout)?;
            provider.health_check().await.map_err(|e| {
                warn!("Failed to connect to Ollama. Make sure it's running: ollama serve");
                e
            })?;
            Ok(Box::new(provider))
        }
        ProviderConfig::HuggingFace {
            url,
            model,
            api_token,
        } => {
            info!(url = %url, model = %model, "Initializing Hugging Face provider");
            let provider = HuggingFaceProvider::with_timeout(
                url.clone(),
                model.clone(),
                api_token.clone(),
                timeout,
            )?;
            Ok(Box::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert_eq!(params.max_output_length, 512);
        assert!(params.deterministic);
    }

    #[test]
    fn test_default_provider_config() {
        match ProviderConfig::default() {
            ProviderConfig::Ollama { url, model } => {
                assert_eq!(url, "http://localhost:11434");
                assert_eq!(model, ollama::DEFAULT_OLLAMA_MODEL);
            }
            other => panic!("Default should be Ollama, got {:?}", other),
        }
    }

    #[test]
    fn test_error_display() {
        let err = GenerationError::ServerError {
            status: 503,
            body: "model loading".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("model loading"));
    }

    #[tokio::test]
    async fn test_huggingface_provider_needs_no_server_to_build() {
        let config = ProviderConfig::HuggingFace {
            url: "http://127.0.0.1:9".to_string(),
            model: "google/flan-t5-base".to_string(),
            api_token: None,
        };
        let provider = create_provider(&config, DEFAULT_TIMEOUT).await.unwrap();
        assert_eq!(provider.model_name(), "google/flan-t5-base");
    }

    #[tokio::test]
    async fn test_unreachable_ollama_fails_health_check() {
        let config = ProviderConfig::Ollama {
            url: test_server::closed_port_url().await,
            model: "flan-t5".to_string(),
        };

        let err = match create_provider(&config, Duration::from_secs(5)).await {
            Ok(_) => panic!("provider should not build without a server"),
            Err(e) => e,
        };
        assert!(matches!(err, GenerationError::ConnectionFailed(_)));

        let err: crate::PipelineError = err.into();
        assert!(matches!(err, crate::PipelineError::ProviderUnavailable(_)));
    }
}
