// src/generation/huggingface.rs
// Hugging Face inference endpoint (text2text-generation task)

use super::{build_http_client, GenerationError, GenerationParams, TextGenerator};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_HF_API_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_HF_MODEL: &str = "google/flan-t5-base";

pub struct HuggingFaceProvider {
    url: String,
    model: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct HfParameters {
    max_new_tokens: usize,
    do_sample: bool,
}

#[derive(Serialize)]
struct HfRequest<'a> {
    inputs: &'a str,
    parameters: HfParameters,
}

#[derive(Deserialize)]
struct HfGeneration {
    generated_text: String,
}

impl HuggingFaceProvider {
    pub fn with_timeout(
        url: String,
        model: String,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            model,
            api_token,
            client: build_http_client(timeout)?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.url, self.model)
    }
}

#[async_trait::async_trait]
impl TextGenerator for HuggingFaceProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Generating with Hugging Face");

        let req = HfRequest {
            inputs: prompt,
            parameters: HfParameters {
                max_new_tokens: params.max_output_length,
                do_sample: !params.deterministic,
            },
        };

        let mut builder = self.client.post(self.endpoint()).json(&req);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
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

        let generations: Vec<HfGeneration> = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let text = generations
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| GenerationError::InvalidResponse("empty generation list".to_string()))?;

        info!(model = %self.model, response_len = text.len(), "Generation complete");
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::test_server::serve_once;
    use crate::generation::DEFAULT_TIMEOUT;

    fn provider_at(url: String, api_token: Option<&str>) -> HuggingFaceProvider {
        HuggingFaceProvider::with_timeout(
            url,
            DEFAULT_HF_MODEL.to_string(),
            api_token.map(str::to_string),
            DEFAULT_TIMEOUT,
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_includes_model_path() {
        let provider = HuggingFaceProvider::with_timeout(
            "http://localhost:8080/".to_string(),
            "google/flan-t5-base".to_string(),
            None,
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:8080/models/google/flan-t5-base"
        );
    }

    #[test]
    fn test_request_shape() {
        let req = HfRequest {
            inputs: "prompt",
            parameters: HfParameters {
                max_new_tokens: 512,
                do_sample: false,
            },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["inputs"], "prompt");
        assert_eq!(json["parameters"]["max_new_tokens"], 512);
        assert_eq!(json["parameters"]["do_sample"], false);
    }

    #[test]
    fn test_response_shape() {
        let body = r#"[{"generated_text": "Risk: unclear termination clause."}]"#;
        let parsed: Vec<HfGeneration> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed[0].generated_text, "Risk: unclear termination clause.");
    }

    #[tokio::test]
    async fn test_generate_returns_first_generation_untouched() {
        let body = r#"[{"generated_text":"  - item\n"},{"generated_text":"second"}]"#;
        let (url, server) = serve_once("200 OK", body).await;

        let text = provider_at(url, None)
            .generate("List the risks", &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(text, "  - item\n");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /models/google/flan-t5-base "));
        assert!(request.contains(r#""do_sample":false"#));
        assert!(!request.to_ascii_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_api_token_sent_as_bearer() {
        let (url, server) = serve_once("200 OK", r#"[{"generated_text":"ok"}]"#).await;

        provider_at(url, Some("hf_secret"))
            .generate("prompt", &GenerationParams::default())
            .await
            .unwrap();

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.contains("authorization: bearer hf_secret"));
    }

    #[tokio::test]
    async fn test_empty_generation_list_is_invalid_response() {
        let (url, server) = serve_once("200 OK", "[]").await;

        let err = provider_at(url, None)
            .generate("prompt", &GenerationParams::default())
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_model_loading_status_is_server_error() {
        let body = r#"{"error":"Model google/flan-t5-base is currently loading"}"#;
        let (url, server) = serve_once("503 Service Unavailable", body).await;

        let err = provider_at(url, None)
            .generate("prompt", &GenerationParams::default())
            .await
            .unwrap_err();
        server.await.unwrap();

        match err {
            GenerationError::ServerError { status, body } => {
                assert_eq!(status, 503);
                assert!(body.contains("currently loading"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
