// src/analyzer.rs
// Per-chunk risk / obligation / recommendation analysis

use crate::chunker::Chunk;
use crate::generation::{GenerationError, GenerationParams, TextGenerator};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

pub const RISKS_PROMPT: &str = "Carefully analyze the following text for **potential risks**. \
Provide a thorough and detailed explanation of these risks, \
highlighting any concerns that may not be immediately obvious:\n\n";

pub const OBLIGATIONS_PROMPT: &str = "Identify any **hidden obligations** or **dependencies** in the text. \
Be explicit about what these obligations may entail and explain their potential consequences:\n\n";

// Built from the chunk alone; the risk and obligation outputs are not fed in.
pub const RECOMMENDATIONS_PROMPT: &str = "Based on the **identified risks** and **hidden obligations** from the text, \
provide **specific and actionable recommendations** for addressing or mitigating these issues. \
Be practical, concise, and prioritize high-impact suggestions:\n\n";

/// One analysis record per chunk, serialized with these exact keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub context: String,
    pub risks_analysis: String,
    pub obligations_analysis: String,
    pub recommendations: String,
}

pub type ResultSet = Vec<AnalysisResult>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStage {
    Risks,
    Obligations,
    Recommendations,
}

impl PromptStage {
    pub const ALL: [PromptStage; 3] = [
        PromptStage::Risks,
        PromptStage::Obligations,
        PromptStage::Recommendations,
    ];

    pub fn template(&self) -> &'static str {
        match self {
            PromptStage::Risks => RISKS_PROMPT,
            PromptStage::Obligations => OBLIGATIONS_PROMPT,
            PromptStage::Recommendations => RECOMMENDATIONS_PROMPT,
        }
    }

    pub fn build_prompt(&self, chunk_text: &str) -> String {
        let template = self.template();
        let mut prompt = String::with_capacity(template.len() + chunk_text.len());
        prompt.push_str(template);
        prompt.push_str(chunk_text);
        prompt
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStage::Risks => "risks",
            PromptStage::Obligations => "obligations",
            PromptStage::Recommendations => "recommendations",
        }
    }
}

impl fmt::Display for PromptStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("generation failed for chunk {chunk_index} ({stage} prompt): {source}")]
    Generation {
        chunk_index: usize,
        stage: PromptStage,
        source: GenerationError,
    },
}

pub struct Analyzer<'a> {
    generator: &'a dyn TextGenerator,
    params: GenerationParams,
}

impl<'a> Analyzer<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self::with_params(generator, GenerationParams::default())
    }

    pub fn with_params(generator: &'a dyn TextGenerator, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    /// Analyze every chunk in order. The first generation failure aborts
    /// the run; nothing after it is attempted.
    pub async fn analyze(&self, chunks: &[Chunk]) -> Result<ResultSet, AnalysisError> {
        let mut results = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            info!(
                chunk_index = chunk.index,
                total = chunks.len(),
                model = %self.generator.model_name(),
                "Analyzing chunk"
            );
            results.push(self.analyze_chunk(chunk).await?);
        }

        Ok(results)
    }

    pub async fn analyze_chunk(&self, chunk: &Chunk) -> Result<AnalysisResult, AnalysisError> {
        let risks_analysis = self.run_stage(chunk, PromptStage::Risks).await?;
        let obligations_analysis = self.run_stage(chunk, PromptStage::Obligations).await?;
        let recommendations = self.run_stage(chunk, PromptStage::Recommendations).await?;

        Ok(AnalysisResult {
            context: chunk.text.clone(),
            risks_analysis,
            obligations_analysis,
            recommendations,
        })
    }

    async fn run_stage(&self, chunk: &Chunk, stage: PromptStage) -> Result<String, AnalysisError> {
        let prompt = stage.build_prompt(&chunk.text);
        let output = self
            .generator
            .generate(&prompt, &self.params)
            .await
            .map_err(|source| AnalysisError::Generation {
                chunk_index: chunk.index,
                stage,
                source,
            })?;

        debug!(
            chunk_index = chunk.index,
            stage = %stage,
            prompt_len = prompt.len(),
            output_len = output.len(),
            "Stage complete"
        );
        Ok(output)
    }
}

/// Analyze `chunks` with default generation parameters
pub async fn analyze(
    chunks: &[Chunk],
    generator: &dyn TextGenerator,
) -> Result<ResultSet, AnalysisError> {
    Analyzer::new(generator).analyze(chunks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Echoes the stage label and the chunk tail, recording every call
    struct RecordingGenerator {
        calls: Mutex<Vec<(String, GenerationParams)>>,
    }

    impl RecordingGenerator {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(
            &self,
            prompt: &str,
            params: &GenerationParams,
        ) -> Result<String, GenerationError> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), *params));
            let label = PromptStage::ALL
                .iter()
                .find(|s| prompt.starts_with(s.template()))
                .map(|s| s.as_str())
                .unwrap_or("unknown");
            Ok(format!("{}-output", label))
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    fn chunk(index: usize, text: &str) -> Chunk {
        Chunk {
            index,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_prompt_is_template_plus_chunk() {
        let prompt = PromptStage::Obligations.build_prompt("Clause 4.2");
        assert!(prompt.starts_with("Identify any **hidden obligations**"));
        assert!(prompt.ends_with(":\n\nClause 4.2"));
    }

    #[test]
    fn test_templates_are_distinct() {
        assert_ne!(RISKS_PROMPT, OBLIGATIONS_PROMPT);
        assert_ne!(OBLIGATIONS_PROMPT, RECOMMENDATIONS_PROMPT);
        assert!(RECOMMENDATIONS_PROMPT.contains("prioritize high-impact suggestions"));
    }

    #[tokio::test]
    async fn test_three_independent_prompts_per_chunk() {
        let generator = RecordingGenerator::new();
        let chunks = vec![chunk(0, "first chunk"), chunk(1, "second chunk")];

        let results = analyze(&chunks, &generator).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].context, "first chunk");
        assert_eq!(results[0].risks_analysis, "risks-output");
        assert_eq!(results[0].obligations_analysis, "obligations-output");
        assert_eq!(results[0].recommendations, "recommendations-output");

        let calls = generator.calls.lock().unwrap();
        assert_eq!(calls.len(), 6);
        for (i, (prompt, params)) in calls.iter().enumerate() {
            let expected_chunk = if i < 3 { "first chunk" } else { "second chunk" };
            assert!(prompt.ends_with(expected_chunk));
            assert!(!prompt.contains("-output"), "outputs must not feed later prompts");
            assert_eq!(params.max_output_length, 512);
            assert!(params.deterministic);
        }
        assert!(calls[2].0.starts_with(RECOMMENDATIONS_PROMPT));
    }

    #[tokio::test]
    async fn test_empty_chunks_yield_empty_results() {
        let generator = RecordingGenerator::new();
        let results = analyze(&[], &generator).await.unwrap();
        assert!(results.is_empty());
        assert!(generator.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_result_serializes_with_fixed_keys() {
        let result = AnalysisResult {
            context: "c".to_string(),
            risks_analysis: "r".to_string(),
            obligations_analysis: "o".to_string(),
            recommendations: "rec".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["context", "obligations_analysis", "recommendations", "risks_analysis"]
        );
    }
}
