// src/error.rs
// Top-level error for a pipeline run

use crate::analyzer::AnalysisError;
use crate::chunker::ChunkError;
use crate::config::ConfigError;
use crate::generation::GenerationError;
use crate::report::ReportError;
use std::path::PathBuf;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot read input document {}: {}", .path.display(), .source)]
    FileNotFoundOrUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    InvalidChunkParameters(#[from] ChunkError),

    #[error(transparent)]
    Generation(#[from] AnalysisError),

    #[error("generation provider unavailable: {0}")]
    ProviderUnavailable(#[from] GenerationError),

    #[error("failed to persist results: {0}")]
    OutputWriteFailure(#[from] ReportError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
