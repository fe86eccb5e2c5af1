pub mod analyzer;
pub mod chunker;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod pipeline;
pub mod report;

pub use analyzer::{analyze, AnalysisError, AnalysisResult, Analyzer, PromptStage, ResultSet};
pub use chunker::{split, Chunk, ChunkError, ChunkerConfig};
pub use config::{AppConfig, ConfigError};
pub use error::{PipelineError, PipelineResult};
pub use generation::{create_provider, GenerationError, GenerationParams, ProviderConfig, TextGenerator};
pub use pipeline::{run, run_with_writer};
pub use report::{load_results, save_results, write_report, ReportError, ResultTable};
