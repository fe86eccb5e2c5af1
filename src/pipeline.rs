// src/pipeline.rs
// load -> chunk -> analyze -> save -> reload -> report -> table

use crate::analyzer::Analyzer;
use crate::config::AppConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::generation::TextGenerator;
use crate::report::{self, ResultTable};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Read the whole document as UTF-8 text
pub fn load_document(path: &Path) -> PipelineResult<String> {
    std::fs::read_to_string(path).map_err(|source| PipelineError::FileNotFoundOrUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Run the full pipeline over `config.input_path`, printing the report to stdout
pub async fn run(config: &AppConfig, generator: &dyn TextGenerator) -> PipelineResult<ResultTable> {
    let mut stdout = std::io::stdout();
    run_with_writer(config, generator, &mut stdout).await
}

/// Same as [`run`] with the text report sent to `out`
pub async fn run_with_writer<W: Write>(
    config: &AppConfig,
    generator: &dyn TextGenerator,
    out: &mut W,
) -> PipelineResult<ResultTable> {
    let input_path = config.input_path()?;
    config.chunker.validate()?;

    info!(path = %input_path.display(), "Loading and preprocessing document");
    let document = load_document(input_path)?;
    let chunks = config.chunker.split(&document)?;
    drop(document);
    info!(chunks = chunks.len(), "Document chunked");

    info!(model = %generator.model_name(), "Analyzing & detecting risks and generating recommendations");
    let analysis = Analyzer::new(generator).analyze(&chunks).await?;

    let output_path = &config.output_path;
    report::save_results(output_path, &analysis)?;
    info!(path = %output_path.display(), "Analysis complete. Results saved");

    let data = report::load_results(output_path)?;
    report::write_report(out, &data)?;

    Ok(ResultTable::from_results(data))
}
