// riskdoc/src/main.rs
use clap::Parser;
use riskdoc::config::AppConfig;
use riskdoc::error::PipelineError;
use riskdoc::generation::create_provider;
use riskdoc::logging::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

/// Chunk a plain-text document and analyze each chunk for risks,
/// hidden obligations and recommendations.
#[derive(Parser, Debug)]
#[command(name = "riskdoc", version, about)]
struct Cli {
    /// Document to analyze (falls back to RISKDOC_INPUT)
    input: Option<PathBuf>,

    /// Where to write the JSON results (falls back to RISKDOC_OUTPUT)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Upper bound on chunk length in characters
    #[arg(long)]
    max_chunk_size: Option<usize>,

    /// Trailing windows this short or shorter merge into the previous chunk
    #[arg(long)]
    min_chunk_size: Option<usize>,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        if let Some(input) = self.input {
            config.input_path = Some(input);
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(max) = self.max_chunk_size {
            config.chunker.max_size = max;
        }
        if let Some(min) = self.min_chunk_size {
            config.chunker.min_size = min;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("riskdoc: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);

    let _log_guard = match init_tracing(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("riskdoc: failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match execute(&config).await {
        Ok(rows) => {
            println!(
                "Analysis complete. {} result(s) saved to {}",
                rows,
                config.output_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Pipeline failed");
            ExitCode::FAILURE
        }
    }
}

async fn execute(config: &AppConfig) -> Result<usize, PipelineError> {
    config.validate()?;
    let generator = create_provider(&config.provider, config.timeout).await?;
    let table = riskdoc::run(config, generator.as_ref()).await?;
    Ok(table.len())
}
