// src/config.rs
// Runtime configuration loaded from the environment (and .env)

use crate::chunker::{ChunkError, ChunkerConfig, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_MIN_CHUNK_SIZE};
use crate::generation::huggingface::{DEFAULT_HF_API_URL, DEFAULT_HF_MODEL};
use crate::generation::ollama::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
use crate::generation::{ProviderConfig, DEFAULT_TIMEOUT};
use crate::logging::{LogFormat, LoggingConfig};
use crate::report::DEFAULT_OUTPUT_PATH;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({message})")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("unknown provider {0:?} (expected \"ollama\" or \"huggingface\")")]
    UnknownProvider(String),

    #[error("no input document given (pass a path or set RISKDOC_INPUT)")]
    MissingInput,

    #[error(transparent)]
    Chunker(#[from] ChunkError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub chunker: ChunkerConfig,
    pub provider: ProviderConfig,
    pub timeout: Duration,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            chunker: ChunkerConfig::default(),
            provider: ProviderConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; unset keys keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(input) = lookup("RISKDOC_INPUT") {
            config.input_path = Some(PathBuf::from(input));
        }
        if let Some(output) = lookup("RISKDOC_OUTPUT") {
            config.output_path = PathBuf::from(output);
        }

        let max_size = parse_or(&lookup, "RISKDOC_MAX_CHUNK_SIZE", DEFAULT_MAX_CHUNK_SIZE)?;
        let min_size = parse_or(&lookup, "RISKDOC_MIN_CHUNK_SIZE", DEFAULT_MIN_CHUNK_SIZE)?;
        config.chunker = ChunkerConfig { max_size, min_size };

        let timeout_secs = parse_or(&lookup, "RISKDOC_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs())?;
        config.timeout = Duration::from_secs(timeout_secs);

        let provider = lookup("RISKDOC_PROVIDER").unwrap_or_else(|| "ollama".to_string());
        config.provider = match provider.to_lowercase().as_str() {
            "ollama" => ProviderConfig::Ollama {
                url: lookup("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
                model: lookup("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            },
            "huggingface" | "hf" => ProviderConfig::HuggingFace {
                url: lookup("HF_API_URL").unwrap_or_else(|| DEFAULT_HF_API_URL.to_string()),
                model: lookup("HF_MODEL").unwrap_or_else(|| DEFAULT_HF_MODEL.to_string()),
                api_token: lookup("HF_API_TOKEN").filter(|t| !t.is_empty()),
            },
            _ => return Err(ConfigError::UnknownProvider(provider)),
        };

        if let Some(level) = lookup("RUST_LOG") {
            config.logging.log_level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.logging.log_format =
                format
                    .parse::<LogFormat>()
                    .map_err(|message| ConfigError::InvalidValue {
                        key: "LOG_FORMAT".to_string(),
                        value: format.clone(),
                        message,
                    })?;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            config.logging.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Check everything the pipeline needs before any work starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chunker.validate()?;
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "RISKDOC_TIMEOUT_SECS".to_string(),
                value: self.timeout.as_secs().to_string(),
                message: "timeout must be at least one second".to_string(),
            });
        }
        if self.input_path.is_none() {
            return Err(ConfigError::MissingInput);
        }
        Ok(())
    }

    pub fn input_path(&self) -> Result<&PathBuf, ConfigError> {
        self.input_path.as_ref().ok_or(ConfigError::MissingInput)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            }),
    }
}
