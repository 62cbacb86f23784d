//! Lead Pulse: daily lead-source reporting for Zoho CRM
//!
//! This crate refreshes a Zoho OAuth token, pulls the contacts created since the
//! start of yesterday, groups them by lead source, and asks a language model for
//! a marketing report built from per-channel aggregates.

pub mod config;
pub mod output;
pub mod pipeline;
pub mod state;

use thiserror::Error;

/// Main error type for Lead Pulse startup and I/O operations
///
/// Failures inside a pipeline run are not reported through this type; they are
/// captured as [`PipelineError`] messages on the returned [`PipelineState`].
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failures a pipeline stage can hit
///
/// The display text of the first failure becomes `PipelineState::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("No valid access token")]
    MissingToken,

    #[error("Data fetch failed: {0}")]
    Fetch(String),

    #[error("Report generation failed: {0}")]
    Inference(String),
}

/// Result type alias for Lead Pulse operations
pub type Result<T> = std::result::Result<T, PulseError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use pipeline::{Pipeline, Stage};
pub use state::{LeadField, PipelineState, Record};

/// Runs one pipeline pass using configuration from the process environment
///
/// Missing credentials or an unusable HTTP client are startup failures and
/// come back as `Err`. Everything that goes wrong during the run itself is
/// recorded on the returned state.
pub async fn run() -> Result<PipelineState> {
    let config = config::load_config(None)?;
    let pipeline = Pipeline::new(config)?;
    Ok(pipeline.run().await)
}
