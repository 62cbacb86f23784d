//! Configuration module for Lead Pulse
//!
//! Credentials come from the process environment; everything else comes from
//! an optional TOML settings file and falls back to Zoho/OpenAI defaults.
//!
//! # Example
//!
//! ```no_run
//! use lead_pulse::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("lead-pulse.toml"))).unwrap();
//! println!("Reports will use model: {}", config.llm.model);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, Credentials, EndpointConfig, LlmConfig, OutputConfig, QueryConfig, Settings,
    DEFAULT_COQL_URL, DEFAULT_LLM_BASE_URL, DEFAULT_TOKEN_URL,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, credentials_from_env, credentials_from_lookup, load_config,
    load_config_with_hash, parse_settings, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_LLM_API_KEY,
    ENV_REFRESH_TOKEN,
};

pub use validation::validate;
