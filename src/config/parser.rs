use crate::config::types::{Config, Credentials, Settings};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable holding the language model API key
pub const ENV_LLM_API_KEY: &str = "OPENAI_API_KEY";

/// Environment variable holding the Zoho client id
pub const ENV_CLIENT_ID: &str = "ZOHO_CLIENT_ID";

/// Environment variable holding the Zoho client secret
pub const ENV_CLIENT_SECRET: &str = "ZOHO_CLIENT_SECRET";

/// Environment variable holding the Zoho refresh token
pub const ENV_REFRESH_TOKEN: &str = "ZOHO_REFRESH_TOKEN";

/// Loads configuration from the environment and an optional TOML file
///
/// # Arguments
///
/// * `path` - Optional path to a TOML settings file; defaults apply without one
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - A credential is missing or the file is unusable
///
/// # Example
///
/// ```no_run
/// use lead_pulse::config::load_config;
///
/// let config = load_config(None).unwrap();
/// println!("Querying module: {}", config.query.module);
/// ```
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let credentials = credentials_from_env()?;

    let settings = match path {
        Some(path) => parse_settings(&std::fs::read_to_string(path)?)?,
        None => Settings::default(),
    };

    let config = Config::from_parts(credentials, settings);
    validate(&config)?;

    Ok(config)
}

/// Parses the TOML settings document
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Reads the four required credentials from the process environment
pub fn credentials_from_env() -> Result<Credentials, ConfigError> {
    credentials_from_lookup(|name| std::env::var(name).ok())
}

/// Reads the four required credentials through `lookup`
///
/// Blank values count as missing. Every missing name is reported at once.
pub fn credentials_from_lookup<F>(lookup: F) -> Result<Credentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = Vec::new();
    let mut read = |name: &str| match lookup(name) {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => {
            missing.push(name.to_string());
            String::new()
        }
    };

    let llm_api_key = read(ENV_LLM_API_KEY);
    let client_id = read(ENV_CLIENT_ID);
    let client_secret = read(ENV_CLIENT_SECRET);
    let refresh_token = read(ENV_REFRESH_TOKEN);

    if !missing.is_empty() {
        return Err(ConfigError::MissingEnv(missing));
    }

    Ok(Credentials::new(
        llm_api_key,
        client_id,
        client_secret,
        refresh_token,
    ))
}

/// Computes a SHA-256 hash of the settings file content
///
/// Logged at startup so a report can be tied back to the settings that
/// produced it.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns the settings file hash alongside it
///
/// The hash is None when no settings file was given.
pub fn load_config_with_hash(path: Option<&Path>) -> Result<(Config, Option<String>), ConfigError> {
    let config = load_config(path)?;
    let hash = path.map(compute_config_hash).transpose()?;
    Ok((config, hash))
}
