use crate::ConfigError;
use chrono::FixedOffset;
use secrecy::SecretString;
use serde::Deserialize;

/// Default Zoho accounts token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.zoho.com/oauth/v2/token";

/// Default Zoho CRM COQL endpoint
pub const DEFAULT_COQL_URL: &str = "https://www.zohoapis.com/crm/v8/coql";

/// Default OpenAI-compatible API base
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Main configuration structure for Lead Pulse
#[derive(Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub endpoints: EndpointConfig,
    pub llm: LlmConfig,
    pub query: QueryConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Combines environment credentials with file settings
    pub fn from_parts(credentials: Credentials, settings: Settings) -> Self {
        Self {
            credentials,
            endpoints: settings.endpoints,
            llm: settings.llm,
            query: settings.query,
            output: settings.output,
        }
    }
}

/// Secrets read from the process environment
///
/// `Debug` output is redacted by `SecretString`.
#[derive(Debug)]
pub struct Credentials {
    /// Language model API key
    pub llm_api_key: SecretString,

    /// Zoho OAuth client id
    pub client_id: SecretString,

    /// Zoho OAuth client secret
    pub client_secret: SecretString,

    /// Long-lived Zoho refresh token
    pub refresh_token: SecretString,
}

impl Credentials {
    pub fn new(
        llm_api_key: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            llm_api_key: SecretString::from(llm_api_key.into()),
            client_id: SecretString::from(client_id.into()),
            client_secret: SecretString::from(client_secret.into()),
            refresh_token: SecretString::from(refresh_token.into()),
        }
    }
}

/// Non-secret settings read from the optional TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EndpointConfig {
    /// OAuth token endpoint used for the refresh exchange
    pub token_url: String,

    /// COQL query endpoint
    pub coql_url: String,

    /// Base URL of the chat-completions API (without `/chat/completions`)
    pub llm_base_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            coql_url: DEFAULT_COQL_URL.to_string(),
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
        }
    }
}

/// Language model configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LlmConfig {
    /// Model id sent with each request
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
        }
    }
}

/// Record query configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct QueryConfig {
    /// CRM module the query selects from
    pub module: String,

    /// Fixed UTC offset used for the time window, e.g. "+05:30"
    pub utc_offset: String,
}

impl QueryConfig {
    /// Parses `utc_offset` ("+05:30", "-04:00", "Z")
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        parse_utc_offset(&self.utc_offset).ok_or_else(|| {
            ConfigError::Validation(format!(
                "utc_offset must look like '+05:30', got '{}'",
                self.utc_offset
            ))
        })
    }
}

fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value == "Z" {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = if let Some(rest) = value.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = value.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };
    let (hours, minutes) = rest.split_once(':')?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            module: "Contacts".to_string(),
            utc_offset: "+05:30".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Where to write the markdown run summary
    pub report_path: Option<String>,

    /// Where to write the JSON export
    pub export_path: Option<String>,
}
