//! Chat-completions client for report generation

use crate::config::LlmConfig;
use crate::pipeline::fetcher::{describe_transport_error, status_message};
use crate::PipelineError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Returns the chat-completions URL under `base_url`
pub fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

/// Sends `prompt` as a single user message and returns the reply verbatim
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `base_url` - OpenAI-compatible API base, e.g. `https://api.openai.com/v1`
/// * `config` - Model and temperature
/// * `api_key` - Bearer credential for the API
/// * `prompt` - The full prompt text
///
/// # Returns
///
/// * `Ok(String)` - The first choice's message content
/// * `Err(PipelineError::Inference)` - Transport error, non-2xx status, or
///   a reply without content
#[tracing::instrument(skip_all, fields(model = %config.model))]
pub async fn complete(
    client: &Client,
    base_url: &str,
    config: &LlmConfig,
    api_key: &SecretString,
    prompt: &str,
) -> Result<String, PipelineError> {
    let request = ChatRequest {
        model: &config.model,
        temperature: config.temperature,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
    };

    let response = client
        .post(completions_url(base_url))
        .bearer_auth(api_key.expose_secret())
        .json(&request)
        .send()
        .await
        .map_err(|e| PipelineError::Inference(describe_transport_error(&e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::Inference(status_message(
            status,
            response.text().await,
        )));
    }

    let data: ChatResponse = response
        .json()
        .await
        .map_err(|e| PipelineError::Inference(format!("invalid response body: {}", e)))?;

    data.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| PipelineError::Inference("model returned no content".to_string()))
}
