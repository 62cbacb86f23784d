//! Zoho OAuth refresh-token exchange

use crate::config::Credentials;
use crate::pipeline::fetcher::{describe_transport_error, status_message};
use crate::PipelineError;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    /// Zoho answers bad grants with HTTP 200 and `{"error": "invalid_code"}`
    error: Option<String>,
}

/// Exchanges the long-lived refresh token for a short-lived access token
///
/// Makes exactly one request. A non-2xx status, an undecodable body, or a
/// body without a non-empty `access_token` are all failures.
#[tracing::instrument(skip_all, fields(url = %token_url))]
pub async fn refresh_access_token(
    client: &Client,
    token_url: &str,
    credentials: &Credentials,
) -> Result<String, PipelineError> {
    let form = [
        ("client_id", credentials.client_id.expose_secret()),
        ("client_secret", credentials.client_secret.expose_secret()),
        ("refresh_token", credentials.refresh_token.expose_secret()),
        ("grant_type", "refresh_token"),
    ];

    let response = client
        .post(token_url)
        .form(&form)
        .send()
        .await
        .map_err(|e| PipelineError::TokenRefresh(describe_transport_error(&e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::TokenRefresh(status_message(
            status,
            response.text().await,
        )));
    }

    let data: TokenResponse = response
        .json()
        .await
        .map_err(|e| PipelineError::TokenRefresh(format!("invalid response body: {}", e)))?;

    match data.access_token {
        Some(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(PipelineError::TokenRefresh(match data.error {
            Some(reason) => format!("no access token received ({})", reason),
            None => "no access token received".to_string(),
        })),
    }
}
