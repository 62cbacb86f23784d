//! Integration tests for Lead Pulse
//!
//! These tests run full pipelines against wiremock servers standing in for
//! the Zoho token endpoint, the COQL endpoint and the chat-completions API.

mod outputs;
mod pipeline_runs;
