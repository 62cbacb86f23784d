//! Pipeline coordinator - sequential stage runner
//!
//! This module owns the run loop that carries one `PipelineState` through
//! every stage in order:
//! - Refreshing the CRM access token
//! - Fetching records created in the trailing window
//! - Classifying records by lead source
//! - Generating the report from per-channel summaries
//!
//! A stage never runs once an earlier stage has recorded an error.

use crate::config::Config;
use crate::pipeline::fetcher::{build_http_client, build_select_query, fetch_records, TimeWindow};
use crate::pipeline::{auth, classifier, llm, report};
use crate::state::PipelineState;
use crate::{PipelineError, PulseError};
use chrono::{FixedOffset, Utc};
use reqwest::Client;
use std::fmt;
use std::time::Instant;

/// One step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    RefreshToken,
    FetchRecords,
    Classify,
    GenerateReport,
}

impl Stage {
    /// Every stage in execution order
    pub const ALL: [Stage; 4] = [
        Stage::RefreshToken,
        Stage::FetchRecords,
        Stage::Classify,
        Stage::GenerateReport,
    ];

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::RefreshToken => "refresh_token",
            Self::FetchRecords => "fetch_records",
            Self::Classify => "classify",
            Self::GenerateReport => "generate_report",
        }
    }

    /// Empties the state field this stage writes
    fn reset_output(&self, state: &mut PipelineState) {
        match self {
            Self::RefreshToken => state.access_token = None,
            Self::FetchRecords => state.raw_records.clear(),
            Self::Classify => state.classified.clear(),
            Self::GenerateReport => state.report.clear(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Main pipeline structure
pub struct Pipeline {
    config: Config,
    client: Client,
    offset: FixedOffset,
}

impl Pipeline {
    /// Creates a pipeline from a loaded configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Pipeline)` - Ready to run
    /// * `Err(PulseError)` - The UTC offset is invalid or the HTTP client
    ///   could not be built
    pub fn new(config: Config) -> Result<Self, PulseError> {
        let offset = config.query.offset()?;
        let client = build_http_client()?;

        Ok(Self {
            config,
            client,
            offset,
        })
    }

    /// Returns the configuration this pipeline runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the COQL statement a run started now would issue
    pub fn preview_query(&self) -> String {
        let window = TimeWindow::trailing(Utc::now(), self.offset);
        build_select_query(&self.config.query.module, &window)
    }

    /// Runs every stage against a fresh state and returns it
    pub async fn run(&self) -> PipelineState {
        let mut state = PipelineState::new();
        self.run_with(&mut state).await;
        state
    }

    /// Runs every stage against `state`
    ///
    /// Stages after the first failure are skipped; the failing stage's own
    /// output field is reset so no partial data from it survives.
    pub async fn run_with(&self, state: &mut PipelineState) {
        for stage in Stage::ALL {
            self.execute(stage, state).await;
        }
    }

    /// Runs one stage, recording a failure on `state`
    async fn execute(&self, stage: Stage, state: &mut PipelineState) {
        if state.is_failed() {
            tracing::debug!(stage = %stage, error = ?state.error, "Skipping stage after earlier failure");
            return;
        }

        let started = Instant::now();
        match self.run_stage(stage, state).await {
            Ok(()) => {
                tracing::debug!(
                    stage = %stage,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Stage finished"
                );
            }
            Err(e) => {
                tracing::error!(stage = %stage, "{}", e);
                stage.reset_output(state);
                state.record_failure(e);
            }
        }
    }

    async fn run_stage(&self, stage: Stage, state: &mut PipelineState) -> Result<(), PipelineError> {
        match stage {
            Stage::RefreshToken => {
                tracing::info!("Refreshing Zoho access token...");
                let token = auth::refresh_access_token(
                    &self.client,
                    &self.config.endpoints.token_url,
                    &self.config.credentials,
                )
                .await?;
                state.access_token = Some(token);
                tracing::info!("Token refresh successful");
            }
            Stage::FetchRecords => {
                let token = state
                    .access_token
                    .as_deref()
                    .ok_or(PipelineError::MissingToken)?;

                let window = TimeWindow::trailing(Utc::now(), self.offset);
                tracing::info!(
                    "Fetching records created between {} and {}",
                    window.start(),
                    window.end()
                );
                let query = build_select_query(&self.config.query.module, &window);
                let records = fetch_records(
                    &self.client,
                    &self.config.endpoints.coql_url,
                    token,
                    &query,
                )
                .await?;

                tracing::info!("Successfully fetched {} records", records.len());
                state.raw_records = records;
            }
            Stage::Classify => {
                state.classified = classifier::classify(&state.raw_records);
                tracing::info!(
                    "Classified {} records into {} lead sources",
                    state.classified_count(),
                    state.classified.len()
                );
            }
            Stage::GenerateReport => {
                tracing::info!("Generating report using LLM...");
                let summaries = report::summarize(&state.classified);
                let prompt = report::render_prompt(&summaries)?;
                let text = llm::complete(
                    &self.client,
                    &self.config.endpoints.llm_base_url,
                    &self.config.llm,
                    &self.config.credentials.llm_api_key,
                    &prompt,
                )
                .await?;

                state.report = text;
                tracing::info!("Report generation completed");
            }
        }

        Ok(())
    }
}
