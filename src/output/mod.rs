//! Output module for presenting a finished run
//!
//! This module handles:
//! - Printing the outcome of a run to the terminal
//! - Writing the markdown run summary
//! - Exporting the run as JSON
//! - Computing headline lead metrics

mod export;
mod markdown;
pub mod stats;

pub use export::{write_export, RunExport};
pub use markdown::{format_run_summary, write_run_summary};
pub use stats::{
    adset_breakdown, campaign_breakdown, print_metrics, source_overview, AdsetCount,
    CampaignCount, LeadMetrics, SourceOverview,
};

use crate::state::PipelineState;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Prints a finished run to stdout
///
/// When the run failed only the error message is shown, even if some stages
/// produced data before the failure.
pub fn print_outcome(state: &PipelineState) {
    if state.is_failed() {
        println!("Error: {}", state.error.as_deref().unwrap_or_default());
        return;
    }

    print_metrics(&LeadMetrics::from_classified(&state.classified));
    println!("{}", state.report);
}

/// Writes the markdown summary and the JSON export of a finished run
///
/// Either path may be omitted. Both files carry the same `generated_at` stamp.
pub fn write_outputs(
    state: &PipelineState,
    generated_at: &str,
    report_path: Option<&Path>,
    export_path: Option<&Path>,
) -> crate::Result<()> {
    if let Some(path) = report_path {
        write_run_summary(state, generated_at, path)?;
        tracing::info!("Report written to: {}", path.display());
    }

    if let Some(path) = export_path {
        write_export(state, generated_at, path)?;
        tracing::info!("Export written to: {}", path.display());
    }

    Ok(())
}
