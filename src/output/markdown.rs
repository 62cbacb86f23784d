//! Markdown run summary generation
//!
//! This module renders a finished run as a markdown document: headline
//! metrics, the per-source overview, campaign and ad set counts, and the
//! model report.

use crate::output::stats::{adset_breakdown, campaign_breakdown, source_overview, LeadMetrics};
use crate::output::OutputResult;
use crate::state::PipelineState;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown run summary to `output_path`
///
/// # Arguments
///
/// * `state` - A successfully completed pipeline state
/// * `generated_at` - Timestamp printed in the header
/// * `output_path` - Path where the markdown file should be written
pub fn write_run_summary(
    state: &PipelineState,
    generated_at: &str,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_run_summary(state, generated_at);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a completed run as markdown
pub fn format_run_summary(state: &PipelineState, generated_at: &str) -> String {
    let mut md = String::new();

    md.push_str("# Marketing Lead Report\n\n");
    md.push_str(&format!("- **Generated**: {}\n\n", generated_at));

    let metrics = LeadMetrics::from_classified(&state.classified);
    md.push_str("## Key Metrics\n\n");
    md.push_str(&format!("- **Total Leads**: {}\n", metrics.total_leads));
    md.push_str(&format!("- **Lead Sources**: {}\n", metrics.sources));
    md.push_str(&format!(
        "- **Qualified Leads**: {}\n",
        metrics.qualified_leads
    ));
    md.push_str(&format!(
        "- **Conversion Rate**: {:.1}%\n\n",
        metrics.conversion_rate
    ));

    if state.classified.is_empty() {
        md.push_str("No leads were created in this window.\n\n");
    } else {
        md.push_str("## Lead Sources\n\n");
        md.push_str("| Lead Source | Total Leads | Most Common Status | Most Common Disposition |\n");
        md.push_str("|-------------|-------------|--------------------|-------------------------|\n");
        for row in source_overview(&state.classified) {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&row.source),
                row.total_leads,
                escape_cell(&row.top_status),
                escape_cell(&row.top_disposition)
            ));
        }
        md.push('\n');

        md.push_str("## Campaigns\n\n");
        md.push_str("| Lead Source | Campaign | Lead Count |\n");
        md.push_str("|-------------|----------|------------|\n");
        for row in campaign_breakdown(&state.classified) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&row.source),
                escape_cell(&row.campaign),
                row.leads
            ));
        }
        md.push('\n');

        md.push_str("## Ad Sets\n\n");
        md.push_str("| Lead Source | Ad Set | Lead Count |\n");
        md.push_str("|-------------|--------|------------|\n");
        for row in adset_breakdown(&state.classified) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&row.source),
                escape_cell(&row.adset),
                row.leads
            ));
        }
        md.push('\n');
    }

    md.push_str("## AI Insights\n\n");
    md.push_str(state.report.trim_end());
    md.push('\n');

    md
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
