//! Per-channel aggregation and the report prompt
//!
//! The aggregates are the only part of report generation that is
//! deterministic; the model call that consumes them lives in `llm`.

use crate::state::{LeadField, Record};
use crate::PipelineError;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Label counted when a record has no status or disposition
pub const NONE_LABEL: &str = "None";

/// Placeholder in [`REPORT_PROMPT_TEMPLATE`] replaced by the summary JSON
const SUMMARY_PLACEHOLDER: &str = "{classified_data}";

/// Instructions sent to the model with the channel summaries
pub const REPORT_PROMPT_TEMPLATE: &str = "\
You are a marketing strategist analyzing lead data from a CRM system. The data is classified by Lead_Source as follows:

{classified_data}

Provide detailed insights for the marketing head and strategists, focusing on:
1. Lead volume and quality (based on Lead_Status and Disposition) by Lead_Source.
2. Effectiveness of different campaigns and ad sets (use Agency, Ad_Name, Adset_Name, Campaign, utm_campaign).
3. Recommendations for optimizing marketing strategies, including which Lead_Sources to prioritize or adjust.

Return a concise report in markdown format.";

/// Aggregate composition of one channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelSummary {
    pub count: usize,
    pub status_counts: BTreeMap<String, usize>,
    pub disposition_counts: BTreeMap<String, usize>,
    pub campaigns: BTreeSet<String>,
    pub adsets: BTreeSet<String>,
    pub agencies: BTreeSet<String>,
    pub products: BTreeSet<String>,
}

impl ChannelSummary {
    /// Folds one record into the summary
    pub fn add(&mut self, record: &Record) {
        self.count += 1;

        let status = record
            .get(LeadField::Status)
            .unwrap_or_else(|| NONE_LABEL.to_string());
        *self.status_counts.entry(status).or_insert(0) += 1;

        let disposition = record
            .get(LeadField::Disposition)
            .unwrap_or_else(|| NONE_LABEL.to_string());
        *self.disposition_counts.entry(disposition).or_insert(0) += 1;

        self.campaigns.extend(record.get(LeadField::Campaign));
        self.adsets.extend(record.get(LeadField::AdsetName));
        self.agencies.extend(record.get(LeadField::Agency));
        self.products.extend(record.get(LeadField::Product));
    }
}

/// Computes the summary of every channel
pub fn summarize(classified: &IndexMap<String, Vec<Record>>) -> BTreeMap<String, ChannelSummary> {
    classified
        .iter()
        .map(|(channel, records)| {
            let mut summary = ChannelSummary::default();
            for record in records {
                summary.add(record);
            }
            (channel.clone(), summary)
        })
        .collect()
}

/// Embeds the pretty-printed summaries into the report instructions
pub fn render_prompt(summaries: &BTreeMap<String, ChannelSummary>) -> Result<String, PipelineError> {
    let json = serde_json::to_string_pretty(summaries).map_err(|e| {
        PipelineError::Inference(format!("failed to serialize channel summaries: {}", e))
    })?;
    Ok(REPORT_PROMPT_TEMPLATE.replace(SUMMARY_PLACEHOLDER, &json))
}
