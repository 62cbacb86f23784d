//! Lead metrics derived from a classified run
//!
//! These are the headline numbers and tables shown next to the model
//! report: totals, qualification rate, per-source leaders, and campaign
//! and ad set counts.

use crate::state::{LeadField, Record};
use indexmap::IndexMap;
use serde::Serialize;

/// Label for a missing status, disposition, campaign or ad set
const UNKNOWN_LABEL: &str = "Unknown";

/// Shown when a source has no records to pick a leader from
const NOT_AVAILABLE: &str = "N/A";

/// Status values that don't count as a qualified lead
const UNQUALIFIED_STATUSES: [&str; 2] = ["null", "Unknown"];

/// Headline metrics for a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadMetrics {
    /// Number of classified records
    pub total_leads: usize,

    /// Number of distinct lead sources
    pub sources: usize,

    /// Records carrying a meaningful status
    pub qualified_leads: usize,

    /// Qualified leads as a percentage of all leads
    pub conversion_rate: f64,
}

impl LeadMetrics {
    /// Computes metrics from the classified groups
    pub fn from_classified(classified: &IndexMap<String, Vec<Record>>) -> Self {
        let total_leads: usize = classified.values().map(Vec::len).sum();
        let qualified_leads = classified
            .values()
            .flatten()
            .filter(|record| is_qualified(record))
            .count();

        let conversion_rate = if total_leads > 0 {
            (qualified_leads as f64 / total_leads as f64) * 100.0
        } else {
            0.0
        };

        Self {
            total_leads,
            sources: classified.len(),
            qualified_leads,
            conversion_rate,
        }
    }
}

fn is_qualified(record: &Record) -> bool {
    record
        .get(LeadField::Status)
        .is_some_and(|status| !UNQUALIFIED_STATUSES.contains(&status.as_str()))
}

/// One row of the per-source overview table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOverview {
    pub source: String,
    pub total_leads: usize,
    pub top_status: String,
    pub top_disposition: String,
}

/// Builds the per-source overview in channel order
///
/// Missing statuses and dispositions count as "Unknown". Ties go to the value
/// seen first.
pub fn source_overview(classified: &IndexMap<String, Vec<Record>>) -> Vec<SourceOverview> {
    classified
        .iter()
        .map(|(source, records)| SourceOverview {
            source: source.clone(),
            total_leads: records.len(),
            top_status: most_common(records, LeadField::Status),
            top_disposition: most_common(records, LeadField::Disposition),
        })
        .collect()
}

fn most_common(records: &[Record], field: LeadField) -> String {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for record in records {
        let value = record
            .get(field)
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(&String, usize)> = None;
    for (value, count) in &counts {
        if best.map_or(true, |(_, top)| *count > top) {
            best = Some((value, *count));
        }
    }

    best.map(|(value, _)| value.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Lead count for one (source, campaign) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignCount {
    pub source: String,
    pub campaign: String,
    pub leads: usize,
}

/// Counts leads per campaign within each source
///
/// Records without a campaign are counted under "Unknown".
pub fn campaign_breakdown(classified: &IndexMap<String, Vec<Record>>) -> Vec<CampaignCount> {
    tally_by_source(classified, LeadField::Campaign)
        .into_iter()
        .map(|(source, campaign, leads)| CampaignCount {
            source,
            campaign,
            leads,
        })
        .collect()
}

/// Lead count for one (source, ad set) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdsetCount {
    pub source: String,
    pub adset: String,
    pub leads: usize,
}

/// Counts leads per ad set within each source
///
/// Records without an ad set are counted under "Unknown".
pub fn adset_breakdown(classified: &IndexMap<String, Vec<Record>>) -> Vec<AdsetCount> {
    tally_by_source(classified, LeadField::AdsetName)
        .into_iter()
        .map(|(source, adset, leads)| AdsetCount {
            source,
            adset,
            leads,
        })
        .collect()
}

/// (source, value, count) rows in channel order, values in first-seen order
fn tally_by_source(
    classified: &IndexMap<String, Vec<Record>>,
    field: LeadField,
) -> Vec<(String, String, usize)> {
    let mut rows = Vec::new();
    for (source, records) in classified {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for record in records {
            let value = record
                .get(field)
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
            *counts.entry(value).or_insert(0) += 1;
        }

        rows.extend(
            counts
                .into_iter()
                .map(|(value, leads)| (source.clone(), value, leads)),
        );
    }
    rows
}

/// Prints the headline metrics to stdout
pub fn print_metrics(metrics: &LeadMetrics) {
    println!("=== Lead Metrics ===\n");
    println!("  Total leads: {}", metrics.total_leads);
    println!("  Lead sources: {}", metrics.sources);
    println!("  Qualified leads: {}", metrics.qualified_leads);
    println!("  Conversion rate: {:.1}%", metrics.conversion_rate);
    println!();
}
