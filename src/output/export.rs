//! JSON export of a completed run

use crate::output::stats::LeadMetrics;
use crate::output::OutputResult;
use crate::pipeline::{summarize, ChannelSummary};
use crate::state::{PipelineState, Record};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serialized form of a run
#[derive(Debug, Serialize)]
pub struct RunExport<'a> {
    pub generated_at: &'a str,
    pub metrics: LeadMetrics,
    pub summaries: BTreeMap<String, ChannelSummary>,
    pub raw_records: &'a [Record],
    pub classified: &'a IndexMap<String, Vec<Record>>,
    pub report: &'a str,
}

impl<'a> RunExport<'a> {
    pub fn new(state: &'a PipelineState, generated_at: &'a str) -> Self {
        Self {
            generated_at,
            metrics: LeadMetrics::from_classified(&state.classified),
            summaries: summarize(&state.classified),
            raw_records: &state.raw_records,
            classified: &state.classified,
            report: &state.report,
        }
    }
}

/// Writes the run as pretty-printed JSON to `output_path`
///
/// The access token is never part of the export.
pub fn write_export(state: &PipelineState, generated_at: &str, output_path: &Path) -> OutputResult<()> {
    let export = RunExport::new(state, generated_at);

    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, &export)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}
