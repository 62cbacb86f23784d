//! The record threaded through every stage of a pipeline run

use crate::state::Record;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// State carried from credential refresh through report generation
///
/// A fresh value is created for every run and each stage mutates it in place.
/// `error` holds the first failure of the run; once it is set no later stage
/// fills `raw_records`, `classified` or `report`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineState {
    /// Short-lived CRM token; never serialized
    #[serde(skip)]
    pub access_token: Option<String>,

    /// Records returned by the COQL query, in fetch order
    pub raw_records: Vec<Record>,

    /// Records grouped by lead source, channels in first-seen order
    pub classified: IndexMap<String, Vec<Record>>,

    /// Markdown report produced by the language model
    pub report: String,

    /// First failure message of the run
    pub error: Option<String>,
}

impl PipelineState {
    /// Creates an empty state for a new run
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once any stage has failed
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Records a stage failure
    ///
    /// The first failure wins; later calls leave the message untouched.
    pub fn record_failure(&mut self, error: impl fmt::Display) {
        if self.error.is_none() {
            self.error = Some(error.to_string());
        }
    }

    /// Total number of records across all channel groups
    pub fn classified_count(&self) -> usize {
        self.classified.values().map(Vec::len).sum()
    }
}
