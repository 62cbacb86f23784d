//! Pipeline module for the four-stage lead report run
//!
//! This module contains the core run logic, including:
//! - Zoho OAuth token refresh
//! - Time-windowed COQL record retrieval
//! - Lead-source classification
//! - Channel aggregation and model-generated reporting
//! - The sequential, short-circuiting stage runner

pub mod auth;
pub mod classifier;
mod coordinator;
pub mod fetcher;
pub mod llm;
pub mod report;

pub use classifier::{classify, UNKNOWN_SOURCE};
pub use coordinator::{Pipeline, Stage};
pub use fetcher::{build_http_client, build_select_query, fetch_records, TimeWindow};
pub use report::{render_prompt, summarize, ChannelSummary, NONE_LABEL};
