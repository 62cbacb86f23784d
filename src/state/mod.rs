//! State module for a single pipeline run
//!
//! # Components
//!
//! - `PipelineState`: The record threaded through every stage of a run
//! - `Record`: One CRM contact row as returned by the COQL endpoint
//! - `LeadField`: The contact fields the pipeline selects and aggregates

mod pipeline_state;
mod record;

// Re-export main types
pub use pipeline_state::PipelineState;
pub use record::{LeadField, Record};
