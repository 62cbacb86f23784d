//! Grouping of raw records by acquisition channel

use crate::state::{LeadField, Record};
use indexmap::IndexMap;

/// Channel name for records without a lead source
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Returns the channel a record belongs to
pub fn channel_of(record: &Record) -> String {
    record
        .get(LeadField::LeadSource)
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

/// Partitions records by lead source
///
/// Channels appear in the order they are first seen and each group keeps
/// the original fetch order. Every record lands in exactly one group.
pub fn classify(records: &[Record]) -> IndexMap<String, Vec<Record>> {
    let mut groups: IndexMap<String, Vec<Record>> = IndexMap::new();
    for record in records {
        groups
            .entry(channel_of(record))
            .or_default()
            .push(record.clone());
    }
    groups
}
