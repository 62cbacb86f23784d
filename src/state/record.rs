//! CRM record and field definitions
//!
//! A record is kept as the raw JSON object returned by Zoho so that columns
//! outside the projection (`id`, for instance) survive untouched into exports.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Contact fields selected by the COQL query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadField {
    FullName,
    Phone,
    Product,
    /// Acquisition channel; the classification key
    LeadSource,
    SubSource,
    Status,
    /// CRM-specific call outcome, distinct from status
    Disposition,
    Agency,
    AdName,
    AdsetName,
    Campaign,
    /// UTM campaign tag
    CampaignTag,
}

impl LeadField {
    /// Returns the Zoho API name for this field
    pub fn api_name(&self) -> &'static str {
        match self {
            Self::FullName => "Full_Name",
            Self::Phone => "Phone",
            Self::Product => "Product",
            Self::LeadSource => "Lead_Source",
            Self::SubSource => "subsource",
            Self::Status => "Lead_Status",
            Self::Disposition => "Disposition",
            Self::Agency => "Agency",
            Self::AdName => "Ad_Name",
            Self::AdsetName => "Adset_Name",
            Self::Campaign => "Campaign",
            Self::CampaignTag => "utm_campaign",
        }
    }

    /// Returns every selected field in query projection order
    pub fn all_fields() -> Vec<Self> {
        vec![
            Self::FullName,
            Self::Phone,
            Self::Product,
            Self::LeadSource,
            Self::SubSource,
            Self::Status,
            Self::Disposition,
            Self::Agency,
            Self::AdName,
            Self::AdsetName,
            Self::Campaign,
            Self::CampaignTag,
        ]
    }
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

/// One contact row from the CRM
///
/// No field is guaranteed to be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this record with `field` set to `value`
    pub fn with(mut self, field: LeadField, value: impl Into<Value>) -> Self {
        self.0.insert(field.api_name().to_string(), value.into());
        self
    }

    /// Returns the raw JSON value stored under `name`
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns the text of a field, or None when it is missing
    ///
    /// `null`, absent keys and blank strings all count as missing. Lookup
    /// fields come back from Zoho as `{"name": ..., "id": ...}` objects and
    /// are rendered by name; multi-select picklists are joined with commas.
    pub fn get(&self, field: LeadField) -> Option<String> {
        self.raw(field.api_name()).and_then(render_value)
    }
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("name").and_then(render_value),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render_value).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        other => Some(other.to_string()),
    }
}
