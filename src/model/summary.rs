//! Compact summary of an organized report.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::FieldMap;

/// Selected configuration fields plus one entry per flexibility point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryDocument {
    #[serde(rename = "Subscriber address", default)]
    pub subscriber_address: String,

    /// The "Service ID" field
    #[serde(rename = "LID", default)]
    pub lid: String,

    #[serde(rename = "Flexibility Points", default)]
    pub flexibility_points: Vec<FlexibilityPointSummary>,
}

/// Summary of one flexibility point. Empty fields are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlexibilityPointSummary {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub position: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remark: String,

    /// Action section header → fields
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub actions: IndexMap<String, FieldMap>,
}

impl FlexibilityPointSummary {
    /// Create a summary entry with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
