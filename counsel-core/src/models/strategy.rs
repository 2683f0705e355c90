use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{content::AgentOutput, parse_timestamp};

/// The synthesized final strategy produced by the managing partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    #[serde(default)]
    pub strategy_id: String,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub final_strategy: AgentOutput,
    /// Either a string or arbitrarily nested JSON.
    #[serde(default)]
    pub rationale: Value,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub rejected_alternatives: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Strategy {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn has_rationale(&self) -> bool {
        match &self.rationale {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        }
    }
}
