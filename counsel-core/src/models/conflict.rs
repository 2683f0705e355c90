use serde::{Deserialize, Serialize};

/// A detected disagreement between agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    #[serde(default)]
    pub conflict_id: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub agents_involved: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl Conflict {
    pub fn is_resolved(&self) -> bool {
        self.status.as_deref() == Some("resolved")
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_resolved() {
            "Resolved"
        } else {
            "Open"
        }
    }
}
