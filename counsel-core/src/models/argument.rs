use serde::{Deserialize, Serialize};

use super::{content::AgentOutput, AgentName};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(default)]
    pub argument_id: String,
    pub agent: String,
    #[serde(rename = "type", default)]
    pub argument_type: Option<String>,
    #[serde(default)]
    pub content: AgentOutput,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Argument {
    pub fn agent_name(&self) -> Option<AgentName> {
        self.agent.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counterargument {
    #[serde(default)]
    pub counterargument_id: String,
    #[serde(default = "default_counter_agent")]
    pub agent: String,
    #[serde(default)]
    pub target_argument_id: Option<String>,
    #[serde(default)]
    pub content: AgentOutput,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub attack_vectors: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_counter_agent() -> String {
    AgentName::Tanner.to_string()
}
