use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::content::AgentOutput;

/// The fixed council of agents. Variant order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentName {
    Jessica,
    Harvey,
    Louis,
    Tanner,
}

impl AgentName {
    pub const ALL: [AgentName; 4] = [
        AgentName::Jessica,
        AgentName::Harvey,
        AgentName::Louis,
        AgentName::Tanner,
    ];

    pub fn role(&self) -> &'static str {
        match self {
            AgentName::Harvey => "Lead Trial Strategist",
            AgentName::Louis => "Precedent & Case Law Expert",
            AgentName::Tanner => "Adversarial Counsel",
            AgentName::Jessica => "Managing Partner",
        }
    }

    /// Rotating phrases shown while the agent is thinking.
    pub fn thinking_phrases(&self) -> &'static [&'static str] {
        match self {
            AgentName::Harvey => &[
                "Analyzing case fundamentals...",
                "Reviewing contractual obligations...",
                "Identifying leverage points...",
            ],
            AgentName::Louis => &[
                "Researching similar precedents...",
                "Cross-referencing case law...",
                "Evaluating judicial trends...",
            ],
            AgentName::Tanner => &[
                "Probing for vulnerabilities...",
                "Stress-testing assumptions...",
                "Formulating counter-attacks...",
            ],
            AgentName::Jessica => &[
                "Coordinating team...",
                "Reviewing agent work...",
                "Synthesizing strategy...",
            ],
        }
    }

    pub fn index(&self) -> usize {
        match self {
            AgentName::Jessica => 0,
            AgentName::Harvey => 1,
            AgentName::Louis => 2,
            AgentName::Tanner => 3,
        }
    }
}

impl std::fmt::Display for AgentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentName::Jessica => write!(f, "Jessica"),
            AgentName::Harvey => write!(f, "Harvey"),
            AgentName::Louis => write!(f, "Louis"),
            AgentName::Tanner => write!(f, "Tanner"),
        }
    }
}

impl FromStr for AgentName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jessica" => Ok(AgentName::Jessica),
            "harvey" => Ok(AgentName::Harvey),
            "louis" => Ok(AgentName::Louis),
            "tanner" => Ok(AgentName::Tanner),
            other => Err(format!("Unknown agent: {}", other)),
        }
    }
}

/// Progress of a single agent. Ordered so that merging is `max`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Pending,
    Thinking,
    Complete,
}

impl AgentStatus {
    pub fn merge(self, incoming: AgentStatus) -> AgentStatus {
        self.max(incoming)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Pending => write!(f, "pending"),
            AgentStatus::Thinking => write!(f, "thinking"),
            AgentStatus::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRun {
    pub name: AgentName,
    pub role: String,
    pub status: AgentStatus,
    #[serde(default)]
    pub output: AgentOutput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl AgentRun {
    pub fn new(name: AgentName) -> Self {
        Self {
            name,
            role: name.role().to_string(),
            status: AgentStatus::Pending,
            output: AgentOutput::Empty,
            output_type: None,
            run_id: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == AgentStatus::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_name_display_and_parse() {
        assert_eq!(AgentName::Harvey.to_string(), "Harvey");
        assert_eq!("tanner".parse::<AgentName>().unwrap(), AgentName::Tanner);
        assert_eq!(" Jessica ".parse::<AgentName>().unwrap(), AgentName::Jessica);
        assert!("Mike".parse::<AgentName>().is_err());
    }

    #[test]
    fn test_display_order() {
        let mut names = vec![AgentName::Tanner, AgentName::Harvey, AgentName::Jessica];
        names.sort();
        assert_eq!(
            names,
            vec![AgentName::Jessica, AgentName::Harvey, AgentName::Tanner]
        );
        for (i, name) in AgentName::ALL.iter().enumerate() {
            assert_eq!(name.index(), i);
        }
    }

    #[test]
    fn test_roles() {
        assert_eq!(AgentName::Louis.role(), "Precedent & Case Law Expert");
        assert_eq!(AgentName::Jessica.role(), "Managing Partner");
    }

    #[test]
    fn test_status_merge_never_regresses() {
        assert_eq!(
            AgentStatus::Complete.merge(AgentStatus::Thinking),
            AgentStatus::Complete
        );
        assert_eq!(
            AgentStatus::Pending.merge(AgentStatus::Thinking),
            AgentStatus::Thinking
        );
        assert_eq!(AgentStatus::Thinking.to_string(), "thinking");
    }

    #[test]
    fn test_agent_run_new() {
        let run = AgentRun::new(AgentName::Harvey);
        assert_eq!(run.role, "Lead Trial Strategist");
        assert_eq!(run.status, AgentStatus::Pending);
        assert!(run.output.is_empty());
        assert!(!run.is_complete());
    }
}
