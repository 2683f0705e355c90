use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::api::CaseBackend;
use crate::error::{CounselError, CounselResult};
use crate::models::{CaseDetails, Conflict, Strategy};
use crate::render::{render_output, render_rationale, Block, RationaleNode};

pub const RESULTS_TITLE: &str = "Analysis Results";
pub const RESULTS_SUBTITLE: &str = "Review the final strategy and detailed analysis";
pub const SYNTHESIS_COMPLETE: &str = "Synthesis Complete";
pub const DEFAULT_CASE_TITLE: &str = "Case Analysis";

pub const STRATEGY_HEADING: &str = "Recommended Legal Strategy";
pub const STRATEGY_RATIONALE_HEADING: &str = "Analysis Rationale";
pub const ARGUMENTS_HEADING: &str = "Arguments";
pub const ARGUMENTS_INTRO: &str = "Key affirmative points to advance your case against the opposition.";
pub const NO_ARGUMENTS: &str = "No arguments available yet.";
pub const COUNTERARGUMENTS_HEADING: &str = "Counterarguments";
pub const COUNTERARGUMENTS_INTRO: &str =
    "Adversarial analysis identifying weaknesses and potential challenges.";
pub const NO_COUNTERARGUMENTS: &str = "No counterarguments available yet.";
pub const CONFLICTS_HEADING: &str = "Conflicts";
pub const CONFLICTS_INTRO: &str =
    "Disagreements and tensions identified between agents during analysis.";
pub const NO_CONFLICTS: &str = "No conflicts detected between agents.";
pub const SYNTHESIS_HEADING: &str = "Strategy Synthesis";
pub const SYNTHESIS_INTRO: &str =
    "Final synthesized strategy combining all agent perspectives and resolving conflicts.";
pub const SYNTHESIS_RATIONALE_HEADING: &str = "Synthesis Rationale";
pub const REJECTED_HEADING: &str = "Rejected Alternatives";
pub const REJECTED_INTRO: &str =
    "Strategies and approaches that were considered but ultimately rejected.";

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsHeader {
    pub title: String,
    pub case_id: String,
    pub synthesis_complete: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyPanel {
    pub strategy_id: String,
    pub version: Option<u32>,
    pub content: Vec<Block>,
    pub rationale: Option<RationaleNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentCard {
    pub agent: String,
    pub argument_type: Option<String>,
    pub content: Vec<Block>,
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CounterargumentCard {
    pub agent: String,
    pub content: Vec<Block>,
    pub attack_vectors: Vec<String>,
}

/// The finished analysis of one case, fetched once.
#[derive(Debug, Clone)]
pub struct ResultsView {
    case_id: String,
    details: CaseDetails,
}

impl ResultsView {
    pub async fn load(backend: &dyn CaseBackend, case_id: &str) -> CounselResult<Self> {
        if case_id.trim().is_empty() {
            return Err(CounselError::MissingCaseId);
        }

        match backend.get_case(case_id).await {
            Ok(details) => {
                info!(
                    case_id = %case_id,
                    arguments = details.arguments.len(),
                    conflicts = details.conflicts.len(),
                    has_strategy = details.has_strategy(),
                    "Loaded case results"
                );
                Ok(Self::from_details(case_id, details))
            }
            Err(e) => {
                warn!(case_id = %case_id, error = %e, "Failed to load case results");
                Err(CounselError::ResultsUnavailable {
                    case_id: case_id.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    pub fn from_details(case_id: impl Into<String>, details: CaseDetails) -> Self {
        Self {
            case_id: case_id.into(),
            details,
        }
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn details(&self) -> &CaseDetails {
        &self.details
    }

    pub fn strategy(&self) -> Option<&Strategy> {
        self.details.strategy.as_ref()
    }

    pub fn header(&self) -> ResultsHeader {
        let title = if self.details.case.title.trim().is_empty() {
            DEFAULT_CASE_TITLE.to_string()
        } else {
            self.details.case.title.clone()
        };
        ResultsHeader {
            title,
            case_id: self.case_id.clone(),
            synthesis_complete: self.details.has_strategy(),
            completed_at: self.strategy().and_then(Strategy::created_at_utc),
        }
    }

    pub fn strategy_panel(&self) -> Option<StrategyPanel> {
        self.strategy().map(|strategy| StrategyPanel {
            strategy_id: strategy.strategy_id.clone(),
            version: strategy.version,
            content: render_output(&strategy.final_strategy),
            rationale: render_rationale(&strategy.rationale),
        })
    }

    pub fn argument_cards(&self) -> Vec<ArgumentCard> {
        self.details
            .arguments
            .iter()
            .map(|arg| ArgumentCard {
                agent: arg.agent.clone(),
                argument_type: arg.argument_type.clone(),
                content: render_output(&arg.content),
                reasoning: arg
                    .reasoning
                    .clone()
                    .filter(|r| !r.trim().is_empty()),
            })
            .collect()
    }

    pub fn counterargument_cards(&self) -> Vec<CounterargumentCard> {
        self.details
            .counterarguments
            .iter()
            .map(|counter| CounterargumentCard {
                agent: counter.agent.clone(),
                content: render_output(&counter.content),
                attack_vectors: counter.attack_vectors.clone(),
            })
            .collect()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.details.conflicts
    }

    /// Empty when there is no strategy; callers omit the panel then.
    pub fn rejected_alternatives(&self) -> &[String] {
        self.strategy()
            .map(|s| s.rejected_alternatives.as_slice())
            .unwrap_or(&[])
    }

    pub fn export_file_name(&self) -> String {
        format!("case-{}-results.json", self.case_id)
    }

    pub fn to_json(&self) -> CounselResult<String> {
        Ok(serde_json::to_string_pretty(&self.details)?)
    }

    /// Writes the full details as JSON. A directory target gets the default
    /// file name inside it.
    pub async fn export_to(&self, target: &Path) -> CounselResult<PathBuf> {
        let path = if target.is_dir() {
            target.join(self.export_file_name())
        } else {
            target.to_path_buf()
        };
        tokio::fs::write(&path, self.to_json()?).await?;
        info!(path = %path.display(), "Exported case results");
        Ok(path)
    }
}
