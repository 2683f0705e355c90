//! The analysis state reducer.
//!
//! Two independent sources feed the same state: the live event stream and
//! the periodic case fetch. Both go through the pure functions here, and
//! every merge is upgrade-only so the sources can interleave freely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    AgentMessage, AgentName, AgentOutput, AgentRun, AgentStatus, CaseDetails, Conflict, Strategy,
};
use crate::stream::StreamEvent;

pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred during analysis";
pub const COMPLETE_ACTIVITY: &str = "Final strategy prepared! Analysis complete.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "phase", content = "message")]
pub enum AnalysisPhase {
    #[default]
    Analyzing,
    Complete,
    Failed(String),
}

impl AnalysisPhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AnalysisPhase::Analyzing)
    }
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisPhase::Analyzing => write!(f, "analyzing"),
            AnalysisPhase::Complete => write!(f, "complete"),
            AnalysisPhase::Failed(msg) => write!(f, "failed: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisState {
    pub case_id: String,
    /// One run per agent, in display order.
    pub agents: Vec<AgentRun>,
    pub current_round: u32,
    pub total_rounds: u32,
    pub conflicts: Vec<Conflict>,
    pub messages: Vec<AgentMessage>,
    pub activity: Option<String>,
    pub phase: AnalysisPhase,
    pub strategy: Option<Strategy>,
    pub dialogue_index: usize,
    pub thinking_tick: usize,
    /// Set when the live stream dropped and could not be reconciled; the
    /// poller keeps the state moving.
    pub stream_interrupted: bool,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisState {
    pub fn new(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            agents: AgentName::ALL.iter().map(|name| AgentRun::new(*name)).collect(),
            current_round: 0,
            total_rounds: 0,
            conflicts: Vec::new(),
            messages: Vec::new(),
            activity: None,
            phase: AnalysisPhase::Analyzing,
            strategy: None,
            dialogue_index: 0,
            thinking_tick: 0,
            stream_interrupted: false,
            updated_at: Utc::now(),
        }
    }

    pub fn agent(&self, name: AgentName) -> &AgentRun {
        &self.agents[name.index()]
    }

    fn agent_mut(&mut self, name: AgentName) -> &mut AgentRun {
        &mut self.agents[name.index()]
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == AnalysisPhase::Complete
    }

    pub fn all_agents_complete(&self) -> bool {
        self.agents.iter().all(AgentRun::is_complete)
    }

    pub fn completed_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_complete()).count()
    }

    /// Applies one stream event. Returns whether anything changed.
    /// Everything after a terminal phase is ignored.
    pub fn apply(&mut self, event: &StreamEvent) -> bool {
        if self.is_terminal() {
            debug!(event = event.name(), "Ignoring event after terminal state");
            return false;
        }

        let changed = match event {
            StreamEvent::AgentStarted { agent, phase } => {
                let Some(name) = known_agent(agent) else {
                    return false;
                };
                let run = self.agent_mut(name);
                run.status = run.status.merge(AgentStatus::Thinking);
                let phase = phase.as_deref().unwrap_or("working").replace('_', " ");
                self.set_activity(format!("{} is {}...", name, phase));
                true
            }
            StreamEvent::AgentCompleted {
                agent,
                content,
                output_type,
                run_id,
            } => {
                let Some(name) = known_agent(agent) else {
                    return false;
                };
                let before = self.agent(name).clone();
                let run = self.agent_mut(name);
                run.status = AgentStatus::Complete;
                run.output = content.clone();
                run.output_type = output_type.clone();
                run.run_id = run_id.clone();
                let run_changed = *run != before;
                let activity_changed =
                    self.set_activity(format!("{} completed their analysis", name));
                run_changed || activity_changed
            }
            StreamEvent::RoundStarted {
                round,
                total_rounds,
            } => {
                self.current_round = self.current_round.max(*round);
                if *total_rounds > 0 {
                    self.total_rounds = *total_rounds;
                }
                self.set_activity(format!(
                    "Starting deliberation round {} of {}...",
                    round.saturating_add(1),
                    total_rounds
                ));
                true
            }
            StreamEvent::RoundCompleted { round } => {
                self.current_round = self.current_round.max(*round);
                self.set_activity(format!(
                    "Completed deliberation round {}",
                    round.saturating_add(1)
                ));
                true
            }
            StreamEvent::DetectingConflicts => {
                self.set_activity("Detecting conflicts between agent arguments...".to_string())
            }
            StreamEvent::ConflictDetected { count, conflicts } => {
                self.conflicts = conflicts.clone();
                self.set_activity(format!(
                    "Found {} conflict(s) between agent arguments",
                    count
                ));
                true
            }
            StreamEvent::Terminal { strategy } => {
                if let Some(strategy) = strategy {
                    self.accept_strategy(strategy);
                }
                self.phase = AnalysisPhase::Complete;
                self.set_activity(COMPLETE_ACTIVITY.to_string());
                true
            }
            StreamEvent::Error { message } => {
                let message = message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
                self.phase = AnalysisPhase::Failed(message);
                true
            }
            StreamEvent::Snapshot(details) => self.merge_details(details),
        };

        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Folds a fetched case into the state without ever downgrading it.
    pub fn merge_details(&mut self, details: &CaseDetails) -> bool {
        if self.is_terminal() {
            return false;
        }

        let mut changed = false;

        for argument in &details.arguments {
            if let Some(name) = argument.agent_name() {
                changed |= self.complete_if_pending(name, &argument.content, argument.argument_type.clone());
            }
        }

        if let Some(counter) = details.latest_counterargument() {
            changed |= self.complete_if_pending(
                AgentName::Tanner,
                &counter.content,
                Some("counterargument".to_string()),
            );
        }

        let merged = merge_conflicts(&self.conflicts, &details.conflicts);
        if merged != self.conflicts {
            self.conflicts = merged;
            changed = true;
        }

        let merged = merge_messages(&self.messages, &details.agent_messages);
        if merged != self.messages {
            self.messages = merged;
            changed = true;
        }

        if let Some(strategy) = &details.strategy {
            self.accept_strategy(strategy);
            self.phase = AnalysisPhase::Complete;
            self.set_activity(COMPLETE_ACTIVITY.to_string());
            changed = true;
        }

        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    pub fn mark_stream_interrupted(&mut self) -> bool {
        if self.stream_interrupted || self.is_terminal() {
            return false;
        }
        self.stream_interrupted = true;
        true
    }

    /// Advances the rotating banner and thinking phrases.
    pub fn tick_banner(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.dialogue_index = self.dialogue_index.wrapping_add(1);
        self.thinking_tick = self.thinking_tick.wrapping_add(1);
        true
    }

    /// Phrase to show for an agent that is currently thinking.
    pub fn thinking_phrase(&self, name: AgentName) -> Option<&'static str> {
        if self.agent(name).status != AgentStatus::Thinking {
            return None;
        }
        let phrases = name.thinking_phrases();
        Some(phrases[self.thinking_tick % phrases.len()])
    }

    fn accept_strategy(&mut self, strategy: &Strategy) {
        let jessica = self.agent_mut(AgentName::Jessica);
        jessica.status = AgentStatus::Complete;
        if !strategy.final_strategy.is_empty() {
            jessica.output = strategy.final_strategy.clone();
            jessica.output_type = Some("final_strategy".to_string());
        }
        self.strategy = Some(strategy.clone());
    }

    fn complete_if_pending(
        &mut self,
        name: AgentName,
        content: &AgentOutput,
        output_type: Option<String>,
    ) -> bool {
        let run = self.agent_mut(name);
        if run.is_complete() {
            return false;
        }
        run.status = AgentStatus::Complete;
        run.output = content.clone();
        run.output_type = output_type;
        true
    }

    fn set_activity(&mut self, text: String) -> bool {
        if self.activity.as_deref() == Some(text.as_str()) {
            return false;
        }
        self.activity = Some(text);
        true
    }
}

fn known_agent(agent: &str) -> Option<AgentName> {
    match agent.parse::<AgentName>() {
        Ok(name) => Some(name),
        Err(_) => {
            debug!(agent = %agent, "Ignoring event for unknown agent");
            None
        }
    }
}

/// Conflicts from a fetch replace the held list only when they carry data.
pub fn merge_conflicts(current: &[Conflict], incoming: &[Conflict]) -> Vec<Conflict> {
    if incoming.is_empty() {
        current.to_vec()
    } else {
        incoming.to_vec()
    }
}

/// The transcript is append-only server-side, so a non-empty fetch is the
/// latest full view.
pub fn merge_messages(current: &[AgentMessage], incoming: &[AgentMessage]) -> Vec<AgentMessage> {
    if incoming.is_empty() {
        current.to_vec()
    } else {
        incoming.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Argument, CaseRecord, Counterargument};
    use serde_json::json;

    fn started(agent: &str) -> StreamEvent {
        StreamEvent::AgentStarted {
            agent: agent.to_string(),
            phase: None,
        }
    }

    fn completed(agent: &str, content: &str) -> StreamEvent {
        StreamEvent::AgentCompleted {
            agent: agent.to_string(),
            content: AgentOutput::from(content),
            output_type: None,
            run_id: None,
        }
    }

    fn conflict(id: &str) -> Conflict {
        Conflict {
            conflict_id: id.to_string(),
            issue: format!("Issue {}", id),
            agents_involved: vec!["Harvey".to_string(), "Tanner".to_string()],
            description: String::new(),
            status: None,
        }
    }

    fn details() -> CaseDetails {
        serde_json::from_value(json!({"case": {"case_id": "abc123"}})).unwrap()
    }

    fn strategy(text: &str) -> Strategy {
        serde_json::from_value(json!({"strategy_id": "s1", "final_strategy": text})).unwrap()
    }

    #[test]
    fn test_new_state_has_all_agents_pending() {
        let state = AnalysisState::new("abc123");
        assert_eq!(state.agents.len(), 4);
        assert_eq!(state.agents[0].name, AgentName::Jessica);
        assert!(state
            .agents
            .iter()
            .all(|a| a.status == AgentStatus::Pending));
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_started_then_completed() {
        let mut state = AnalysisState::new("abc123");
        assert!(state.apply(&started("Harvey")));
        assert_eq!(state.agent(AgentName::Harvey).status, AgentStatus::Thinking);
        assert_eq!(state.activity.as_deref(), Some("Harvey is working..."));

        assert!(state.apply(&completed("Harvey", "Strategy text")));
        let harvey = state.agent(AgentName::Harvey);
        assert_eq!(harvey.status, AgentStatus::Complete);
        assert_eq!(harvey.output.as_text(), Some("Strategy text"));
        assert_eq!(state.agent(AgentName::Louis).status, AgentStatus::Pending);
    }

    #[test]
    fn test_phase_label_in_activity() {
        let mut state = AnalysisState::new("abc123");
        state.apply(&StreamEvent::AgentStarted {
            agent: "Louis".to_string(),
            phase: Some("precedent_research".to_string()),
        });
        assert_eq!(
            state.activity.as_deref(),
            Some("Louis is precedent research...")
        );
    }

    #[test]
    fn test_never_regress_from_complete() {
        let mut state = AnalysisState::new("abc123");
        state.apply(&completed("Tanner", "Attack"));
        state.apply(&started("Tanner"));
        assert_eq!(state.agent(AgentName::Tanner).status, AgentStatus::Complete);
        assert_eq!(
            state.agent(AgentName::Tanner).output.as_text(),
            Some("Attack")
        );
    }

    #[test]
    fn test_duplicate_completion_is_idempotent() {
        let mut state = AnalysisState::new("abc123");
        assert!(state.apply(&completed("Louis", "Precedent")));
        let snapshot = state.agents.clone();
        assert!(!state.apply(&completed("Louis", "Precedent")));
        assert_eq!(state.agents, snapshot);
    }

    #[test]
    fn test_last_completion_wins() {
        let mut state = AnalysisState::new("abc123");
        state.apply(&completed("Harvey", "Draft"));
        state.apply(&completed("Harvey", "Revised"));
        assert_eq!(
            state.agent(AgentName::Harvey).output.as_text(),
            Some("Revised")
        );
    }

    #[test]
    fn test_unknown_agent_ignored() {
        let mut state = AnalysisState::new("abc123");
        assert!(!state.apply(&started("Mike")));
        assert!(state.activity.is_none());
    }

    #[test]
    fn test_rounds_are_monotonic() {
        let mut state = AnalysisState::new("abc123");
        state.apply(&StreamEvent::RoundStarted {
            round: 1,
            total_rounds: 3,
        });
        assert_eq!(
            state.activity.as_deref(),
            Some("Starting deliberation round 2 of 3...")
        );
        state.apply(&StreamEvent::RoundCompleted { round: 0 });
        assert_eq!(state.current_round, 1);
        assert_eq!(
            state.activity.as_deref(),
            Some("Completed deliberation round 1")
        );
        state.apply(&StreamEvent::RoundStarted {
            round: 2,
            total_rounds: 0,
        });
        assert_eq!(state.current_round, 2);
        assert_eq!(state.total_rounds, 3);
    }

    #[test]
    fn test_round_numbers_at_upper_bound() {
        let mut state = AnalysisState::new("abc123");
        assert!(state.apply(&StreamEvent::RoundStarted {
            round: u32::MAX,
            total_rounds: 3,
        }));
        assert_eq!(state.current_round, u32::MAX);
        assert_eq!(
            state.activity,
            Some(format!("Starting deliberation round {} of 3...", u32::MAX))
        );

        state.apply(&StreamEvent::RoundCompleted { round: u32::MAX });
        assert_eq!(
            state.activity,
            Some(format!("Completed deliberation round {}", u32::MAX))
        );
        assert!(state.apply(&started("Harvey")));
    }

    #[test]
    fn test_conflict_detected_replaces() {
        let mut state = AnalysisState::new("abc123");
        state.apply(&StreamEvent::ConflictDetected {
            count: 2,
            conflicts: vec![conflict("a"), conflict("b")],
        });
        state.apply(&StreamEvent::ConflictDetected {
            count: 3,
            conflicts: vec![conflict("c"), conflict("d"), conflict("e")],
        });
        assert_eq!(state.conflicts.len(), 3);
        assert_eq!(state.conflicts[0].conflict_id, "c");
        assert_eq!(
            state.activity.as_deref(),
            Some("Found 3 conflict(s) between agent arguments")
        );
    }

    #[test]
    fn test_detecting_conflicts_activity() {
        let mut state = AnalysisState::new("abc123");
        assert!(state.apply(&StreamEvent::DetectingConflicts));
        assert!(!state.apply(&StreamEvent::DetectingConflicts));
        assert_eq!(
            state.activity.as_deref(),
            Some("Detecting conflicts between agent arguments...")
        );
    }

    #[test]
    fn test_terminal_stops_changes() {
        let mut state = AnalysisState::new("abc123");
        state.apply(&StreamEvent::Terminal {
            strategy: Some(strategy("Settle")),
        });
        assert!(state.is_complete());
        assert_eq!(state.activity.as_deref(), Some(COMPLETE_ACTIVITY));
        assert_eq!(
            state.agent(AgentName::Jessica).output.as_text(),
            Some("Settle")
        );

        let before = state.clone();
        assert!(!state.apply(&started("Harvey")));
        assert!(!state.apply(&completed("Louis", "late")));
        assert!(!state.merge_details(&details()));
        assert_eq!(state, before);
    }

    #[test]
    fn test_error_event_fails() {
        let mut state = AnalysisState::new("abc123");
        state.apply(&StreamEvent::Error { message: None });
        assert_eq!(
            state.phase,
            AnalysisPhase::Failed(DEFAULT_ERROR_MESSAGE.to_string())
        );
        assert!(!state.apply(&started("Harvey")));
    }

    #[test]
    fn test_merge_details_upgrades_only() {
        let mut state = AnalysisState::new("abc123");
        state.apply(&completed("Harvey", "Live output"));

        let mut fetched = details();
        fetched.arguments = vec![
            Argument {
                argument_id: "a1".to_string(),
                agent: "Harvey".to_string(),
                argument_type: None,
                content: AgentOutput::from("Stored output"),
                reasoning: None,
                created_at: None,
            },
            Argument {
                argument_id: "a2".to_string(),
                agent: "Louis".to_string(),
                argument_type: Some("precedent".to_string()),
                content: AgentOutput::from("Precedent"),
                reasoning: None,
                created_at: None,
            },
        ];
        fetched.counterarguments = vec![Counterargument {
            counterargument_id: "c1".to_string(),
            agent: "Tanner".to_string(),
            target_argument_id: None,
            content: AgentOutput::from("Weakness"),
            attack_vectors: vec![],
            created_at: None,
        }];

        assert!(state.merge_details(&fetched));
        assert_eq!(
            state.agent(AgentName::Harvey).output.as_text(),
            Some("Live output")
        );
        assert_eq!(state.agent(AgentName::Louis).status, AgentStatus::Complete);
        assert_eq!(
            state.agent(AgentName::Tanner).output.as_text(),
            Some("Weakness")
        );
        assert!(!state.is_terminal());

        // Same fetch again changes nothing.
        assert!(!state.merge_details(&fetched));
    }

    #[test]
    fn test_merge_details_with_strategy_completes() {
        let mut state = AnalysisState::new("abc123");
        let mut fetched = details();
        fetched.strategy = Some(strategy("Final plan"));
        assert!(state.merge_details(&fetched));
        assert!(state.is_complete());
        assert_eq!(
            state.agent(AgentName::Jessica).status,
            AgentStatus::Complete
        );
        assert!(state.strategy.is_some());
    }

    #[test]
    fn test_snapshot_event_merges() {
        let mut state = AnalysisState::new("abc123");
        let mut fetched = details();
        fetched.conflicts = vec![conflict("x")];
        assert!(state.apply(&StreamEvent::Snapshot(Box::new(fetched))));
        assert_eq!(state.conflicts.len(), 1);
    }

    #[test]
    fn test_merge_conflicts_keeps_known_on_empty_fetch() {
        let held = vec![conflict("a")];
        assert_eq!(merge_conflicts(&held, &[]), held);
        assert_eq!(merge_conflicts(&[], &[conflict("b")]).len(), 1);
        assert_eq!(
            merge_conflicts(&held, &[conflict("b"), conflict("c")]).len(),
            2
        );
    }

    #[test]
    fn test_banner_tick_and_thinking_phrase() {
        let mut state = AnalysisState::new("abc123");
        assert!(state.thinking_phrase(AgentName::Harvey).is_none());
        state.apply(&started("Harvey"));
        assert_eq!(
            state.thinking_phrase(AgentName::Harvey),
            Some("Analyzing case fundamentals...")
        );
        assert!(state.tick_banner());
        assert_eq!(
            state.thinking_phrase(AgentName::Harvey),
            Some("Reviewing contractual obligations...")
        );
        assert_eq!(state.dialogue_index, 1);
    }
}
