use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{CounselError, CounselResult};
use crate::models::{AgentOutput, CaseDetails, Conflict, Strategy};

pub const AGENT_STARTED: &str = "agent_started";
pub const AGENT_COMPLETED: &str = "agent_completed";
pub const ROUND_STARTED: &str = "deliberation_round_started";
pub const ROUND_COMPLETED: &str = "deliberation_round_completed";
pub const DETECTING_CONFLICTS: &str = "detecting_conflicts";
pub const CONFLICT_DETECTED: &str = "conflict_detected";
pub const STRATEGY_READY: &str = "strategy_ready";
pub const FINAL_REPORT_PREPARED: &str = "final_report_prepared";
pub const ERROR: &str = "error";

/// A decoded event from the live analysis stream, plus the client-side
/// reconciliation snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    AgentStarted {
        agent: String,
        phase: Option<String>,
    },
    AgentCompleted {
        agent: String,
        content: AgentOutput,
        output_type: Option<String>,
        run_id: Option<String>,
    },
    RoundStarted {
        round: u32,
        total_rounds: u32,
    },
    RoundCompleted {
        round: u32,
    },
    DetectingConflicts,
    ConflictDetected {
        count: usize,
        conflicts: Vec<Conflict>,
    },
    /// `strategy_ready` and `final_report_prepared` both map here.
    Terminal {
        strategy: Option<Strategy>,
    },
    Error {
        message: Option<String>,
    },
    /// Synthesized by the client from a `GET /api/cases/{id}` after the
    /// stream dropped.
    Snapshot(Box<CaseDetails>),
}

#[derive(Deserialize)]
struct AgentStartedPayload {
    #[serde(default)]
    agent: String,
    #[serde(default)]
    phase: Option<String>,
}

#[derive(Deserialize)]
struct AgentCompletedPayload {
    #[serde(default)]
    agent: String,
    #[serde(default)]
    content: AgentOutput,
    #[serde(rename = "type", default)]
    output_type: Option<String>,
    #[serde(default)]
    run_id: Option<String>,
}

#[derive(Deserialize)]
struct RoundPayload {
    #[serde(default)]
    round: u32,
    #[serde(default)]
    total_rounds: u32,
}

#[derive(Deserialize)]
struct ConflictPayload {
    #[serde(default)]
    count: usize,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    conflicts: Vec<Conflict>,
}

#[derive(Deserialize)]
struct TerminalPayload {
    #[serde(default)]
    strategy: Option<Strategy>,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
}

impl StreamEvent {
    /// Decodes a named SSE event.
    ///
    /// Returns `Ok(None)` for event names this client does not know and
    /// `Err(MalformedEvent)` when a known event carries undecodable data.
    pub fn parse(name: &str, data: &str) -> CounselResult<Option<StreamEvent>> {
        let event = match name {
            AGENT_STARTED => {
                let p: AgentStartedPayload = decode(name, data)?;
                StreamEvent::AgentStarted {
                    agent: p.agent,
                    phase: p.phase.filter(|s| !s.trim().is_empty()),
                }
            }
            AGENT_COMPLETED => {
                let p: AgentCompletedPayload = decode(name, data)?;
                StreamEvent::AgentCompleted {
                    agent: p.agent,
                    content: p.content,
                    output_type: p.output_type,
                    run_id: p.run_id,
                }
            }
            ROUND_STARTED => {
                let p: RoundPayload = decode(name, data)?;
                StreamEvent::RoundStarted {
                    round: p.round,
                    total_rounds: p.total_rounds,
                }
            }
            ROUND_COMPLETED => {
                let p: RoundPayload = decode(name, data)?;
                StreamEvent::RoundCompleted { round: p.round }
            }
            DETECTING_CONFLICTS => StreamEvent::DetectingConflicts,
            CONFLICT_DETECTED => {
                let p: ConflictPayload = decode(name, data)?;
                StreamEvent::ConflictDetected {
                    count: p.count,
                    conflicts: p.conflicts,
                }
            }
            STRATEGY_READY | FINAL_REPORT_PREPARED => {
                // The terminal signal matters more than its payload.
                let strategy = decode::<TerminalPayload>(name, data)
                    .ok()
                    .and_then(|p| p.strategy);
                StreamEvent::Terminal { strategy }
            }
            ERROR => {
                let message = decode::<ErrorPayload>(name, data)
                    .ok()
                    .and_then(|p| p.message)
                    .filter(|m| !m.trim().is_empty());
                StreamEvent::Error { message }
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::AgentStarted { .. } => AGENT_STARTED,
            StreamEvent::AgentCompleted { .. } => AGENT_COMPLETED,
            StreamEvent::RoundStarted { .. } => ROUND_STARTED,
            StreamEvent::RoundCompleted { .. } => ROUND_COMPLETED,
            StreamEvent::DetectingConflicts => DETECTING_CONFLICTS,
            StreamEvent::ConflictDetected { .. } => CONFLICT_DETECTED,
            StreamEvent::Terminal { .. } => STRATEGY_READY,
            StreamEvent::Error { .. } => ERROR,
            StreamEvent::Snapshot(_) => "snapshot",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Terminal { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StreamEvent::Error { .. })
    }
}

fn decode<T: DeserializeOwned>(name: &str, data: &str) -> CounselResult<T> {
    let data = if data.trim().is_empty() { "{}" } else { data };
    serde_json::from_str(data).map_err(|e| CounselError::MalformedEvent {
        event: name.to_string(),
        message: e.to_string(),
    })
}
