use clap::Args;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use counsel_core::models::{truncate_chars, AgentName, AgentStatus};
use counsel_core::session::{dialogue_line, headline};
use counsel_core::{
    render_text, AnalysisPhase, AnalysisSession, AnalysisState, CaseBackend, CounselConfig,
    CounselError, ResultsView, SessionHandoff, SessionOptions,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::results::print_results;
use crate::config::api_client;
use crate::output::{agent_label, agent_table_color, format_blocks, heading, status_icon, status_label};

#[derive(Args)]
pub struct WatchArgs {
    #[arg(help = "Case ID (defaults to the most recently submitted case)")]
    case_id: Option<String>,

    #[arg(long, help = "Do not print the results once the analysis completes")]
    no_results: bool,
}

pub async fn handle_watch_command(config: &CounselConfig, args: WatchArgs) -> anyhow::Result<()> {
    let case_id = resolve_case_id(config, args.case_id)?;
    let client = api_client(config)?;
    watch_case(config, client, &case_id, !args.no_results).await
}

/// The explicit id, else the saved handoff from the last `counsel submit`.
pub fn resolve_case_id(config: &CounselConfig, explicit: Option<String>) -> anyhow::Result<String> {
    if let Some(id) = explicit.filter(|id| !id.trim().is_empty()) {
        return Ok(id.trim().to_string());
    }

    match SessionHandoff::load(config.handoff_ttl()) {
        Ok(Some(handoff)) => {
            debug!(case_id = %handoff.case_id, "Using case from saved handoff");
            Ok(handoff.case_id)
        }
        Ok(None) => Err(CounselError::MissingCaseId.into()),
        Err(e) => {
            warn!(error = %e, "Could not read saved handoff");
            Err(CounselError::MissingCaseId.into())
        }
    }
}

pub async fn watch_case(
    config: &CounselConfig,
    backend: Arc<dyn CaseBackend>,
    case_id: &str,
    show_results: bool,
) -> anyhow::Result<()> {
    let session =
        AnalysisSession::start(backend.clone(), case_id, SessionOptions::from_config(config)).await;
    let mut rx = session.watch();
    let mut dashboard = Dashboard::new(config);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut state = rx.borrow_and_update().clone();
    print_lines(dashboard.update(&state));

    while !state.is_terminal() {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                state = rx.borrow_and_update().clone();
                print_lines(dashboard.update(&state));
            }
            _ = &mut ctrl_c => {
                session.cancel();
                println!();
                println!(
                    "{}",
                    format!("Stopped watching. Resume with 'counsel watch {}'.", case_id).dimmed()
                );
                return Ok(());
            }
        }
    }

    session.cancel();

    match state.phase {
        AnalysisPhase::Complete => {
            if show_results {
                println!();
                let view = ResultsView::load(backend.as_ref(), case_id).await?;
                print_results(&view, config);
            } else {
                println!(
                    "{}",
                    format!("Read the strategy with 'counsel results {}'.", case_id).dimmed()
                );
            }
            Ok(())
        }
        AnalysisPhase::Failed(message) => Err(CounselError::AnalysisFailed(message).into()),
        AnalysisPhase::Analyzing => Ok(()),
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

/// Turns successive state snapshots into the lines that describe what
/// changed between them.
struct Dashboard {
    previous: Option<AnalysisState>,
    seen_messages: HashSet<String>,
    preview_chars: usize,
    poll_secs: u64,
    compact: bool,
}

impl Dashboard {
    fn new(config: &CounselConfig) -> Self {
        Self {
            previous: None,
            seen_messages: HashSet::new(),
            preview_chars: config.analysis.message_preview_chars,
            poll_secs: config.analysis.poll_interval_secs,
            compact: config.display.compact,
        }
    }

    fn update(&mut self, next: &AnalysisState) -> Vec<String> {
        let mut lines = Vec::new();
        let first = self.previous.is_none();
        let prev = self
            .previous
            .take()
            .unwrap_or_else(|| AnalysisState::new(next.case_id.clone()));

        if first {
            lines.push(format!("{}", format!("Live Analysis: {}", next.case_id).cyan().bold()));
            lines.push(format!("{}", "═".repeat(50).dimmed()));
            lines.push(roster_table(next));
        } else {
            for name in AgentName::ALL {
                lines.extend(self.agent_lines(&prev, next, name));
            }
        }

        // Rounds arrive zero-based.
        if (next.current_round, next.total_rounds) != (prev.current_round, prev.total_rounds)
            && next.total_rounds > 0
        {
            lines.push(format!(
                "{}",
                format!(
                    "── Deliberation Round {} of {} ──",
                    next.current_round.saturating_add(1),
                    next.total_rounds
                )
                .magenta()
                .bold()
            ));
        }

        if next.activity != prev.activity || first {
            if let Some(activity) = next.activity.as_deref() {
                lines.push(format!("{} {}", "→".blue(), activity));
            } else if first && !next.is_terminal() {
                lines.push(format!("{} {}", "→".blue(), headline(next)));
            }
        }

        if next.conflicts != prev.conflicts && !next.conflicts.is_empty() {
            lines.push(format!(
                "{} {}",
                "⚠".yellow(),
                format!("{} conflict(s) detected", next.conflicts.len()).yellow()
            ));
            for conflict in &next.conflicts {
                lines.push(format!(
                    "    • {} {} {}",
                    conflict.issue,
                    format!("({})", conflict.agents_involved.join(", ")).dimmed(),
                    format!("[{}]", conflict.status_label()).dimmed()
                ));
            }
        }

        for (idx, message) in next.messages.iter().enumerate() {
            let key = if message.message_id.is_empty() {
                format!("#{}", idx)
            } else {
                message.message_id.clone()
            };
            if !self.seen_messages.insert(key) {
                continue;
            }
            let preview = message.preview(self.preview_chars);
            if self.compact {
                lines.push(format!(
                    "  {} → {}",
                    agent_label(&message.sender),
                    agent_label(&message.recipient)
                ));
            } else {
                lines.push(format!(
                    "  {} → {}: {}",
                    agent_label(&message.sender),
                    agent_label(&message.recipient),
                    preview.dimmed()
                ));
            }
        }

        if next.stream_interrupted && !prev.stream_interrupted {
            lines.push(format!(
                "{} {}",
                "!".yellow().bold(),
                format!(
                    "Live updates unavailable; checking progress every {}s",
                    self.poll_secs
                )
                .yellow()
            ));
        }

        if !first
            && !self.compact
            && !next.is_terminal()
            && next.dialogue_index != prev.dialogue_index
        {
            lines.push(format!("  {}", dialogue_line(next.dialogue_index).dimmed().italic()));
        }

        if next.phase != prev.phase || (first && next.is_terminal()) {
            match &next.phase {
                AnalysisPhase::Complete => lines.push(format!(
                    "{} {}",
                    "✓".green().bold(),
                    "Analysis complete".green().bold()
                )),
                AnalysisPhase::Failed(message) => lines.push(format!(
                    "{} {}",
                    "✗".red().bold(),
                    format!("Analysis failed: {}", message).red()
                )),
                AnalysisPhase::Analyzing => {}
            }
        }

        self.previous = Some(next.clone());
        lines
    }

    fn agent_lines(&self, prev: &AnalysisState, next: &AnalysisState, name: AgentName) -> Vec<String> {
        let before = prev.agent(name);
        let after = next.agent(name);
        if before.status == after.status {
            return Vec::new();
        }

        let label = agent_label(&name.to_string());
        match after.status {
            AgentStatus::Pending => Vec::new(),
            AgentStatus::Thinking => {
                let phrase = next.thinking_phrase(name).unwrap_or("Thinking...");
                vec![format!(
                    "{} {} {}",
                    status_icon(after.status),
                    label,
                    phrase.dimmed()
                )]
            }
            AgentStatus::Complete => {
                let mut lines = vec![format!(
                    "{} {} {}",
                    status_icon(after.status),
                    label,
                    "completed their analysis".green()
                )];
                if !self.compact && !after.output.is_empty() {
                    let preview = truncate_chars(&after.output.as_display_text(), self.preview_chars);
                    lines.extend(format_blocks(&render_text(&preview), 6));
                }
                lines
            }
        }
    }
}

fn roster_table(state: &AnalysisState) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Agent").fg(Color::White),
            Cell::new("Role").fg(Color::White),
            Cell::new("Status").fg(Color::White),
        ]);

    for name in AgentName::ALL {
        let run = state.agent(name);
        let status_color = match run.status {
            AgentStatus::Pending => Color::DarkGrey,
            AgentStatus::Thinking => Color::Yellow,
            AgentStatus::Complete => Color::Green,
        };
        table.add_row(vec![
            Cell::new(name.to_string()).fg(agent_table_color(name)),
            Cell::new(&run.role),
            Cell::new(status_label(run.status)).fg(status_color),
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_core::StreamEvent;
    use serde_json::json;

    fn dashboard() -> Dashboard {
        colored::control::set_override(false);
        Dashboard::new(&CounselConfig::default())
    }

    fn apply(state: &mut AnalysisState, event: StreamEvent) {
        state.apply(&event);
    }

    #[test]
    fn test_first_update_prints_roster() {
        let mut dash = dashboard();
        let state = AnalysisState::new("abc123");
        let lines = dash.update(&state);
        assert!(lines[0].contains("Live Analysis: abc123"));
        assert!(lines.iter().any(|l| l.contains("Lead Trial Strategist")));
        assert!(lines.iter().any(|l| l.contains("Analysis in progress...")));
    }

    #[test]
    fn test_agent_transitions() {
        let mut dash = dashboard();
        let mut state = AnalysisState::new("abc123");
        dash.update(&state);

        apply(
            &mut state,
            StreamEvent::AgentStarted {
                agent: "Harvey".to_string(),
                phase: None,
            },
        );
        let lines = dash.update(&state);
        assert!(lines.iter().any(|l| l.contains("Harvey") && l.contains("Analyzing case fundamentals")));

        apply(
            &mut state,
            StreamEvent::AgentCompleted {
                agent: "Harvey".to_string(),
                content: "**Move** to dismiss".into(),
                output_type: None,
                run_id: None,
            },
        );
        let lines = dash.update(&state);
        assert!(lines.iter().any(|l| l.contains("Harvey completed their analysis")));
        assert!(lines.iter().any(|l| l.trim() == "Move to dismiss"));
        assert!(lines.iter().any(|l| l.starts_with("→ Harvey completed their analysis")));
    }

    #[test]
    fn test_rounds_conflicts_and_terminal() {
        let mut dash = dashboard();
        let mut state = AnalysisState::new("abc123");
        dash.update(&state);

        apply(&mut state, StreamEvent::RoundStarted { round: 0, total_rounds: 3 });
        let lines = dash.update(&state);
        assert!(lines.iter().any(|l| l.contains("Deliberation Round 1 of 3")));

        apply(&mut state, StreamEvent::RoundStarted { round: 1, total_rounds: 3 });
        let lines = dash.update(&state);
        assert!(lines.iter().any(|l| l.contains("Deliberation Round 2 of 3")));

        apply(&mut state, StreamEvent::RoundStarted { round: u32::MAX, total_rounds: 3 });
        let lines = dash.update(&state);
        let expected = format!("Deliberation Round {} of 3", u32::MAX);
        assert!(lines.iter().any(|l| l.contains(&expected)));

        let conflicts = serde_json::from_value(json!([
            {"conflict_id": "c1", "issue": "Damages cap", "agents_involved": ["Harvey", "Tanner"]}
        ]))
        .unwrap();
        apply(&mut state, StreamEvent::ConflictDetected { count: 1, conflicts });
        let lines = dash.update(&state);
        assert!(lines.iter().any(|l| l.contains("1 conflict(s) detected")));
        assert!(lines.iter().any(|l| l.contains("Damages cap") && l.contains("[Open]")));

        apply(&mut state, StreamEvent::Terminal { strategy: None });
        let lines = dash.update(&state);
        assert!(lines.iter().any(|l| l.contains("Analysis complete")));

        assert!(dash.update(&state).is_empty());
    }

    #[test]
    fn test_messages_printed_once() {
        let mut dash = dashboard();
        let mut state = AnalysisState::new("abc123");
        state.messages = serde_json::from_value(json!([
            {"message_id": "m1", "sender": "Harvey", "recipient": "Jessica", "message": "Draft ready"}
        ]))
        .unwrap();

        let lines = dash.update(&state);
        assert_eq!(lines.iter().filter(|l| l.contains("Draft ready")).count(), 1);
        assert!(dash.update(&state).iter().all(|l| !l.contains("Draft ready")));
    }

    #[test]
    fn test_failure_line() {
        let mut dash = dashboard();
        let mut state = AnalysisState::new("abc123");
        dash.update(&state);
        apply(&mut state, StreamEvent::Error { message: None });
        let lines = dash.update(&state);
        assert!(lines
            .iter()
            .any(|l| l.contains("Analysis failed: An error occurred during analysis")));
    }
}
