use super::state::AnalysisState;

pub const DIALOGUE_LINES: [&str; 8] = [
    "Jessica is reviewing the case and coordinating the team...",
    "Harvey is developing the initial strategy...",
    "Louis is researching relevant precedents...",
    "Tanner is analyzing potential weaknesses...",
    "Jessica is coordinating agent responses...",
    "Harvey is strengthening the strategy based on feedback...",
    "Tanner is probing for vulnerabilities...",
    "Jessica is synthesizing the final strategy...",
];

pub fn dialogue_line(index: usize) -> &'static str {
    DIALOGUE_LINES[index % DIALOGUE_LINES.len()]
}

/// Headline for the dashboard: the latest activity, else the one-based
/// round counter, else a generic placeholder.
pub fn headline(state: &AnalysisState) -> String {
    if let Some(activity) = state.activity.as_deref().filter(|a| !a.is_empty()) {
        return activity.to_string();
    }
    if state.total_rounds > 0 {
        return format!(
            "Deliberation Round {} of {}",
            state.current_round.saturating_add(1),
            state.total_rounds
        );
    }
    "Analysis in progress...".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamEvent;

    #[test]
    fn test_dialogue_rotation_wraps() {
        assert_eq!(dialogue_line(0), DIALOGUE_LINES[0]);
        assert_eq!(dialogue_line(8), DIALOGUE_LINES[0]);
        assert_eq!(dialogue_line(11), DIALOGUE_LINES[3]);
    }

    #[test]
    fn test_headline_fallbacks() {
        let mut state = AnalysisState::new("abc123");
        assert_eq!(headline(&state), "Analysis in progress...");

        state.current_round = 1;
        state.total_rounds = 3;
        assert_eq!(headline(&state), "Deliberation Round 2 of 3");

        state.current_round = u32::MAX;
        assert_eq!(
            headline(&state),
            format!("Deliberation Round {} of 3", u32::MAX)
        );

        state.apply(&StreamEvent::DetectingConflicts);
        assert_eq!(
            headline(&state),
            "Detecting conflicts between agent arguments..."
        );
    }
}
