use serde::{Deserialize, Serialize};

use super::{AgentMessage, Argument, CaseRecord, Conflict, Counterargument, Strategy};

/// Full case state returned by `GET /api/cases/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDetails {
    pub case: CaseRecord,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub arguments: Vec<Argument>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub counterarguments: Vec<Counterargument>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub conflicts: Vec<Conflict>,
    #[serde(default)]
    pub strategy: Option<Strategy>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub agent_messages: Vec<AgentMessage>,
}

impl CaseDetails {
    pub fn has_strategy(&self) -> bool {
        self.strategy.is_some()
    }

    pub fn latest_counterargument(&self) -> Option<&Counterargument> {
        self.counterarguments.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_collections_default_to_empty() {
        let details: CaseDetails = serde_json::from_value(json!({
            "case": {"case_id": "abc123", "title": "Acme v. Widgets"}
        }))
        .unwrap();
        assert!(details.arguments.is_empty());
        assert!(details.conflicts.is_empty());
        assert!(details.agent_messages.is_empty());
        assert!(!details.has_strategy());
        assert!(details.latest_counterargument().is_none());
    }

    #[test]
    fn test_null_collections_decode_as_empty() {
        let details: CaseDetails = serde_json::from_value(json!({
            "case": {"case_id": "abc123"},
            "arguments": null,
            "counterarguments": [{"content": "Weak causation", "attack_vectors": null}],
            "conflicts": [{"conflict_id": "c1", "issue": "Damages", "agents_involved": null}],
            "agent_messages": null,
            "strategy": {
                "strategy_id": "s1",
                "final_strategy": "Settle",
                "rejected_alternatives": null
            }
        }))
        .unwrap();
        assert!(details.arguments.is_empty());
        assert!(details.agent_messages.is_empty());
        assert!(details.counterarguments[0].attack_vectors.is_empty());
        assert!(details.conflicts[0].agents_involved.is_empty());
        assert!(details.strategy.unwrap().rejected_alternatives.is_empty());

        let details: CaseDetails = serde_json::from_value(json!({
            "case": {"case_id": "abc123"},
            "conflicts": null
        }))
        .unwrap();
        assert!(details.conflicts.is_empty());
    }

    #[test]
    fn test_null_strategy() {
        let details: CaseDetails = serde_json::from_value(json!({
            "case": {"case_id": "abc123"},
            "strategy": null,
            "counterarguments": [
                {"content": "first"},
                {"content": "second"}
            ]
        }))
        .unwrap();
        assert!(!details.has_strategy());
        assert_eq!(
            details.latest_counterargument().unwrap().content.as_text(),
            Some("second")
        );
    }
}
