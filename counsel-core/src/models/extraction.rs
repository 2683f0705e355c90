use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyDate {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub date: String,
}

/// Best-effort fields pulled out of uploaded documents by the backend.
/// Any subset may be present; empty strings mean "not found".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    #[serde(default)]
    pub case_title: Option<String>,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub plaintiff_name: Option<String>,
    #[serde(default)]
    pub defendant_name: Option<String>,
    #[serde(default)]
    pub other_parties: Option<String>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub case_description: Option<String>,
    #[serde(default)]
    pub extracted_facts: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub money_at_stake: Option<String>,
    #[serde(default)]
    pub stakes_range: Option<String>,
    #[serde(default)]
    pub case_status: Option<String>,
    /// `None` when the backend did not send an array.
    #[serde(default, deserialize_with = "array_or_none")]
    pub key_dates: Option<Vec<KeyDate>>,
}

impl ExtractedFields {
    /// Description, falling back to the raw extracted facts.
    pub fn description(&self) -> Option<&str> {
        non_empty(&self.case_description).or_else(|| non_empty(&self.extracted_facts))
    }

    pub fn found_count(&self) -> usize {
        [
            &self.case_title,
            &self.case_type,
            &self.plaintiff_name,
            &self.defendant_name,
            &self.other_parties,
            &self.jurisdiction,
            &self.money_at_stake,
            &self.stakes_range,
            &self.case_status,
        ]
        .iter()
        .filter(|v| non_empty(v).is_some())
        .count()
            + usize::from(self.description().is_some())
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn array_or_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<KeyDate>>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        Some(Value::Array(items)) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_case_fields() {
        let fields: ExtractedFields = serde_json::from_value(json!({
            "caseTitle": "Acme v. Widgets",
            "plaintiffName": "Acme Corp",
            "defendantName": "Widgets LLC",
            "moneyAtStake": 2500000,
            "keyDates": [{"label": "Filed", "date": "2024-01-10"}]
        }))
        .unwrap();
        assert_eq!(fields.case_title.as_deref(), Some("Acme v. Widgets"));
        assert_eq!(fields.money_at_stake.as_deref(), Some("2500000"));
        assert_eq!(fields.key_dates.as_ref().unwrap().len(), 1);
        assert_eq!(fields.found_count(), 4);
    }

    #[test]
    fn test_description_falls_back_to_facts() {
        let fields: ExtractedFields = serde_json::from_value(json!({
            "caseDescription": "",
            "extractedFacts": "Breach of supply agreement"
        }))
        .unwrap();
        assert_eq!(fields.description(), Some("Breach of supply agreement"));
    }

    #[test]
    fn test_key_dates_absent_vs_empty() {
        let absent: ExtractedFields = serde_json::from_value(json!({})).unwrap();
        assert!(absent.key_dates.is_none());

        let not_array: ExtractedFields =
            serde_json::from_value(json!({"keyDates": "none"})).unwrap();
        assert!(not_array.key_dates.is_none());

        let empty: ExtractedFields = serde_json::from_value(json!({"keyDates": []})).unwrap();
        assert_eq!(empty.key_dates, Some(vec![]));
    }
}
