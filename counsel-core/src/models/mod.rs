mod agent;
mod argument;
mod case;
mod conflict;
mod content;
mod details;
mod extraction;
mod message;
mod strategy;

pub use agent::{AgentName, AgentRun, AgentStatus};
pub use argument::{Argument, Counterargument};
pub use case::{CaseCreated, CaseRecord, NewCase};
pub use conflict::Conflict;
pub use content::AgentOutput;
pub use details::CaseDetails;
pub use extraction::{ExtractedFields, KeyDate};
pub(crate) use extraction::non_empty;
pub use message::{truncate_chars, AgentMessage};
pub use strategy::Strategy;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Parses backend timestamps, which arrive either as RFC 3339 or as naive
/// ISO-8601 in UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Treats an explicit JSON `null` like a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-03-01T10:15:30Z").is_some());
        assert!(parse_timestamp("2025-03-01T10:15:30+02:00").is_some());
        assert!(parse_timestamp("2025-03-01T10:15:30").is_some());
        assert!(parse_timestamp("2025-03-01T10:15:30.5").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
