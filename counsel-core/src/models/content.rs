use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Agent-produced content, normalized at the deserialization boundary.
///
/// The backend sends either a plain string, an object wrapping a string
/// `content` field, or an arbitrary structured value. Everything downstream
/// works with this enum instead of re-checking the shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AgentOutput {
    Text(String),
    Structured(Value),
    #[default]
    Empty,
}

impl AgentOutput {
    pub fn from_value(value: Value) -> Self {
        let wrapped = value
            .as_object()
            .and_then(|map| map.get("content"))
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(text) = wrapped {
            return Self::from_text(text);
        }

        match value {
            Value::Null => AgentOutput::Empty,
            Value::String(s) => Self::from_text(s),
            other => AgentOutput::Structured(other),
        }
    }

    fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            AgentOutput::Empty
        } else {
            AgentOutput::Text(text)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AgentOutput::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AgentOutput::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text for display: the string itself, or pretty JSON for structured values.
    pub fn as_display_text(&self) -> String {
        match self {
            AgentOutput::Text(s) => s.clone(),
            AgentOutput::Structured(v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
            AgentOutput::Empty => String::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            AgentOutput::Text(s) => Value::String(s.clone()),
            AgentOutput::Structured(v) => v.clone(),
            AgentOutput::Empty => Value::Null,
        }
    }
}

impl From<&str> for AgentOutput {
    fn from(s: &str) -> Self {
        AgentOutput::from_value(Value::String(s.to_string()))
    }
}

impl From<String> for AgentOutput {
    fn from(s: String) -> Self {
        AgentOutput::from_value(Value::String(s))
    }
}

impl Serialize for AgentOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AgentOutput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(AgentOutput::from_value(value))
    }
}
