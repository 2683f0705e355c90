use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the inter-agent transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub message: Value,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl AgentMessage {
    /// Message body as text: strings as-is, then a `content` or `message`
    /// field, then pretty JSON.
    pub fn text(&self) -> String {
        match &self.message {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            Value::Object(map) => map
                .get("content")
                .or_else(|| map.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| pretty(&self.message)),
            other => pretty(other),
        }
    }

    /// Text cut to `max_chars` characters with a trailing `...` when longer.
    pub fn preview(&self, max_chars: usize) -> String {
        truncate_chars(&self.text(), max_chars)
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
