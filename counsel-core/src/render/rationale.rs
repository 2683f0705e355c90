use serde_json::Value;

use super::formatted::{render_text, Block};

/// A strategy rationale laid out as nested titled sections.
#[derive(Debug, Clone, PartialEq)]
pub enum RationaleNode {
    /// Top-level string rationale, run through the content renderer.
    Content(Vec<Block>),
    Text(String),
    /// A number or boolean.
    Scalar(String),
    List(Vec<RationaleNode>),
    Sections(Vec<RationaleSection>),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RationaleSection {
    pub title: String,
    pub body: RationaleNode,
}

/// Builds the rationale tree, or `None` when there is nothing to show.
pub fn render_rationale(value: &Value) -> Option<RationaleNode> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(RationaleNode::Content(render_text(s))),
        other => Some(node(other)),
    }
}

fn node(value: &Value) -> RationaleNode {
    match value {
        Value::Null => RationaleNode::Empty,
        Value::String(s) => RationaleNode::Text(s.clone()),
        Value::Number(n) => RationaleNode::Scalar(n.to_string()),
        Value::Bool(b) => RationaleNode::Scalar(b.to_string()),
        Value::Array(items) => RationaleNode::List(items.iter().map(node).collect()),
        Value::Object(map) => RationaleNode::Sections(
            map.iter()
                .map(|(key, body)| RationaleSection {
                    title: section_title(key),
                    body: node(body),
                })
                .collect(),
        ),
    }
}

/// `risk_assessment` -> `Risk Assessment`
pub fn section_title(key: &str) -> String {
    key.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
