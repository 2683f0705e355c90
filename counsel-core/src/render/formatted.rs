use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::models::AgentOutput;

static PARAGRAPH_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("valid paragraph break regex"));
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*•]\s+").expect("valid bullet regex"));
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("valid numbered item regex"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.+?)`").expect("valid code regex"));

/// An inline run of text with at most one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Plain(String),
    Bold(String),
    Italic(String),
    Code(String),
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Span::Plain(s) | Span::Bold(s) | Span::Italic(s) | Span::Code(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Span>),
    List { ordered: bool, items: Vec<Vec<Span>> },
}

impl Block {
    /// The block's text with all markup removed.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(spans) => join_spans(spans),
            Block::List { items, .. } => items
                .iter()
                .map(|item| join_spans(item))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn join_spans(spans: &[Span]) -> String {
    spans.iter().map(Span::text).collect()
}

fn is_list_line(line: &str) -> bool {
    BULLET_RE.is_match(line) || NUMBERED_RE.is_match(line)
}

fn strip_marker(line: &str) -> &str {
    if let Some(m) = BULLET_RE.find(line) {
        return &line[m.end()..];
    }
    if let Some(m) = NUMBERED_RE.find(line) {
        return &line[m.end()..];
    }
    line
}

/// Renders lightly marked-up agent text into paragraphs and lists.
///
/// Paragraphs are separated by blank lines. A paragraph with any line that
/// starts with a bullet (`-`, `*`, `•`) or a number (`1.`) becomes a list
/// made of only those lines; it is ordered when any line is numbered.
/// Other paragraphs have their lines joined with single spaces.
pub fn render_text(text: &str) -> Vec<Block> {
    PARAGRAPH_BREAK_RE
        .split(text)
        .filter(|para| !para.trim().is_empty())
        .map(|para| {
            let lines: Vec<&str> = para
                .split('\n')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect();

            if lines.iter().any(|l| is_list_line(l)) {
                let ordered = lines.iter().any(|l| NUMBERED_RE.is_match(l));
                let items = lines
                    .iter()
                    .filter(|l| is_list_line(l))
                    .map(|l| inline_spans(strip_marker(l)))
                    .collect();
                Block::List { ordered, items }
            } else {
                Block::Paragraph(inline_spans(&lines.join(" ")))
            }
        })
        .collect()
}

/// Renders any backend value. Strings and `{content: "..."}` objects render
/// as text; other structured values are pretty-printed first.
pub fn render_value(value: &Value) -> Vec<Block> {
    render_output(&AgentOutput::from_value(value.clone()))
}

pub fn render_output(output: &AgentOutput) -> Vec<Block> {
    match output {
        AgentOutput::Empty => Vec::new(),
        AgentOutput::Text(s) => render_text(s),
        AgentOutput::Structured(_) => render_text(&output.as_display_text()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    Bold,
    Italic,
    Code,
}

#[derive(Debug, Clone, Copy)]
struct Claim {
    start: usize,
    end: usize,
    content: (usize, usize),
    kind: SpanKind,
}

impl Claim {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && self.end > start
    }
}

/// Single-asterisk emphasis: `*x*` where neither delimiter touches another
/// asterisk and the content holds no asterisk.
fn italic_ranges(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'*' && (i == 0 || bytes[i - 1] != b'*') {
            if let Some(offset) = bytes[i + 1..].iter().position(|&b| b == b'*') {
                let close = i + 1 + offset;
                if offset > 0 && bytes.get(close + 1) != Some(&b'*') {
                    found.push((i, close + 1));
                    i = close + 1;
                    continue;
                }
            }
        }
        i += 1;
    }

    found
}

/// Splits one line of text into styled spans. Bold wins over code, and
/// both win over italic, whenever their ranges intersect.
pub fn inline_spans(text: &str) -> Vec<Span> {
    let mut claims: Vec<Claim> = Vec::new();

    for caps in BOLD_RE.captures_iter(text) {
        if let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) {
            claims.push(Claim {
                start: whole.start(),
                end: whole.end(),
                content: (inner.start(), inner.end()),
                kind: SpanKind::Bold,
            });
        }
    }

    for caps in CODE_RE.captures_iter(text) {
        if let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) {
            if claims.iter().any(|c| c.overlaps(whole.start(), whole.end())) {
                continue;
            }
            claims.push(Claim {
                start: whole.start(),
                end: whole.end(),
                content: (inner.start(), inner.end()),
                kind: SpanKind::Code,
            });
        }
    }

    for (start, end) in italic_ranges(text) {
        if claims.iter().any(|c| c.overlaps(start, end)) {
            continue;
        }
        claims.push(Claim {
            start,
            end,
            content: (start + 1, end - 1),
            kind: SpanKind::Italic,
        });
    }

    claims.sort_by_key(|c| c.start);

    let mut spans = Vec::with_capacity(claims.len() * 2 + 1);
    let mut cursor = 0;
    for claim in claims {
        if claim.start > cursor {
            spans.push(Span::Plain(text[cursor..claim.start].to_string()));
        }
        let inner = text[claim.content.0..claim.content.1].to_string();
        spans.push(match claim.kind {
            SpanKind::Bold => Span::Bold(inner),
            SpanKind::Italic => Span::Italic(inner),
            SpanKind::Code => Span::Code(inner),
        });
        cursor = claim.end;
    }
    if cursor < text.len() {
        spans.push(Span::Plain(text[cursor..].to_string()));
    }

    spans
}
