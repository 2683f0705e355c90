use colored::{Color, ColoredString, Colorize};
use counsel_core::models::{AgentName, AgentStatus};
use counsel_core::{Block, RationaleNode, Span};

pub fn agent_color(agent: &str) -> Color {
    match agent.parse::<AgentName>() {
        Ok(AgentName::Harvey) => Color::Blue,
        Ok(AgentName::Louis) => Color::Yellow,
        Ok(AgentName::Tanner) => Color::Red,
        Ok(AgentName::Jessica) => Color::Green,
        Err(_) => Color::White,
    }
}

pub fn agent_table_color(agent: AgentName) -> comfy_table::Color {
    match agent {
        AgentName::Harvey => comfy_table::Color::Blue,
        AgentName::Louis => comfy_table::Color::Yellow,
        AgentName::Tanner => comfy_table::Color::Red,
        AgentName::Jessica => comfy_table::Color::Green,
    }
}

pub fn agent_label(agent: &str) -> ColoredString {
    agent.color(agent_color(agent)).bold()
}

pub fn status_icon(status: AgentStatus) -> ColoredString {
    match status {
        AgentStatus::Pending => "○".dimmed(),
        AgentStatus::Thinking => "◐".yellow(),
        AgentStatus::Complete => "✓".green(),
    }
}

pub fn status_label(status: AgentStatus) -> &'static str {
    match status {
        AgentStatus::Pending => "Pending",
        AgentStatus::Thinking => "Thinking",
        AgentStatus::Complete => "Complete",
    }
}

pub fn heading(title: &str) {
    println!("{}", title.cyan().bold());
    println!("{}", "═".repeat(50).dimmed());
}

pub fn section(title: &str) {
    println!();
    println!("  {}", title.yellow().bold());
}

pub fn format_spans(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Span::Plain(s) => s.normal().to_string(),
            Span::Bold(s) => s.bold().to_string(),
            Span::Italic(s) => s.italic().to_string(),
            Span::Code(s) => s.cyan().to_string(),
        })
        .collect()
}

/// Terminal lines for rendered content, blank line between blocks.
pub fn format_blocks(blocks: &[Block], indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    let mut lines = Vec::new();

    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        match block {
            Block::Paragraph(spans) => lines.push(format!("{}{}", pad, format_spans(spans))),
            Block::List { ordered, items } => {
                for (n, item) in items.iter().enumerate() {
                    let marker = if *ordered {
                        format!("{}.", n + 1)
                    } else {
                        "•".to_string()
                    };
                    lines.push(format!("{}{} {}", pad, marker, format_spans(item)));
                }
            }
        }
    }

    lines
}

pub fn print_blocks(blocks: &[Block], indent: usize) {
    for line in format_blocks(blocks, indent) {
        println!("{}", line);
    }
}

pub fn format_rationale(node: &RationaleNode, indent: usize) -> Vec<String> {
    let pad = " ".repeat(indent);
    match node {
        RationaleNode::Content(blocks) => format_blocks(blocks, indent),
        RationaleNode::Text(text) => vec![format!("{}{}", pad, text)],
        RationaleNode::Scalar(value) => vec![format!("{}{}", pad, value.dimmed())],
        RationaleNode::Empty => Vec::new(),
        RationaleNode::List(items) => {
            let mut lines = Vec::new();
            for item in items {
                match item {
                    RationaleNode::Text(text) => lines.push(format!("{}• {}", pad, text)),
                    RationaleNode::Scalar(value) => {
                        lines.push(format!("{}• {}", pad, value.dimmed()))
                    }
                    nested => {
                        lines.push(format!("{}•", pad));
                        lines.extend(format_rationale(nested, indent + 2));
                    }
                }
            }
            lines
        }
        RationaleNode::Sections(sections) => {
            let mut lines = Vec::new();
            for section in sections {
                lines.push(format!("{}{}", pad, format!("{}:", section.title).bold()));
                lines.extend(format_rationale(&section.body, indent + 2));
            }
            lines
        }
    }
}

pub fn print_rationale(node: &RationaleNode, indent: usize) {
    for line in format_rationale(node, indent) {
        println!("{}", line);
    }
}
