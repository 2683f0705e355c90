mod formatted;
mod rationale;

pub use formatted::{inline_spans, render_output, render_text, render_value, Block, Span};
pub use rationale::{render_rationale, section_title, RationaleNode, RationaleSection};
