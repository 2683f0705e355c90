use anyhow::Context;
use clap::Args;
use counsel_core::{render_rationale, render_value};
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use crate::output::{print_blocks, print_rationale};

#[derive(Args)]
pub struct RenderArgs {
    #[arg(help = "File to render (reads stdin when omitted)")]
    file: Option<PathBuf>,

    #[arg(long, help = "Lay the input out as a strategy rationale")]
    rationale: bool,
}

pub async fn handle_render_command(args: RenderArgs) -> anyhow::Result<()> {
    let raw = match &args.file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read stdin")?;
            buf
        }
    };

    let value = parse_input(&raw);

    if args.rationale {
        if let Some(node) = render_rationale(&value) {
            print_rationale(&node, 0);
        }
        return Ok(());
    }

    print_blocks(&render_value(&value), 0);
    Ok(())
}

/// JSON documents are rendered as values; anything else is plain text.
fn parse_input(raw: &str) -> Value {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') || trimmed.starts_with('"') {
        if let Ok(value) = serde_json::from_str::<Value>(raw) {
            return value;
        }
    }
    Value::String(raw.to_string())
}
