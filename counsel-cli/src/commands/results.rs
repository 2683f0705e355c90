use clap::Args;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use counsel_core::results::{
    ARGUMENTS_HEADING, ARGUMENTS_INTRO, CONFLICTS_HEADING, CONFLICTS_INTRO,
    COUNTERARGUMENTS_HEADING, COUNTERARGUMENTS_INTRO, NO_ARGUMENTS, NO_CONFLICTS,
    NO_COUNTERARGUMENTS, REJECTED_HEADING, REJECTED_INTRO, RESULTS_SUBTITLE, RESULTS_TITLE,
    STRATEGY_HEADING, STRATEGY_RATIONALE_HEADING, SYNTHESIS_COMPLETE, SYNTHESIS_HEADING,
    SYNTHESIS_INTRO, SYNTHESIS_RATIONALE_HEADING,
};
use counsel_core::{CounselConfig, ResultsView};
use std::path::PathBuf;

use super::watch::resolve_case_id;
use crate::config::api_client;
use crate::output::{agent_label, heading, print_blocks, print_rationale, section};

#[derive(Args)]
pub struct ResultsArgs {
    #[arg(help = "Case ID (defaults to the most recently submitted case)")]
    case_id: Option<String>,

    #[arg(
        short,
        long,
        default_value = "text",
        help = "Output format (text, json)"
    )]
    format: String,

    #[arg(long, help = "Write the full case details as JSON to this file or directory")]
    export: Option<PathBuf>,
}

pub async fn handle_results_command(config: &CounselConfig, args: ResultsArgs) -> anyhow::Result<()> {
    let case_id = resolve_case_id(config, args.case_id)?;
    let client = api_client(config)?;
    let view = ResultsView::load(client.as_ref(), &case_id).await?;

    if let Some(target) = &args.export {
        let path = view.export_to(target).await?;
        eprintln!("{} Exported results to {}", "✓".green().bold(), path.display());
    }

    if args.format == "json" {
        println!("{}", view.to_json()?);
        return Ok(());
    }

    print_results(&view, config);
    Ok(())
}

pub fn print_results(view: &ResultsView, config: &CounselConfig) {
    let compact = config.display.compact;
    let header = view.header();

    heading(&header.title);
    if header.synthesis_complete {
        print!("{} {}", "✓".green().bold(), SYNTHESIS_COMPLETE.green());
        if let Some(completed) = header.completed_at {
            let local = completed.with_timezone(&chrono::Local);
            print!(
                "  {}",
                format!("Completed {}", local.format(&config.display.datetime_format)).dimmed()
            );
        }
        println!();
    }
    println!("{}", format!("Case ID: {}", header.case_id).dimmed());
    println!();
    println!("{}", RESULTS_TITLE.bold());
    if !compact {
        println!("{}", RESULTS_SUBTITLE.dimmed());
    }

    if let Some(panel) = view.strategy_panel() {
        section(STRATEGY_HEADING);
        if let Some(version) = panel.version {
            println!("    {}", format!("Version {}", version).dimmed());
        }
        println!();
        print_blocks(&panel.content, 4);
        if let Some(rationale) = &panel.rationale {
            println!();
            println!("    {}", STRATEGY_RATIONALE_HEADING.bold());
            print_rationale(rationale, 6);
        }
        println!();
        println!("    {}", format!("Strategy ID: {}", panel.strategy_id).dimmed());
    }

    section(ARGUMENTS_HEADING);
    let arguments = view.argument_cards();
    if arguments.is_empty() {
        println!("    {}", NO_ARGUMENTS.dimmed());
    } else {
        if !compact {
            println!("    {}", ARGUMENTS_INTRO.dimmed());
        }
        for card in arguments {
            println!();
            match &card.argument_type {
                Some(kind) => println!("    {} {}", agent_label(&card.agent), format!("[{}]", kind).dimmed()),
                None => println!("    {}", agent_label(&card.agent)),
            }
            print_blocks(&card.content, 6);
            if let Some(reasoning) = &card.reasoning {
                println!("      {} {}", "Reasoning:".bold(), reasoning.dimmed());
            }
        }
    }

    section(COUNTERARGUMENTS_HEADING);
    let counters = view.counterargument_cards();
    if counters.is_empty() {
        println!("    {}", NO_COUNTERARGUMENTS.dimmed());
    } else {
        if !compact {
            println!("    {}", COUNTERARGUMENTS_INTRO.dimmed());
        }
        for card in counters {
            println!();
            println!("    {} {}", agent_label(&card.agent), "[Attack]".red());
            print_blocks(&card.content, 6);
            if !card.attack_vectors.is_empty() {
                println!(
                    "      {} {}",
                    "Attack Vectors:".bold(),
                    card.attack_vectors.join(", ").red()
                );
            }
        }
    }

    section(CONFLICTS_HEADING);
    if view.conflicts().is_empty() {
        println!("    {}", NO_CONFLICTS.dimmed());
    } else {
        if !compact {
            println!("    {}", CONFLICTS_INTRO.dimmed());
        }
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Issue").fg(Color::White),
                Cell::new("Status").fg(Color::White),
                Cell::new("Agents Involved").fg(Color::White),
                Cell::new("Description").fg(Color::White),
            ]);
        for conflict in view.conflicts() {
            let status_color = if conflict.is_resolved() {
                Color::Green
            } else {
                Color::Yellow
            };
            table.add_row(vec![
                Cell::new(&conflict.issue),
                Cell::new(conflict.status_label()).fg(status_color),
                Cell::new(conflict.agents_involved.join(", ")),
                Cell::new(&conflict.description),
            ]);
        }
        println!("{table}");
    }

    if !compact {
        if let Some(strategy) = view.strategy_panel() {
            section(SYNTHESIS_HEADING);
            println!("    {}", SYNTHESIS_INTRO.dimmed());
            println!();
            print_blocks(&strategy.content, 4);
            if let Some(rationale) = &strategy.rationale {
                println!();
                println!("    {}", SYNTHESIS_RATIONALE_HEADING.bold());
                print_rationale(rationale, 6);
            }
        }
    }

    let rejected = view.rejected_alternatives();
    if !rejected.is_empty() {
        section(REJECTED_HEADING);
        if !compact {
            println!("    {}", REJECTED_INTRO.dimmed());
        }
        for (idx, alternative) in rejected.iter().enumerate() {
            println!("    {} {}", format!("{}.", idx + 1).dimmed(), alternative);
        }
    }

    println!();
    println!(
        "{}",
        "Analyze another case with 'counsel submit'.".dimmed()
    );
}
