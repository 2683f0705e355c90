#![allow(
    dead_code,
    unused_imports,
    unused_variables,
    clippy::too_many_arguments,
    clippy::needless_borrows_for_generic_args,
    clippy::useless_format,
    clippy::field_reassign_with_default
)]

use clap::{Parser, Subcommand};
use colored::Colorize;
use counsel_core::{CliErrorDisplay, CounselConfig, CounselError};
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{
    handle_render_command, handle_results_command, handle_submit_command, handle_watch_command,
    RenderArgs, ResultsArgs, SubmitArgs, WatchArgs,
};
use config::load_config;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "counsel")]
#[command(version = VERSION)]
#[command(about = "Counsel - terminal client for the Legal Strategy Council")]
#[command(long_about = r#"
Counsel submits a legal case to the Legal Strategy Council backend, where four
agents deliberate over it: Harvey (Lead Trial Strategist), Louis (Precedent &
Case Law Expert), Tanner (Adversarial Counsel) and Jessica (Managing Partner).

Use 'counsel submit --file complaint.pdf' to start a case, 'counsel watch' to
follow the live analysis and 'counsel results' to read the final strategy.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(
        long,
        global = true,
        help = "Backend base URL (overrides COUNSEL_API_URL and config files)"
    )]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Upload documents, review the extracted case and submit it")]
    Submit(SubmitArgs),

    #[command(about = "Follow a running analysis live")]
    Watch(WatchArgs),

    #[command(about = "Show the final strategy and detailed analysis of a case")]
    Results(ResultsArgs),

    #[command(about = "Render agent-formatted text or JSON from a file or stdin")]
    Render(RenderArgs),

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<CounselError>() {
                Some(err) => {
                    err.log();
                    eprintln!("{}", CliErrorDisplay::new(err));
                }
                None => eprintln!("{}: {:#}", "Error".red().bold(), e),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, config: Option<&CounselConfig>) {
    let default_level = match config {
        _ if verbose => "debug",
        Some(config) => config.log_level(),
        None => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let json = config.is_some_and(|c| c.logging.json_format);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let needs_backend = !matches!(cli.command, Commands::Render(_) | Commands::Version { .. });
    if !needs_backend {
        init_logging(cli.verbose, None);
        return match cli.command {
            Commands::Render(args) => handle_render_command(args).await,
            Commands::Version { detailed } => cmd_version(detailed),
            _ => Ok(()),
        };
    }

    let config = load_config(cli.api_url.as_deref())?;
    init_logging(cli.verbose, Some(&config));

    match cli.command {
        Commands::Submit(args) => handle_submit_command(&config, args).await,
        Commands::Watch(args) => handle_watch_command(&config, args).await,
        Commands::Results(args) => handle_results_command(&config, args).await,
        Commands::Render(_) | Commands::Version { .. } => Ok(()),
    }
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "Counsel Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!();
        println!("  {}", "Council Agents:".bold());
        for agent in counsel_core::AgentName::ALL {
            println!(
                "    {} {}",
                output::agent_label(&agent.to_string()),
                agent.role().dimmed()
            );
        }
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("counsel {}", VERSION);
    }

    Ok(())
}
