//! Payoff CLI - Debt payoff planner
//!
//! Usage:
//!   payoff plan debts.json --strategy avalanche --extra 100
//!   payoff compare debts.json --extra 100
//!   payoff slip debts.json --budget 450
//!   payoff nudge debts.json --budget 450
//!   payoff templates verify

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Plan {
            file,
            strategy,
            extra,
            order,
            start,
            schedule,
            json,
        } => {
            let request = commands::plan_request(&file, strategy.as_deref(), extra, order)?;
            let start = commands::parse_start(start.as_deref())?;
            commands::cmd_plan(&request, &config, start, schedule, json)
        }
        Commands::Compare {
            file,
            extra,
            start,
            json,
        } => {
            let debts = commands::read_debts(&file)?;
            let start = commands::parse_start(start.as_deref())?;
            commands::cmd_compare(&debts, extra.unwrap_or_default(), &config, start, json)
        }
        Commands::Slip { file, budget, json } => {
            let debts = commands::read_debts(&file)?;
            commands::cmd_slip(&debts, budget, json)
        }
        Commands::Nudge {
            file,
            strategy,
            extra,
            budget,
            candidate,
            json,
        } => {
            let request = commands::plan_request(&file, strategy.as_deref(), extra, None)?;
            commands::cmd_nudge(&request, &config, budget, candidate.as_deref(), json).await
        }
        Commands::Templates { action } => match action {
            None | Some(TemplatesAction::List) => commands::cmd_templates_list(),
            Some(TemplatesAction::Verify) => commands::cmd_templates_verify(),
        },
        Commands::Backend => commands::cmd_backend_status().await,
        Commands::Config { path } => {
            if path {
                commands::cmd_config_path()
            } else {
                commands::cmd_config_show(&config, cli.config.as_deref())
            }
        }
    }
}
