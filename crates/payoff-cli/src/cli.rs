//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

/// Payoff - Plan your way out of debt
#[derive(Parser)]
#[command(name = "payoff")]
#[command(about = "Debt payoff planner with a fact-checked coach", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the platform data directory, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a payoff plan
    ///
    /// FILE holds either a JSON array of debts or a plan request object:
    /// {"debts": [...], "strategy": "avalanche", "extra_payment": 100}
    Plan {
        /// JSON file with the debts
        file: PathBuf,

        /// Strategy: snowball, avalanche, custom, compare (overrides the file)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Extra amount paid each month on top of the minimums
        #[arg(short, long)]
        extra: Option<Decimal>,

        /// Debt ids (or names) in payoff order, comma separated. Implies --strategy custom
        #[arg(long, value_delimiter = ',')]
        order: Option<Vec<String>>,

        /// First payment month (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        start: Option<String>,

        /// Print the month-by-month totals
        #[arg(long)]
        schedule: bool,

        /// Output the full plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare snowball and avalanche side by side
    Compare {
        /// JSON file with the debts
        file: PathBuf,

        /// Extra amount paid each month on top of the minimums
        #[arg(short, long)]
        extra: Option<Decimal>,

        /// First payment month (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        start: Option<String>,

        /// Output the comparison summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a monthly budget covers every minimum payment
    Slip {
        /// JSON file with the debts
        file: PathBuf,

        /// Monthly budget available for debt payments
        #[arg(short, long)]
        budget: Decimal,

        /// Output the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Produce a coaching nudge for a plan
    ///
    /// With --candidate the given model reply is validated against the plan's
    /// facts. Otherwise the configured LLM backend (AI_BACKEND, OLLAMA_HOST, ...)
    /// is asked once; any failure falls back to a built-in template.
    Nudge {
        /// JSON file with the debts
        file: PathBuf,

        /// Strategy: snowball, avalanche, custom, compare (overrides the file)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Extra amount paid each month on top of the minimums
        #[arg(short, long)]
        extra: Option<Decimal>,

        /// Monthly budget, for slip-aware facts
        #[arg(short, long)]
        budget: Option<Decimal>,

        /// Raw model reply to validate instead of calling a backend
        #[arg(long)]
        candidate: Option<String>,

        /// Output the nudge as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fallback nudge templates
    Templates {
        #[command(subcommand)]
        action: Option<TemplatesAction>,
    },

    /// Check the configured LLM backend
    Backend,

    /// Show the effective configuration
    Config {
        /// Print only the override path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Subcommand)]
pub enum TemplatesAction {
    /// List every template by group
    List,
    /// Check that no template contains a number
    Verify,
}
