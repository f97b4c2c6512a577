//! Configuration command implementations

use std::path::Path;

use anyhow::Result;
use payoff_core::config::default_config_path;
use payoff_core::PayoffConfig;

/// Show the effective configuration and where it came from
pub fn cmd_config_show(config: &PayoffConfig, explicit: Option<&Path>) -> Result<()> {
    let source = match (explicit, default_config_path()) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(path)) if path.exists() => path.display().to_string(),
        _ => "built-in defaults".to_string(),
    };

    println!("⚙️  Configuration ({})", source);
    println!();
    println!("[planner]");
    println!("  max_debts        {}", config.planner.max_debts);
    println!("  max_months       {}", config.planner.max_months);
    println!();
    println!("[coach]");
    println!("  timeout_secs     {}", config.coach.timeout.as_secs());
    println!("  temperature      {}", config.coach.temperature);
    println!("  max_tokens       {}", config.coach.max_tokens);
    println!("  max_nudge_chars  {}", config.coach.max_nudge_chars);
    println!();
    println!("LLM backend (environment):");
    for var in [
        "AI_BACKEND",
        "OLLAMA_HOST",
        "OLLAMA_MODEL",
        "OPENAI_COMPATIBLE_HOST",
        "OPENAI_COMPATIBLE_MODEL",
    ] {
        let value = std::env::var(var).unwrap_or_else(|_| "(not set)".to_string());
        println!("  {:<24} {}", var, value);
    }

    Ok(())
}

/// Show the path where a config override should be placed
pub fn cmd_config_path() -> Result<()> {
    match default_config_path() {
        Some(path) => {
            println!("{}", path.display());

            if !path.exists() {
                eprintln!();
                eprintln!("Note: This file does not exist yet.");
                eprintln!("Copy the defaults there to customize planner and coach settings.");
            }
        }
        None => {
            eprintln!("Could not determine config directory.");
            eprintln!("The data directory is not available on this system.");
        }
    }

    Ok(())
}
