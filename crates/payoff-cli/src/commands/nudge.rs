//! Nudge and backend command implementations

use anyhow::{Context, Result};
use payoff_core::{
    CoachBackend, CoachClient, FactRegistry, FallbackContext, NudgeCoach, NudgeValidator,
    PayoffConfig, PlanRequest, SlipDetector, Verdict,
};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::resolve_plan;

/// Produce a nudge for the plan described by `request`.
///
/// With `candidate`, that reply is validated offline; otherwise the
/// configured backend is asked once.
pub async fn cmd_nudge(
    request: &PlanRequest,
    config: &PayoffConfig,
    budget: Option<Decimal>,
    candidate: Option<&str>,
    json: bool,
) -> Result<()> {
    let verdict = nudge_verdict(request, config, budget, candidate).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict.nudge)?);
        return Ok(());
    }

    println!("💬 {}", verdict.nudge.nudge);
    println!("   👉 {}", verdict.nudge.cta);
    println!();
    println!("   Source: {}", verdict.nudge.source);
    if let Some(ref reason) = verdict.rejection {
        println!("   Rejected: {}", reason);
    }

    Ok(())
}

/// Build the plan, facts and verdict for a nudge request
pub async fn nudge_verdict(
    request: &PlanRequest,
    config: &PayoffConfig,
    budget: Option<Decimal>,
    candidate: Option<&str>,
) -> Result<Verdict> {
    let plan = resolve_plan(request, config, None)?;
    let slip = budget
        .map(|b| SlipDetector::new().check(&request.debts, b))
        .transpose()
        .context("Failed to check budget")?;

    let verdict = if let Some(raw) = candidate {
        let facts = FactRegistry::build(&plan, slip.as_ref());
        let context = FallbackContext::new(Some(plan.strategy), Some(plan.total_months));
        let validator = NudgeValidator::new().with_max_chars(config.coach.max_nudge_chars);
        validator.validate_with(raw, &facts, &context)
    } else {
        let coach = NudgeCoach::from_env(config.coach.clone());
        if coach.backend().is_none() {
            println!("   💡 Tip: Set OLLAMA_HOST (or AI_BACKEND) for personalized nudges");
        }
        coach.nudge(&plan, slip.as_ref()).await
    };

    match verdict.rejection {
        Some(ref reason) => warn!(
            reason = reason.kind(),
            detail = %reason,
            "Nudge replaced with a template"
        ),
        None => info!(source = %verdict.nudge.source, "Nudge accepted"),
    }

    Ok(verdict)
}

/// Check the LLM backend selected by the environment
pub async fn cmd_backend_status() -> Result<()> {
    println!("🔍 Checking LLM backend...\n");

    let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());
    println!("  AI_BACKEND: {}", backend);

    let Some(client) = CoachClient::from_env() else {
        println!("  ⚠️  No backend configured");
        println!();
        println!("To set up Ollama:");
        println!("  1. Install Ollama: https://ollama.ai/download");
        println!("  2. Start the server: ollama serve");
        println!("  3. Set environment variable: export OLLAMA_HOST=http://localhost:11434");
        println!();
        println!("Nudges will use the built-in templates until a backend is available.");
        return Ok(());
    };

    println!("  Kind:  {}", client.kind());
    println!("  Host:  {}", client.host());
    println!("  Model: {}", client.model());
    println!();

    print!("Checking availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        warn!(host = client.host(), "LLM backend health check failed");
        println!("❌ Failed");
        println!();
        println!("⚠️  Could not reach {}", client.host());
        println!("Nudges will use the built-in templates until the backend responds.");
    }

    Ok(())
}
