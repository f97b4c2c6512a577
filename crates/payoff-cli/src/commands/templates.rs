//! Fallback template command implementations

use anyhow::{bail, Result};
use payoff_core::nudge::{TemplateGroup, FALLBACK_CTA};
use payoff_core::FallbackLibrary;

/// List every fallback template by group
pub fn cmd_templates_list() -> Result<()> {
    println!("Fallback Templates:\n");

    for group in TemplateGroup::all() {
        println!("[{}]", group.as_str());
        for template in group.templates() {
            println!("  - {}", template);
        }
        println!();
    }

    println!("Call to action: {}", FALLBACK_CTA);

    Ok(())
}

/// Fail if any template contains a number
pub fn cmd_templates_verify() -> Result<()> {
    let total = FallbackLibrary::all_templates().len();
    let issues = FallbackLibrary::verify_templates();

    if issues.is_empty() {
        println!("✅ All {} templates are number-free", total);
        return Ok(());
    }

    for issue in &issues {
        eprintln!(
            "❌ [{}] \"{}\" contains {}",
            issue.group.as_str(),
            issue.template,
            issue.tokens.join(", ")
        );
    }
    bail!("{} of {} templates contain numbers", issues.len(), total)
}
