//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config loading, debt files, dates)
//! - `plan` - Plan and compare commands
//! - `slip` - Budget slip check
//! - `nudge` - Coaching nudge and backend status commands
//! - `templates` - Fallback template listing and verification
//! - `config` - Effective configuration display

pub mod config;
pub mod core;
pub mod nudge;
pub mod plan;
pub mod slip;
pub mod templates;

// Re-export command functions for main.rs
pub use self::config::*;
pub use self::core::*;
pub use nudge::*;
pub use plan::*;
pub use slip::*;
pub use templates::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
