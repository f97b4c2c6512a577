//! Planner and coach configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/payoff/config.toml on Linux)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Backend selection (host, model, API key) is read from the environment
//! instead; see [`crate::ai`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::amortization::MAX_MONTHS;
use crate::error::{Error, Result};
use crate::planner::MAX_DEBTS;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../config/defaults.toml");

/// Limits applied by the payoff calculator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannerSettings {
    pub max_debts: usize,
    pub max_months: u32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_debts: MAX_DEBTS,
            max_months: MAX_MONTHS,
        }
    }
}

/// Settings for nudge generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachSettings {
    /// Budget for the single backend call
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Advisory length limit for accepted nudges
    pub max_nudge_chars: usize,
}

impl Default for CoachSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            temperature: 0.7,
            max_tokens: 200,
            max_nudge_chars: 300,
        }
    }
}

/// Effective configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PayoffConfig {
    pub planner: PlannerSettings,
    pub coach: CoachSettings,
}

impl PayoffConfig {
    /// Load from the default override location, else embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit file. A missing or unreadable file is an
    /// [`Error::Io`].
    pub fn from_path(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Embedded defaults only
    pub fn defaults() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("payoff").join("config.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<PayoffConfig> {
    let path = match override_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    };

    let content = match path {
        Some(path) => fs::read_to_string(&path)?,
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    planner: Option<RawPlanner>,
    coach: Option<RawCoach>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPlanner {
    max_debts: Option<usize>,
    max_months: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCoach {
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_nudge_chars: Option<usize>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<PayoffConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = PayoffConfig::default();

    if let Some(planner) = raw.planner {
        if let Some(max_debts) = planner.max_debts {
            config.planner.max_debts = max_debts;
        }
        if let Some(max_months) = planner.max_months {
            config.planner.max_months = max_months;
        }
    }

    if let Some(coach) = raw.coach {
        if let Some(timeout) = coach.timeout_secs {
            config.coach.timeout = Duration::from_secs(timeout);
        }
        if let Some(temperature) = coach.temperature {
            config.coach.temperature = temperature;
        }
        if let Some(max_tokens) = coach.max_tokens {
            config.coach.max_tokens = max_tokens;
        }
        if let Some(max_chars) = coach.max_nudge_chars {
            config.coach.max_nudge_chars = max_chars;
        }
    }

    if config.planner.max_debts == 0 {
        return Err(Error::Config("planner.max_debts must be at least 1".into()));
    }
    if config.planner.max_months == 0 || config.planner.max_months > MAX_MONTHS {
        return Err(Error::Config(format!(
            "planner.max_months must be between 1 and {}",
            MAX_MONTHS
        )));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_defaults() {
        let config = PayoffConfig::defaults().unwrap();
        assert_eq!(config, PayoffConfig::default());
        assert_eq!(config.planner.max_debts, 10);
        assert_eq!(config.planner.max_months, 1200);
        assert_eq!(config.coach.timeout, Duration::from_secs(10));
        assert_eq!(config.coach.max_nudge_chars, 300);
    }

    #[test]
    fn test_partial_override() {
        let config = parse_config("[coach]\ntimeout_secs = 3\n").unwrap();
        assert_eq!(config.coach.timeout, Duration::from_secs(3));
        assert_eq!(config.coach.max_tokens, 200);
        assert_eq!(config.planner, PlannerSettings::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse_config("[planner]\nmax_debts = 0\n").is_err());
        assert!(parse_config("[planner]\nmax_months = 5000\n").is_err());
        assert!(parse_config("[planner]\nunknown = 1\n").is_err());
        assert!(parse_config("not toml [").is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[planner]\nmax_debts = 4").unwrap();
        let config = PayoffConfig::from_path(file.path()).unwrap();
        assert_eq!(config.planner.max_debts, 4);
    }

    #[test]
    fn test_missing_explicit_path() {
        let err = PayoffConfig::from_path(Path::new("/nonexistent/payoff.toml")).unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected IO error, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PayoffConfig::from_path(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
