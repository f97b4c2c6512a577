//! Nudge validation
//!
//! Every model reply walks the same states:
//!
//! ```text
//! Received -> Parsed -> NumericallyChecked -> Accepted
//!     \          \               \
//!      `----------`---------------`-------> Rejected
//! ```
//!
//! An accepted reply is shown verbatim with `source = "llm"`. Anything
//! else is replaced by a number-free template with `source = "fallback"`.
//! Rejection is a normal outcome, not an error, and there is no retry.
//!
//! A reply is accepted only if every numeric token in both the message and
//! the call-to-action canonicalizes to one of the facts in the [`FactSet`].

pub mod fallback;
pub mod parsing;

pub use fallback::{
    FallbackContext, FallbackLibrary, TemplateGroup, TemplateIssue, FALLBACK_CTA,
};
pub use parsing::{extract_numbers, parse_candidate, NumericToken, FALLBACK_SENTINEL};

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::facts::FactSet;
use crate::models::{NudgeCandidate, ValidatedNudge};

/// Validator states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    Received,
    Parsed,
    NumericallyChecked,
    Accepted,
    Rejected,
}

impl ValidationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Parsed => "parsed",
            Self::NumericallyChecked => "numerically_checked",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// Why a reply was replaced by a fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RejectReason {
    /// Not a single object with exactly `nudge` and `cta` strings
    Malformed(String),
    /// The model answered with the FALLBACK sentinel
    Sentinel,
    /// A number that is not one of the facts
    UnverifiedNumber(String),
    /// The backend call failed, timed out or was not configured
    Transport(String),
}

impl RejectReason {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::Sentinel => "sentinel",
            Self::UnverifiedNumber(_) => "unverified_number",
            Self::Transport(_) => "transport",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(detail) => write!(f, "malformed reply: {}", detail),
            Self::Sentinel => write!(f, "model declined to answer"),
            Self::UnverifiedNumber(token) => write!(f, "unverified number '{}'", token),
            Self::Transport(detail) => write!(f, "backend unavailable: {}", detail),
        }
    }
}

/// Outcome of validating one reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub nudge: ValidatedNudge,
    /// Terminal state, `Accepted` or `Rejected`
    pub state: ValidationState,
    pub rejection: Option<RejectReason>,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        self.state == ValidationState::Accepted
    }
}

/// Gatekeeper between model output and the user
#[derive(Debug)]
pub struct NudgeValidator {
    fallbacks: FallbackLibrary,
    max_nudge_chars: usize,
}

impl Default for NudgeValidator {
    fn default() -> Self {
        Self {
            fallbacks: FallbackLibrary::new(),
            max_nudge_chars: 300,
        }
    }
}

impl NudgeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the advisory length limit
    pub fn with_max_chars(mut self, max_nudge_chars: usize) -> Self {
        self.max_nudge_chars = max_nudge_chars;
        self
    }

    /// Validate a raw reply, using general fallback templates
    pub fn validate(&self, raw: &str, facts: &FactSet) -> Verdict {
        self.validate_with(raw, facts, &FallbackContext::default())
    }

    /// Validate a raw reply; `context` picks the fallback template
    pub fn validate_with(&self, raw: &str, facts: &FactSet, context: &FallbackContext) -> Verdict {
        transition(ValidationState::Received, raw.len());

        let candidate = match parsing::parse_candidate(raw) {
            Ok(candidate) => candidate,
            Err(detail) => return self.reject(RejectReason::Malformed(detail), context),
        };
        transition(ValidationState::Parsed, raw.len());

        if parsing::is_sentinel(&candidate) {
            return self.reject(RejectReason::Sentinel, context);
        }

        if let Some(token) = first_unverified(&candidate, facts) {
            return self.reject(RejectReason::UnverifiedNumber(token), context);
        }
        transition(ValidationState::NumericallyChecked, raw.len());

        let length = candidate.nudge.chars().count();
        if length > self.max_nudge_chars {
            warn!(
                length,
                limit = self.max_nudge_chars,
                "Accepted nudge exceeds recommended length"
            );
        }

        transition(ValidationState::Accepted, raw.len());
        Verdict {
            nudge: ValidatedNudge::from_llm(candidate),
            state: ValidationState::Accepted,
            rejection: None,
        }
    }

    /// Substitute a fallback nudge
    pub fn reject(&self, reason: RejectReason, context: &FallbackContext) -> Verdict {
        warn!(reason = reason.kind(), detail = %reason, "Nudge rejected, using fallback");
        debug!(state = ValidationState::Rejected.as_str(), "Validator transition");

        Verdict {
            nudge: ValidatedNudge::fallback(self.fallbacks.select(context), FALLBACK_CTA),
            state: ValidationState::Rejected,
            rejection: Some(reason),
        }
    }
}

fn transition(state: ValidationState, raw_len: usize) {
    debug!(state = state.as_str(), raw_len, "Validator transition");
}

/// First token in the nudge or cta that is not a fact
fn first_unverified(candidate: &NudgeCandidate, facts: &FactSet) -> Option<String> {
    [candidate.nudge.as_str(), candidate.cta.as_str()]
        .iter()
        .flat_map(|text| extract_numbers(text))
        .find(|token| match &token.canonical {
            Some(value) => !facts.contains(value),
            None => true,
        })
        .map(|token| token.raw)
}

/// Running totals over a batch of verdicts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationStats {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Rejections by reason kind
    pub reasons: BTreeMap<String, usize>,
}

impl ValidationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, verdict: &Verdict) {
        self.total += 1;
        match &verdict.rejection {
            None => self.accepted += 1,
            Some(reason) => {
                self.rejected += 1;
                *self.reasons.entry(reason.kind().to_string()).or_insert(0) += 1;
            }
        }
    }

    /// Percentage of accepted replies (0 when nothing was recorded)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.accepted as f64 / self.total as f64 * 100.0
        }
    }
}

impl<'a> FromIterator<&'a Verdict> for ValidationStats {
    fn from_iter<I: IntoIterator<Item = &'a Verdict>>(iter: I) -> Self {
        let mut stats = Self::new();
        for verdict in iter {
            stats.record(verdict);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NudgeSource, PaymentStrategy};
    use rust_decimal_macros::dec;

    fn facts(total: rust_decimal::Decimal) -> FactSet {
        FactSet::new(total, dec!(250), dec!(500), dec!(19.9), 4, dec!(100))
    }

    #[test]
    fn test_accepts_matching_numbers() {
        let verdict = NudgeValidator::new().validate(
            r#"{"nudge":"You have $5000 left, almost there!","cta":"Pay more"}"#,
            &facts(dec!(5000)),
        );
        assert!(verdict.is_accepted());
        assert_eq!(verdict.nudge.source, NudgeSource::Llm);
        assert!(verdict.nudge.validated);
        assert_eq!(verdict.nudge.nudge, "You have $5000 left, almost there!");
        assert_eq!(verdict.nudge.cta, "Pay more");
    }

    #[test]
    fn test_rejects_unknown_number() {
        let verdict = NudgeValidator::new().validate(
            r#"{"nudge":"You have $5000 left, almost there!","cta":"Pay more"}"#,
            &facts(dec!(4999)),
        );
        assert!(!verdict.is_accepted());
        assert_eq!(verdict.nudge.source, NudgeSource::Fallback);
        assert!(!verdict.nudge.validated);
        assert_eq!(verdict.nudge.cta, FALLBACK_CTA);
        assert_eq!(
            verdict.rejection,
            Some(RejectReason::UnverifiedNumber("$5000".into()))
        );
    }

    #[test]
    fn test_one_bad_number_rejects_whole_message() {
        let verdict = NudgeValidator::new().validate(
            r#"{"nudge":"Pay $100 extra and you'll clear $500 in 3 months","cta":"Go"}"#,
            &facts(dec!(5000)),
        );
        assert_eq!(
            verdict.rejection,
            Some(RejectReason::UnverifiedNumber("3".into()))
        );
    }

    #[test]
    fn test_qualitative_message_passes() {
        let verdict = NudgeValidator::new().validate(
            r#"{"nudge":"Great work staying on track!","cta":"See plan"}"#,
            &facts(dec!(5000)),
        );
        assert!(verdict.is_accepted());
    }

    #[test]
    fn test_rate_and_count_facts() {
        let verdict = NudgeValidator::new().validate(
            r#"{"nudge":"Your 19.9% card is gone in 4 months.","cta":"Keep going"}"#,
            &facts(dec!(5000)),
        );
        assert!(verdict.is_accepted());

        // A rate quoted without the percent sign is an amount, not the rate
        let verdict = NudgeValidator::new().validate(
            r#"{"nudge":"Your 19.9 APR card","cta":"Keep going"}"#,
            &facts(dec!(5000)),
        );
        assert!(!verdict.is_accepted());
    }

    #[test]
    fn test_cta_is_checked_too() {
        let verdict = NudgeValidator::new().validate(
            r#"{"nudge":"Nice progress!","cta":"Pay $75 now"}"#,
            &facts(dec!(5000)),
        );
        assert!(matches!(
            verdict.rejection,
            Some(RejectReason::UnverifiedNumber(_))
        ));
    }

    #[test]
    fn test_over_precise_number_rejected() {
        let verdict = NudgeValidator::new().validate(
            r#"{"nudge":"Only $5000.004 to go","cta":"Go"}"#,
            &facts(dec!(5000)),
        );
        assert!(!verdict.is_accepted());
    }

    #[test]
    fn test_fact_digits_inside_larger_token_rejected() {
        let f = facts(dec!(5000));
        for nudge in [
            "Only $5000k to go",
            "You owe -$5000",
            "About 5000x better",
            "Just 50,00 more",
            "Only 5 000 left",
            "Only $5\u{FF10}00 left",
            "Only \u{0665}\u{0660}\u{0660}\u{0660} left",
        ] {
            let raw = serde_json::json!({"nudge": nudge, "cta": "Go"}).to_string();
            let verdict = NudgeValidator::new().validate(&raw, &f);
            assert!(
                matches!(verdict.rejection, Some(RejectReason::UnverifiedNumber(_))),
                "accepted: {}",
                nudge
            );
            assert_eq!(verdict.nudge.source, NudgeSource::Fallback);
        }
    }

    #[test]
    fn test_sentinel_routes_to_fallback() {
        let verdict = NudgeValidator::new().validate(
            r#"{"nudge":"FALLBACK","cta":"FALLBACK"}"#,
            &facts(dec!(5000)),
        );
        assert_eq!(verdict.rejection, Some(RejectReason::Sentinel));
        assert_eq!(verdict.state, ValidationState::Rejected);
    }

    #[test]
    fn test_malformed_routes_to_fallback() {
        let verdict = NudgeValidator::new().validate("You owe $5000", &facts(dec!(5000)));
        assert!(matches!(verdict.rejection, Some(RejectReason::Malformed(_))));
        assert!(extract_numbers(&verdict.nudge.nudge).is_empty());
    }

    #[test]
    fn test_fallback_uses_context() {
        let context = FallbackContext::new(Some(PaymentStrategy::Snowball), None);
        let verdict =
            NudgeValidator::new().validate_with("garbage", &facts(dec!(5000)), &context);
        assert!(TemplateGroup::Snowball
            .templates()
            .contains(&verdict.nudge.nudge.as_str()));
    }

    #[test]
    fn test_long_nudge_still_accepted() {
        let long = "Keep going! ".repeat(40);
        let raw = serde_json::json!({"nudge": long, "cta": "Go"}).to_string();
        let verdict = NudgeValidator::new().with_max_chars(50).validate(&raw, &facts(dec!(1)));
        assert!(verdict.is_accepted());
    }

    #[test]
    fn test_stats() {
        let validator = NudgeValidator::new();
        let f = facts(dec!(5000));
        let verdicts = vec![
            validator.validate(r#"{"nudge":"Nice!","cta":"Go"}"#, &f),
            validator.validate(r#"{"nudge":"$1","cta":"Go"}"#, &f),
            validator.validate("nope", &f),
            validator.validate(r#"{"nudge":"$5000 left","cta":"Go"}"#, &f),
        ];
        let stats: ValidationStats = verdicts.iter().collect();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.rejected, 2);
        assert_eq!(stats.reasons.get("malformed"), Some(&1));
        assert_eq!(stats.reasons.get("unverified_number"), Some(&1));
        assert!((stats.success_rate() - 50.0).abs() < f64::EPSILON);
        assert_eq!(ValidationStats::new().success_rate(), 0.0);
    }
}
