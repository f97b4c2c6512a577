//! Nudge coach: facts -> prompt -> one model call -> validator
//!
//! ## Usage
//!
//! ```rust,ignore
//! let coach = NudgeCoach::from_env(config.coach.clone());
//! let verdict = coach.nudge(&plan, slip.as_ref()).await;
//! println!("{} [{}]", verdict.nudge.nudge, verdict.nudge.source);
//! ```
//!
//! The backend is called at most once per nudge. Transport errors, timeouts
//! and a missing backend all end in the fallback template; nothing here
//! returns an error to the caller.

use std::fmt::Write;
use std::time::Instant;

use tracing::{debug, info};

use crate::ai::{CoachBackend, CoachClient, GenerateOptions};
use crate::config::CoachSettings;
use crate::facts::{FactRegistry, FactSet};
use crate::models::{PayoffPlan, SlipResult};
use crate::nudge::{FallbackContext, NudgeValidator, RejectReason, Verdict, FALLBACK_SENTINEL};

pub struct NudgeCoach {
    backend: Option<CoachClient>,
    validator: NudgeValidator,
    settings: CoachSettings,
}

impl NudgeCoach {
    pub fn new(backend: Option<CoachClient>, settings: CoachSettings) -> Self {
        Self {
            validator: NudgeValidator::new().with_max_chars(settings.max_nudge_chars),
            backend,
            settings,
        }
    }

    /// Use the backend selected by `AI_BACKEND`, if any
    pub fn from_env(settings: CoachSettings) -> Self {
        Self::new(CoachClient::from_env(), settings)
    }

    pub fn backend(&self) -> Option<&CoachClient> {
        self.backend.as_ref()
    }

    pub fn validator(&self) -> &NudgeValidator {
        &self.validator
    }

    /// Generate a nudge for `plan`
    pub async fn nudge(&self, plan: &PayoffPlan, slip: Option<&SlipResult>) -> Verdict {
        let facts = FactRegistry::build(plan, slip);
        let context = FallbackContext::new(Some(plan.strategy), Some(plan.total_months));
        self.nudge_with_facts(&facts, &context).await
    }

    /// Generate a nudge constrained to `facts`
    pub async fn nudge_with_facts(&self, facts: &FactSet, context: &FallbackContext) -> Verdict {
        let Some(backend) = &self.backend else {
            return self
                .validator
                .reject(RejectReason::Transport("no LLM backend configured".into()), context);
        };

        let prompt = build_prompt(facts);
        let options = GenerateOptions::from(&self.settings);
        let started = Instant::now();

        debug!(backend = backend.kind(), model = backend.model(), "Requesting nudge");

        let raw = match tokio::time::timeout(self.settings.timeout, backend.generate(&prompt, &options)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                return self
                    .validator
                    .reject(RejectReason::Transport(e.to_string()), context);
            }
            Err(_) => {
                return self.validator.reject(
                    RejectReason::Transport(format!(
                        "timed out after {}s",
                        self.settings.timeout.as_secs_f32()
                    )),
                    context,
                );
            }
        };

        let verdict = self.validator.validate_with(&raw, facts, context);
        info!(
            backend = backend.kind(),
            source = verdict.nudge.source.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Nudge generated"
        );
        verdict
    }
}

/// Render the prompt for one nudge. Lists the only numbers the model may use.
pub fn build_prompt(facts: &FactSet) -> String {
    let mut prompt = String::from(
        "You are a supportive debt payoff coach. Write one short, encouraging message \
         (under 300 characters) and a short call-to-action label.\n\n\
         You may only use these numbers, written exactly as shown. Do not calculate, \
         round or invent any other number:\n",
    );

    for (fact, value) in facts.entries() {
        let _ = writeln!(prompt, "- {}: {}", fact.describe(), value);
    }

    let _ = write!(
        prompt,
        "\nRespond with only a JSON object of the form \
         {{\"nudge\": \"<message>\", \"cta\": \"<label>\"}}. \
         If you cannot write a message that follows these rules, respond with \
         {{\"nudge\": \"{0}\", \"cta\": \"{0}\"}}.",
        FALLBACK_SENTINEL
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::models::{NudgeSource, PaymentStrategy};
    use crate::nudge::TemplateGroup;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn facts() -> FactSet {
        FactSet::new(dec!(5000), dec!(250), dec!(500), dec!(20), 4, dec!(100))
    }

    fn context() -> FallbackContext {
        FallbackContext::new(Some(PaymentStrategy::Avalanche), Some(30))
    }

    fn coach(mock: MockBackend) -> NudgeCoach {
        NudgeCoach::new(Some(CoachClient::mock(mock)), CoachSettings::default())
    }

    #[test]
    fn test_prompt_lists_every_fact() {
        let prompt = build_prompt(&facts());
        assert!(prompt.contains("5000.00"));
        assert!(prompt.contains("20.0"));
        assert!(prompt.contains("4.00"));
        assert!(prompt.contains(r#"{"nudge": "FALLBACK", "cta": "FALLBACK"}"#));
    }

    #[tokio::test]
    async fn test_valid_reply_is_used() {
        let mock = MockBackend::with_response(
            r#"{"nudge":"Only $5,000 to go. You can do this!","cta":"Make a payment"}"#,
        );
        let verdict = coach(mock.clone()).nudge_with_facts(&facts(), &context()).await;

        assert!(verdict.is_accepted());
        assert_eq!(verdict.nudge.source, NudgeSource::Llm);
        assert_eq!(mock.calls(), 1);
        assert!(mock.last_prompt().unwrap().contains("5000.00"));
    }

    #[tokio::test]
    async fn test_invented_number_falls_back_without_retry() {
        let mock = MockBackend::with_response(
            r#"{"nudge":"Pay $137 more and save big!","cta":"Pay"}"#,
        );
        let verdict = coach(mock.clone()).nudge_with_facts(&facts(), &context()).await;

        assert_eq!(verdict.nudge.source, NudgeSource::Fallback);
        assert!(TemplateGroup::Avalanche
            .templates()
            .contains(&verdict.nudge.nudge.as_str()));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_backend_error_falls_back() {
        let verdict = coach(MockBackend::failing("connection refused"))
            .nudge_with_facts(&facts(), &context())
            .await;
        assert!(matches!(verdict.rejection, Some(RejectReason::Transport(_))));
        assert_eq!(verdict.nudge.source, NudgeSource::Fallback);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let settings = CoachSettings {
            timeout: Duration::from_millis(20),
            ..CoachSettings::default()
        };
        let mock = MockBackend::new().with_delay(Duration::from_secs(5));
        let verdict = NudgeCoach::new(Some(CoachClient::mock(mock)), settings)
            .nudge_with_facts(&facts(), &context())
            .await;
        match verdict.rejection {
            Some(RejectReason::Transport(detail)) => assert!(detail.contains("timed out")),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_backend_falls_back() {
        let verdict = NudgeCoach::new(None, CoachSettings::default())
            .nudge_with_facts(&facts(), &FallbackContext::default())
            .await;
        assert_eq!(verdict.nudge.source, NudgeSource::Fallback);
        assert!(TemplateGroup::General
            .templates()
            .contains(&verdict.nudge.nudge.as_str()));
    }
}
