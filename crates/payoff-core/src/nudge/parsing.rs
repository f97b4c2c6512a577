//! Parsing helpers for LLM nudge replies
//!
//! The reply must be exactly one JSON object with two non-empty string
//! fields, `nudge` and `cta`. Surrounding prose, code fences or extra
//! fields make it malformed.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::NudgeCandidate;
use crate::money::{Canonical, NumberKind};

/// Value both fields carry when the model declines to answer
pub const FALLBACK_SENTINEL: &str = "FALLBACK";

/// Integers, decimals, grouped thousands, currency-prefixed amounts and
/// percentages. Group 2 is the number, group 3 the percent sign. Digits are
/// ASCII only; any other numeral is reported on its own.
const NUMBER_PATTERN: &str =
    r"(\$\s?)?((?:[0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)(?:\.[0-9]+)?|\.[0-9]+)(\s?%)?";

/// Characters that continue a number when a digit follows them
const GROUP_SEPARATORS: [char; 8] = [',', '.', ' ', '\'', '_', '\u{00A0}', '\u{202F}', '\u{2009}'];

/// Characters that turn a number into a signed one
const SIGNS: [char; 3] = ['-', '+', '\u{2212}'];

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NUMBER_PATTERN).expect("valid regex"))
}

/// Parse a raw reply into a candidate, or describe why it is malformed
pub fn parse_candidate(raw: &str) -> std::result::Result<NudgeCandidate, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty response".into());
    }
    if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
        return Err(format!("not a single JSON object | Raw: {}", truncate(trimmed, 200)));
    }

    let candidate: NudgeCandidate = serde_json::from_str(trimmed)
        .map_err(|e| format!("invalid nudge JSON: {} | Raw: {}", e, truncate(trimmed, 200)))?;

    if candidate.nudge.trim().is_empty() {
        return Err("nudge text is empty".into());
    }
    if candidate.cta.trim().is_empty() {
        return Err("cta label is empty".into());
    }

    Ok(candidate)
}

/// Whether the candidate is the explicit "cannot answer safely" signal
pub fn is_sentinel(candidate: &NudgeCandidate) -> bool {
    candidate.nudge == FALLBACK_SENTINEL && candidate.cta == FALLBACK_SENTINEL
}

/// A number found in free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericToken {
    /// Matched text, including any `$` or `%`
    pub raw: String,
    pub kind: NumberKind,
    /// `None` when the token does not read as a single canonical number:
    /// too many fraction digits, glued to letters or a sign, split by an
    /// odd separator, or written with non-ASCII numerals
    pub canonical: Option<Canonical>,
}

/// Extract every numeric token from `text`, in order of appearance
pub fn extract_numbers(text: &str) -> Vec<NumericToken> {
    let mut tokens: Vec<(usize, NumericToken)> = number_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(2)?.as_str();
            let kind = if caps.get(3).is_some() {
                NumberKind::Rate
            } else {
                NumberKind::Amount
            };
            let canonical = if is_isolated(text, whole.start(), whole.end()) {
                Canonical::parse(number, kind)
            } else {
                None
            };
            Some((
                whole.start(),
                NumericToken {
                    raw: whole.as_str().trim().to_string(),
                    kind,
                    canonical,
                },
            ))
        })
        .collect();

    tokens.extend(
        text.char_indices()
            .filter(|(_, c)| c.is_numeric() && !c.is_ascii_digit())
            .map(|(at, c)| {
                (
                    at,
                    NumericToken {
                        raw: c.to_string(),
                        kind: NumberKind::Amount,
                        canonical: None,
                    },
                )
            }),
    );

    tokens.sort_by_key(|(at, _)| *at);
    tokens.into_iter().map(|(_, token)| token).collect()
}

/// Whether the match at `start..end` stands alone as one number.
///
/// A token touching a letter or digit, carrying a sign, or sitting next to
/// a separator that continues into more digits is part of something larger.
fn is_isolated(text: &str, start: usize, end: usize) -> bool {
    let mut before = text[..start].chars().rev();
    match before.next() {
        Some(c) if c.is_alphanumeric() || SIGNS.contains(&c) => return false,
        Some(c) if GROUP_SEPARATORS.contains(&c) => {
            if before.next().is_some_and(char::is_numeric) {
                return false;
            }
        }
        _ => {}
    }

    let mut after = text[end..].chars();
    match after.next() {
        Some(c) if c.is_alphanumeric() => false,
        Some(c) if GROUP_SEPARATORS.contains(&c) => !after.next().is_some_and(char::is_numeric),
        _ => true,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candidate() {
        let candidate = parse_candidate(r#"  {"nudge": "Keep going", "cta": "Pay now"} "#).unwrap();
        assert_eq!(candidate.nudge, "Keep going");
        assert_eq!(candidate.cta, "Pay now");
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        let bad = [
            "",
            "Keep going!",
            r#"Sure! {"nudge": "Hi", "cta": "Go"}"#,
            r#"{"nudge": "Hi"}"#,
            r#"{"nudge": "Hi", "cta": "Go", "note": "x"}"#,
            r#"{"nudge": 5, "cta": "Go"}"#,
            r#"{"nudge": "  ", "cta": "Go"}"#,
            r#"{"nudge": "Hi", "cta": "Go"} {"nudge": "Hi", "cta": "Go"}"#,
            r#"[{"nudge": "Hi", "cta": "Go"}]"#,
        ];
        for raw in bad {
            assert!(parse_candidate(raw).is_err(), "accepted: {}", raw);
        }
    }

    #[test]
    fn test_sentinel() {
        let candidate = parse_candidate(r#"{"nudge":"FALLBACK","cta":"FALLBACK"}"#).unwrap();
        assert!(is_sentinel(&candidate));

        let partial = parse_candidate(r#"{"nudge":"FALLBACK","cta":"Go"}"#).unwrap();
        assert!(!is_sentinel(&partial));
    }

    #[test]
    fn test_extract_amounts() {
        let tokens = extract_numbers("You have $5,000.00 left and pay 250 a month for 6 months");
        let canon: Vec<&str> = tokens
            .iter()
            .map(|t| t.canonical.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(canon, vec!["5000.00", "250.00", "6.00"]);
        assert!(tokens.iter().all(|t| t.kind == NumberKind::Amount));
        assert_eq!(tokens[0].raw, "$5,000.00");
    }

    #[test]
    fn test_extract_percentages() {
        let tokens = extract_numbers("That card charges 24.9% and the loan 6 %");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, NumberKind::Rate);
        assert_eq!(tokens[0].canonical.as_ref().unwrap().as_str(), "24.9");
        assert_eq!(tokens[1].canonical.as_ref().unwrap().as_str(), "6.0");
    }

    #[test]
    fn test_sentence_final_period_is_not_a_decimal() {
        let tokens = extract_numbers("Only $500.");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].canonical.as_ref().unwrap().as_str(), "500.00");
    }

    #[test]
    fn test_over_precise_token_has_no_canonical_form() {
        let tokens = extract_numbers("about 4999.999 dollars");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].canonical.is_none());
    }

    #[test]
    fn test_separated_sentence_numbers_are_canonical() {
        let tokens = extract_numbers("Pay $250, then $5,000.00 left. 20% done");
        let canon: Vec<&str> = tokens
            .iter()
            .map(|t| t.canonical.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(canon, vec!["250.00", "5000.00", "20.0"]);
    }

    #[test]
    fn test_glued_tokens_are_not_canonical() {
        for text in [
            "$5000k left",
            "-$5000 owed",
            "+20% more",
            "about 1e4 total",
            "4x faster",
            "US$5000 owed",
            "v2 of the plan",
            "3rd card",
        ] {
            let tokens = extract_numbers(text);
            assert!(!tokens.is_empty(), "no tokens in {}", text);
            assert!(
                tokens.iter().any(|t| t.canonical.is_none()),
                "accepted glued token in {}",
                text
            );
        }
    }

    #[test]
    fn test_odd_grouping_is_not_canonical() {
        for text in ["only 50,00 left", "only 5 000 left", "only 5'000 left", "only 5_000 left", "1.2.3"] {
            let tokens = extract_numbers(text);
            assert!(
                tokens.iter().any(|t| t.canonical.is_none()),
                "accepted split number in {}",
                text
            );
        }
    }

    #[test]
    fn test_non_ascii_numerals_are_reported() {
        // Fullwidth five between ASCII digits
        let tokens = extract_numbers("Only $5\u{FF15}000 to go");
        assert!(tokens.iter().all(|t| t.canonical.is_none()));
        assert!(tokens.iter().any(|t| t.raw == "\u{FF15}"));

        // Arabic-Indic digits alone
        let tokens = extract_numbers("Only \u{0665}\u{0660}\u{0660} left");
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|t| t.canonical.is_none()));

        // Order of appearance is kept when both kinds mix
        let tokens = extract_numbers("12 then \u{0665} then 7");
        let raw: Vec<&str> = tokens.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(raw, vec!["12", "\u{0665}", "7"]);
    }

    #[test]
    fn test_no_numbers() {
        assert!(extract_numbers("Stay the course, you're doing great!").is_empty());
    }
}
