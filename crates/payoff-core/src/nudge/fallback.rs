//! Number-free fallback nudges
//!
//! Used whenever a model reply is rejected. Templates are grouped by
//! strategy, by how far the user is from being debt-free, and a general
//! pool. Selection prefers the strategy group, then the progress group,
//! and rotates round-robin inside the chosen group.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use super::parsing::extract_numbers;
use crate::models::PaymentStrategy;

/// Call-to-action label shown with every fallback nudge
pub const FALLBACK_CTA: &str = "Review your plan";

const SNOWBALL: &[&str] = &[
    "Knock out your smallest balance first. Every quick win makes the next one easier.",
    "Your snowball is rolling. Each debt you clear frees up more for the next.",
    "Small victories add up. Keep your focus on the debt at the top of your list.",
];

const AVALANCHE: &[&str] = &[
    "Going after your highest rate first means less of each payment goes to interest.",
    "Your avalanche plan keeps expensive interest in check. Stay with it!",
    "Every payment on your costliest debt is money you keep later. Smart move.",
];

const EARLY: &[&str] = &[
    "Starting is the hardest part, and you've already done it.",
    "You're building habits that will carry you all the way. Keep showing up.",
    "A long road is walked one payment at a time. You're on your way.",
];

const MIDDLE: &[&str] = &[
    "You're in the middle stretch now. This is where steady effort pays off.",
    "Momentum is on your side. Keep making those payments count.",
    "You've come a long way already. Don't let up now.",
];

const LATE: &[&str] = &[
    "The finish line is in sight. Keep going!",
    "You're close to being debt-free. Stay focused for the final stretch.",
    "All your hard work is about to pay off. Finish strong!",
];

const GENERAL: &[&str] = &[
    "Every payment brings you closer to financial freedom.",
    "Consistency wins. Stay with your plan and you'll get there.",
    "You're taking control of your money. That's worth celebrating.",
    "Remember why you started. You've got this!",
];

/// Template group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateGroup {
    Snowball,
    Avalanche,
    Early,
    Middle,
    Late,
    General,
}

impl TemplateGroup {
    pub fn all() -> &'static [TemplateGroup] {
        &[
            Self::Snowball,
            Self::Avalanche,
            Self::Early,
            Self::Middle,
            Self::Late,
            Self::General,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snowball => "snowball",
            Self::Avalanche => "avalanche",
            Self::Early => "early",
            Self::Middle => "middle",
            Self::Late => "late",
            Self::General => "general",
        }
    }

    pub fn templates(&self) -> &'static [&'static str] {
        match self {
            Self::Snowball => SNOWBALL,
            Self::Avalanche => AVALANCHE,
            Self::Early => EARLY,
            Self::Middle => MIDDLE,
            Self::Late => LATE,
            Self::General => GENERAL,
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Snowball => 0,
            Self::Avalanche => 1,
            Self::Early => 2,
            Self::Middle => 3,
            Self::Late => 4,
            Self::General => 5,
        }
    }

    /// Progress stage from months left: late within a year (including a
    /// plan that is already finished), middle within three years, early
    /// otherwise
    pub fn for_months_remaining(months: u32) -> Self {
        match months {
            0..=12 => Self::Late,
            13..=36 => Self::Middle,
            _ => Self::Early,
        }
    }
}

/// What the selector knows about the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FallbackContext {
    pub strategy: Option<PaymentStrategy>,
    pub months_remaining: Option<u32>,
}

impl FallbackContext {
    pub fn new(strategy: Option<PaymentStrategy>, months_remaining: Option<u32>) -> Self {
        Self {
            strategy,
            months_remaining,
        }
    }

    /// Group to draw from
    pub fn group(&self) -> TemplateGroup {
        match self.strategy {
            Some(PaymentStrategy::Snowball) => TemplateGroup::Snowball,
            Some(PaymentStrategy::Avalanche) => TemplateGroup::Avalanche,
            _ => self
                .months_remaining
                .map(TemplateGroup::for_months_remaining)
                .unwrap_or(TemplateGroup::General),
        }
    }
}

/// A template that failed the number-free check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateIssue {
    pub group: TemplateGroup,
    pub template: String,
    pub tokens: Vec<String>,
}

/// Round-robin selector over the fixed template groups
#[derive(Debug, Default)]
pub struct FallbackLibrary {
    cursors: [AtomicUsize; 6],
}

impl FallbackLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next template for `context`
    pub fn select(&self, context: &FallbackContext) -> &'static str {
        self.next_in(context.group())
    }

    /// Next template from a specific group
    pub fn next_in(&self, group: TemplateGroup) -> &'static str {
        let templates = group.templates();
        let n = self.cursors[group.index()].fetch_add(1, Ordering::Relaxed);
        templates[n % templates.len()]
    }

    /// Every template with its group
    pub fn all_templates() -> Vec<(TemplateGroup, &'static str)> {
        TemplateGroup::all()
            .iter()
            .flat_map(|g| g.templates().iter().map(move |t| (*g, *t)))
            .chain(std::iter::once((TemplateGroup::General, FALLBACK_CTA)))
            .collect()
    }

    /// Run every template (and the CTA) through the numeric extractor.
    /// An empty result means the library is safe to show unvalidated.
    pub fn verify_templates() -> Vec<TemplateIssue> {
        Self::all_templates()
            .into_iter()
            .filter_map(|(group, template)| {
                let tokens = extract_numbers(template);
                if tokens.is_empty() {
                    None
                } else {
                    Some(TemplateIssue {
                        group,
                        template: template.to_string(),
                        tokens: tokens.into_iter().map(|t| t.raw).collect(),
                    })
                }
            })
            .collect()
    }
}
