//! Mood rules.

use crate::condition::RuleCondition;
use crate::rules::{RuleGroup, RuleProvider};
use crate::types::{AdaptationPatch, AdaptationRule, Mood};

/// Provider for mood rules.
pub struct MoodRules;

impl RuleProvider for MoodRules {
    fn group(&self) -> RuleGroup {
        RuleGroup::Mood
    }

    fn rules(&self) -> Vec<AdaptationRule> {
        vec![
            AdaptationRule::new(
                "stress-relief-priority",
                8,
                RuleCondition::MoodIn(vec![Mood::Stressed, Mood::Anxious]),
            )
            .describe("Leads with short breathing work when stressed or anxious")
            .with_patch(
                AdaptationPatch::new()
                    .ui("show_sos_button", true)
                    .content("session_focus", "breathing")
                    .behavior("default_duration_minutes", 5.0),
            ),
            AdaptationRule::new("low-mood-compassion", 7, RuleCondition::Mood(Mood::Sad))
                .describe("Gentle self-compassion practice on low days")
                .with_patch(
                    AdaptationPatch::new()
                        .content("session_focus", "self-compassion")
                        .content("tone", "gentle"),
                ),
            AdaptationRule::new("fatigue-rest", 6, RuleCondition::Mood(Mood::Tired))
                .describe("Restorative body scan when tired")
                .with_patch(
                    AdaptationPatch::new()
                        .content("session_focus", "rest")
                        .behavior("default_duration_minutes", 10.0),
                ),
        ]
    }
}
