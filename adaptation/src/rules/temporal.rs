//! Time-of-day rules.

use crate::condition::RuleCondition;
use crate::rules::{RuleGroup, RuleProvider};
use crate::types::{
    AdaptationContext, AdaptationPatch, AdaptationRule, FieldValue, RuleEvaluationError, TimeOfDay,
};

/// Provider for time-of-day rules.
pub struct TemporalRules;

fn morning_greeting(context: &AdaptationContext) -> Result<FieldValue, RuleEvaluationError> {
    let streak = context.history.current_streak_days;
    let text = if streak > 1 {
        format!("Selamat pagi! Hari ke-{streak} berturut-turut")
    } else {
        "Selamat pagi! Awali hari dengan napas yang tenang".to_string()
    };
    Ok(FieldValue::Text(text))
}

impl RuleProvider for TemporalRules {
    fn group(&self) -> RuleGroup {
        RuleGroup::Temporal
    }

    fn rules(&self) -> Vec<AdaptationRule> {
        vec![
            AdaptationRule::new(
                "subuh-stillness",
                7,
                RuleCondition::TimeOfDay(TimeOfDay::EarlyMorning),
            )
            .describe("Quiet, low-light sessions before sunrise")
            .with_patch(
                AdaptationPatch::new()
                    .ui("theme", "dawn")
                    .content("session_focus", "stillness"),
            ),
            AdaptationRule::new(
                "morning-energy-adaptation",
                6,
                RuleCondition::TimeOfDay(TimeOfDay::Morning),
            )
            .describe("Energizing sessions and a bright theme in the morning")
            .with_patch(
                AdaptationPatch::new()
                    .ui("theme", "bright")
                    .content("language", "casual-id")
                    .content("session_focus", "energy")
                    .derived_content("greeting", morning_greeting),
            ),
            AdaptationRule::new(
                "midday-reset",
                5,
                RuleCondition::TimeOfDay(TimeOfDay::Midday),
            )
            .describe("Short reset sessions around lunch")
            .with_patch(
                AdaptationPatch::new()
                    .content("session_focus", "reset")
                    .behavior("default_duration_minutes", 5.0),
            ),
            AdaptationRule::new(
                "evening-wind-down",
                5,
                RuleCondition::TimeOfDayIn(vec![TimeOfDay::Afternoon, TimeOfDay::Evening]),
            )
            .describe("Gratitude and wind-down practice after work")
            .with_patch(
                AdaptationPatch::new()
                    .ui("theme", "dusk")
                    .content("session_focus", "gratitude"),
            ),
            AdaptationRule::new(
                "night-sleep-preparation",
                6,
                RuleCondition::TimeOfDay(TimeOfDay::Night),
            )
            .describe("Sleep preparation with a dark theme at night")
            .with_patch(
                AdaptationPatch::new()
                    .ui("theme", "dark")
                    .content("session_focus", "sleep")
                    .behavior("dim_screen", true)
                    .behavior("autoplay_sleep_sounds", true),
            ),
        ]
    }
}
