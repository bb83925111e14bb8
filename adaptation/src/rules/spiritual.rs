//! Spiritual tradition rules.
//!
//! These carry the highest priorities: a user's tradition shapes language,
//! greetings and the practice track more than anything else.

use crate::condition::RuleCondition;
use crate::rules::{RuleGroup, RuleProvider};
use crate::types::{
    AdaptationContext, AdaptationPatch, AdaptationRule, FieldValue, RuleEvaluationError,
    SpiritualTradition, TimeOfDay,
};

/// Provider for spiritual tradition rules.
pub struct SpiritualRules;

fn islamic_greeting(context: &AdaptationContext) -> Result<FieldValue, RuleEvaluationError> {
    let salutation = match context.time_of_day {
        TimeOfDay::EarlyMorning => "Assalamualaikum, semoga subuh ini membawa ketenangan",
        TimeOfDay::Morning => "Assalamualaikum, selamat pagi",
        TimeOfDay::Midday => "Assalamualaikum, selamat siang",
        TimeOfDay::Afternoon => "Assalamualaikum, selamat sore",
        TimeOfDay::Evening | TimeOfDay::Night => "Assalamualaikum, selamat malam",
    };
    Ok(FieldValue::from(salutation))
}

impl RuleProvider for SpiritualRules {
    fn group(&self) -> RuleGroup {
        RuleGroup::Spiritual
    }

    fn rules(&self) -> Vec<AdaptationRule> {
        vec![
            AdaptationRule::new(
                "islamic-prayer-integration",
                10,
                RuleCondition::Tradition(SpiritualTradition::Islam),
            )
            .describe("Aligns sessions with the five daily prayers")
            .with_patch(
                AdaptationPatch::new()
                    .ui("show_prayer_times", true)
                    .content("language", "formal-id")
                    .content("tradition_track", "dzikir")
                    .derived_content("greeting", islamic_greeting)
                    .behavior("pause_for_adhan", true),
            ),
            AdaptationRule::new(
                "christian-reflection",
                9,
                RuleCondition::Or(vec![
                    RuleCondition::Tradition(SpiritualTradition::Kristen),
                    RuleCondition::Tradition(SpiritualTradition::Katolik),
                ]),
            )
            .describe("Offers contemplative prayer and scripture reflection")
            .with_patch(
                AdaptationPatch::new()
                    .content("language", "formal-id")
                    .content("tradition_track", "christian-contemplation")
                    .content("greeting", "Salam damai sejahtera"),
            ),
            AdaptationRule::new(
                "hindu-dharana-practice",
                9,
                RuleCondition::Tradition(SpiritualTradition::Hindu),
            )
            .describe("Uses dharana practice with gamelan ambience")
            .with_patch(
                AdaptationPatch::new()
                    .ui("ambient_sound", "gamelan")
                    .content("tradition_track", "dharana")
                    .content("greeting", "Om Swastiastu"),
            ),
            AdaptationRule::new(
                "buddhist-vipassana",
                9,
                RuleCondition::Tradition(SpiritualTradition::Buddha),
            )
            .describe("Centers sessions on vipassana insight practice")
            .with_patch(
                AdaptationPatch::new()
                    .content("tradition_track", "vipassana")
                    .content("greeting", "Namo Buddhaya"),
            ),
            AdaptationRule::new(
                "kejawen-rasa",
                8,
                RuleCondition::Tradition(SpiritualTradition::Kejawen),
            )
            .describe("Frames practice around Javanese rasa and eling")
            .with_patch(
                AdaptationPatch::new()
                    .content("language", "krama-jv")
                    .content("tradition_track", "rasa-sejati")
                    .content("greeting", "Sugeng rawuh"),
            ),
            AdaptationRule::new(
                "secular-neutral",
                7,
                RuleCondition::Tradition(SpiritualTradition::Secular),
            )
            .describe("Keeps language free of religious references")
            .with_patch(
                AdaptationPatch::new()
                    .content("language", "casual-id")
                    .content("tradition_track", "secular-mindfulness"),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_islamic_greeting_follows_time_bucket() {
        let context = AdaptationContext::at(TimeOfDay::Evening);
        assert_eq!(
            islamic_greeting(&context).unwrap().as_str(),
            Some("Assalamualaikum, selamat malam")
        );
    }

    #[test]
    fn test_every_rule_has_a_description() {
        for rule in SpiritualRules.rules() {
            assert!(!rule.description.is_empty(), "{} has no description", rule.id);
        }
    }
}
