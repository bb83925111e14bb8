//! Family, social setting, holiday and weather rules.

use crate::condition::RuleCondition;
use crate::rules::{RuleGroup, RuleProvider};
use crate::types::{
    AdaptationContext, AdaptationPatch, AdaptationRule, FamilyContext, FieldValue, Holiday,
    RuleEvaluationError, SocialSetting, SpiritualTradition, Weather,
};

/// Provider for social and real-time rules.
pub struct SocialRules;

fn holiday_greeting(context: &AdaptationContext) -> Result<FieldValue, RuleEvaluationError> {
    let holiday = context
        .real_time
        .holiday
        .ok_or_else(|| RuleEvaluationError::DerivationFailed {
            field: "greeting".to_string(),
            reason: "no holiday in context".to_string(),
        })?;

    let text = match holiday {
        Holiday::Ramadan => "Marhaban ya Ramadan",
        Holiday::IdulFitri => "Selamat Idul Fitri, mohon maaf lahir dan batin",
        Holiday::Nyepi => "Selamat Hari Raya Nyepi",
        Holiday::Natal => "Selamat Natal",
        Holiday::Waisak => "Selamat Hari Waisak",
        Holiday::Imlek => "Gong Xi Fa Cai",
        Holiday::HariKemerdekaan => "Dirgahayu Republik Indonesia",
    };
    Ok(FieldValue::from(text))
}

impl RuleProvider for SocialRules {
    fn group(&self) -> RuleGroup {
        RuleGroup::Social
    }

    fn rules(&self) -> Vec<AdaptationRule> {
        vec![
            AdaptationRule::new(
                "ramadan-mode",
                11,
                RuleCondition::Holiday(Holiday::Ramadan)
                    .and(RuleCondition::Tradition(SpiritualTradition::Islam)),
            )
            .describe("Sahur and tarawih friendly sessions during Ramadan")
            .with_patch(
                AdaptationPatch::new()
                    .content("session_focus", "ramadan-reflection")
                    .behavior("suggest_sahur_session", true)
                    .behavior("default_duration_minutes", 7.0),
            ),
            AdaptationRule::new("holiday-greeting", 8, RuleCondition::AnyHoliday)
                .describe("Greets the user for national and religious holidays")
                .with_patch(
                    AdaptationPatch::new()
                        .ui("festive_banner", true)
                        .derived_content("greeting", holiday_greeting),
                ),
            AdaptationRule::new(
                "public-discreet-mode",
                6,
                RuleCondition::SocialSetting(SocialSetting::Public),
            )
            .describe("Audio-only, discreet sessions in public places")
            .with_patch(
                AdaptationPatch::new()
                    .ui("discreet_mode", true)
                    .behavior("audio_only", true),
            ),
            AdaptationRule::new(
                "workplace-micro-break",
                5,
                RuleCondition::SocialSetting(SocialSetting::Workplace),
            )
            .describe("Three-minute breaks at work")
            .with_patch(AdaptationPatch::new().behavior("default_duration_minutes", 3.0)),
            AdaptationRule::new(
                "family-group-session",
                4,
                RuleCondition::Or(vec![
                    RuleCondition::Family(FamilyContext::NuclearFamily),
                    RuleCondition::Family(FamilyContext::ExtendedFamily),
                ])
                .and(RuleCondition::SocialSetting(SocialSetting::WithFamily)),
            )
            .describe("Suggests practicing together with the family")
            .with_patch(
                AdaptationPatch::new()
                    .content("session_focus", "family-harmony")
                    .behavior("suggest_group_session", true),
            ),
            AdaptationRule::new("rainy-day-ambience", 3, RuleCondition::Weather(Weather::Rainy))
                .describe("Rain ambience on rainy days")
                .with_patch(AdaptationPatch::new().ui("ambient_sound", "hujan")),
            AdaptationRule::new("hot-weather-cooling", 3, RuleCondition::Weather(Weather::Hot))
                .describe("Cooling breath on hot days")
                .with_patch(AdaptationPatch::new().content("breath_technique", "sitali")),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holiday_greeting_requires_holiday() {
        let context = AdaptationContext::default();
        assert!(holiday_greeting(&context).is_err());

        let context = AdaptationContext::default().with_holiday(Holiday::Nyepi);
        assert_eq!(
            holiday_greeting(&context).unwrap().as_str(),
            Some("Selamat Hari Raya Nyepi")
        );
    }

    #[test]
    fn test_family_session_needs_family_setting() {
        let rule = SocialRules
            .rules()
            .into_iter()
            .find(|r| r.id == "family-group-session")
            .unwrap();

        let at_home = AdaptationContext::default()
            .with_family(FamilyContext::ExtendedFamily)
            .with_social_setting(SocialSetting::WithFamily);
        assert!(rule.condition.evaluate(&at_home).unwrap());

        let alone = AdaptationContext::default()
            .with_family(FamilyContext::ExtendedFamily)
            .with_social_setting(SocialSetting::Alone);
        assert!(!rule.condition.evaluate(&alone).unwrap());
    }
}
