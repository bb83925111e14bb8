//! Declarative rule conditions.
//!
//! Conditions are data, not code paths: most rules are expressed with the
//! built-in variants, and `Custom` covers the rare predicate that needs to
//! compute something. A missing optional context field never matches.

use std::fmt;

use crate::types::{
    AdaptationContext, FamilyContext, Holiday, Mood, Region, RuleEvaluationError, SocialSetting,
    SpiritualTradition, TimeOfDay, Weather,
};

/// Custom predicate over the context. Must be pure.
pub type ConditionFn = fn(&AdaptationContext) -> Result<bool, RuleEvaluationError>;

/// Wrapper giving custom predicates a `Debug` representation.
#[derive(Clone, Copy)]
pub struct CustomPredicate(pub ConditionFn);

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomPredicate(..)")
    }
}

/// Condition for rule matching.
#[derive(Debug, Clone)]
pub enum RuleCondition {
    /// Always matches
    Always,
    /// Matches a declared spiritual tradition
    Tradition(SpiritualTradition),
    /// Matches a home region
    Region(Region),
    /// Matches a household type
    Family(FamilyContext),
    /// Matches the current mood
    Mood(Mood),
    /// Matches any of the given moods
    MoodIn(Vec<Mood>),
    /// Matches a time-of-day bucket
    TimeOfDay(TimeOfDay),
    /// Matches any of the given buckets
    TimeOfDayIn(Vec<TimeOfDay>),
    /// Matches a specific holiday
    Holiday(Holiday),
    /// Matches any holiday
    AnyHoliday,
    /// Matches the current weather
    Weather(Weather),
    /// Matches the social setting
    SocialSetting(SocialSetting),
    /// Matches if completed sessions >= threshold
    SessionsAtLeast(u32),
    /// Matches if the current streak >= threshold
    StreakAtLeast(u32),
    /// Matches if total practiced minutes >= threshold
    MinutesAtLeast(u32),
    /// Matches if the practice appears in recent history
    PracticedRecently(String),
    /// Logical AND of conditions
    And(Vec<RuleCondition>),
    /// Logical OR of conditions
    Or(Vec<RuleCondition>),
    /// Negation
    Not(Box<RuleCondition>),
    /// Custom predicate
    Custom(CustomPredicate),
}

impl RuleCondition {
    /// Evaluate the condition against a context.
    pub fn evaluate(&self, context: &AdaptationContext) -> Result<bool, RuleEvaluationError> {
        let matched = match self {
            Self::Always => true,
            Self::Tradition(t) => context.cultural.spiritual_tradition == Some(*t),
            Self::Region(r) => context.cultural.region == Some(*r),
            Self::Family(f) => context.cultural.family_context == Some(*f),
            Self::Mood(m) => context.mood == Some(*m),
            Self::MoodIn(moods) => context.mood.map_or(false, |m| moods.contains(&m)),
            Self::TimeOfDay(t) => context.time_of_day == *t,
            Self::TimeOfDayIn(buckets) => buckets.contains(&context.time_of_day),
            Self::Holiday(h) => context.real_time.holiday == Some(*h),
            Self::AnyHoliday => context.real_time.holiday.is_some(),
            Self::Weather(w) => context.real_time.weather == Some(*w),
            Self::SocialSetting(s) => context.real_time.social_setting == Some(*s),
            Self::SessionsAtLeast(n) => context.history.completed_sessions >= *n,
            Self::StreakAtLeast(n) => context.history.current_streak_days >= *n,
            Self::MinutesAtLeast(n) => context.history.total_minutes >= *n,
            Self::PracticedRecently(practice) => context
                .history
                .recent_practices
                .iter()
                .any(|p| p == practice),
            Self::And(conditions) => {
                for condition in conditions {
                    if !condition.evaluate(context)? {
                        return Ok(false);
                    }
                }
                true
            }
            Self::Or(conditions) => {
                for condition in conditions {
                    if condition.evaluate(context)? {
                        return Ok(true);
                    }
                }
                false
            }
            Self::Not(inner) => !inner.evaluate(context)?,
            Self::Custom(predicate) => (predicate.0)(context)?,
        };

        Ok(matched)
    }

    /// Wrap a custom predicate.
    pub fn custom(predicate: ConditionFn) -> Self {
        Self::Custom(CustomPredicate(predicate))
    }

    /// Builder: AND of two conditions.
    pub fn and(self, other: RuleCondition) -> Self {
        match self {
            Self::And(mut conditions) => {
                conditions.push(other);
                Self::And(conditions)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Builder: negate a condition.
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing(_: &AdaptationContext) -> Result<bool, RuleEvaluationError> {
        Err(RuleEvaluationError::ConditionFailed("boom".to_string()))
    }

    #[test]
    fn test_missing_fields_do_not_match() {
        let context = AdaptationContext::at(TimeOfDay::Morning);

        assert!(!RuleCondition::Tradition(SpiritualTradition::Islam).evaluate(&context).unwrap());
        assert!(!RuleCondition::Mood(Mood::Calm).evaluate(&context).unwrap());
        assert!(!RuleCondition::MoodIn(vec![Mood::Sad, Mood::Tired]).evaluate(&context).unwrap());
        assert!(!RuleCondition::AnyHoliday.evaluate(&context).unwrap());
        assert!(!RuleCondition::Weather(Weather::Rainy).evaluate(&context).unwrap());
    }

    #[test]
    fn test_composite_conditions() {
        let context = AdaptationContext::at(TimeOfDay::Night)
            .with_tradition(SpiritualTradition::Hindu)
            .with_mood(Mood::Anxious);

        let condition = RuleCondition::Tradition(SpiritualTradition::Hindu)
            .and(RuleCondition::TimeOfDay(TimeOfDay::Night));
        assert!(condition.evaluate(&context).unwrap());

        let condition = RuleCondition::Or(vec![
            RuleCondition::Mood(Mood::Happy),
            RuleCondition::Mood(Mood::Anxious),
        ]);
        assert!(condition.evaluate(&context).unwrap());

        assert!(!RuleCondition::Always.negate().evaluate(&context).unwrap());
    }

    #[test]
    fn test_custom_failure_propagates() {
        let context = AdaptationContext::default();
        let condition = RuleCondition::Always.and(RuleCondition::custom(failing));
        assert!(condition.evaluate(&context).is_err());

        // Short-circuit skips the failing branch
        let condition = RuleCondition::Always.negate().and(RuleCondition::custom(failing));
        assert_eq!(condition.evaluate(&context), Ok(false));
    }
}
