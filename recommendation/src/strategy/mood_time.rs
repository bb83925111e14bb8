//! Mood and time-of-day recommendations.

use std::collections::HashSet;

use crate::config::MoodTimeConfig;
use crate::strategy::{by_rating_desc, ScoringInput, Strategy};
use crate::types::{ContentProfile, Recommendation, StrategyTag};

/// Recommends categories suited to the current mood and time of day.
#[derive(Debug, Clone)]
pub struct MoodTimeStrategy {
    config: MoodTimeConfig,
    limit: usize,
}

impl MoodTimeStrategy {
    pub fn new(config: MoodTimeConfig, limit: usize) -> Self {
        Self { config, limit }
    }

    fn pick<'a>(
        &self,
        items: &[&'a ContentProfile],
        categories: &[String],
        seen: &mut HashSet<&'a str>,
    ) -> Vec<&'a ContentProfile> {
        let mut eligible: Vec<_> = items
            .iter()
            .copied()
            .filter(|item| categories.contains(&item.category) && !seen.contains(item.id.as_str()))
            .collect();
        by_rating_desc(&mut eligible);
        for item in eligible.iter().copied() {
            seen.insert(item.id.as_str());
        }
        eligible
    }
}

impl Default for MoodTimeStrategy {
    fn default() -> Self {
        Self::new(MoodTimeConfig::default(), 10)
    }
}

impl Strategy for MoodTimeStrategy {
    fn name(&self) -> &str {
        "mood-time"
    }

    fn candidates(&self, input: &ScoringInput<'_>) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();
        let mut seen = HashSet::new();

        if let Some(mood) = input.request.mood {
            if let Some(categories) = self.config.mood_categories.get(&mood) {
                for item in self.pick(input.items, categories, &mut seen) {
                    recommendations.push(Recommendation::new(
                        item.id.clone(),
                        format!("Cocok untuk suasana hati Anda: {}", item.category),
                        self.config.confidence,
                        StrategyTag::Mood,
                    ));
                }
            }
        }

        let time = input
            .request
            .time_of_day
            .or(input.profile.most_active_time_of_day);
        if let Some(time) = time {
            if let Some(categories) = self.config.time_categories.get(&time) {
                for item in self.pick(input.items, categories, &mut seen) {
                    recommendations.push(Recommendation::new(
                        item.id.clone(),
                        format!("Pas untuk waktu {}", time.as_str()),
                        self.config.confidence,
                        StrategyTag::TimeBased,
                    ));
                }
            }
        }

        recommendations.truncate(self.limit);
        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, RecommendationRequest, UserPreferenceProfile};
    use adaptation::{Mood, TimeOfDay};

    fn catalog() -> Vec<ContentProfile> {
        vec![
            ContentProfile::new("sleep-1", "sleep", Difficulty::Pemula, 20),
            ContentProfile::new("breath-1", "breathing", Difficulty::Pemula, 5),
            ContentProfile::new("stress-1", "stress-relief", Difficulty::Menengah, 10),
        ]
    }

    #[test]
    fn test_request_time_takes_precedence() {
        let items = catalog();
        let refs: Vec<_> = items.iter().collect();
        let profile = UserPreferenceProfile {
            most_active_time_of_day: Some(TimeOfDay::Midday),
            ..Default::default()
        };
        let request = RecommendationRequest::new(10).at(TimeOfDay::Night);
        let input = ScoringInput {
            profile: &profile,
            items: &refs,
            request: &request,
        };

        let recommendations = MoodTimeStrategy::default().candidates(&input);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].content_id, "sleep-1");
        assert_eq!(recommendations[0].strategy, StrategyTag::TimeBased);
        assert_eq!(recommendations[0].confidence_score, 0.7);
    }

    #[test]
    fn test_profile_time_fallback_and_mood() {
        let items = catalog();
        let refs: Vec<_> = items.iter().collect();
        let profile = UserPreferenceProfile {
            most_active_time_of_day: Some(TimeOfDay::Midday),
            ..Default::default()
        };
        let request = RecommendationRequest::new(10).with_mood(Mood::Tired);
        let input = ScoringInput {
            profile: &profile,
            items: &refs,
            request: &request,
        };

        let recommendations = MoodTimeStrategy::default().candidates(&input);
        let tagged: Vec<_> = recommendations
            .iter()
            .map(|r| (r.content_id.as_str(), r.strategy))
            .collect();
        assert_eq!(
            tagged,
            [
                ("sleep-1", StrategyTag::Mood),
                ("breath-1", StrategyTag::TimeBased),
                ("stress-1", StrategyTag::TimeBased),
            ]
        );
    }

    #[test]
    fn test_no_signal_no_candidates() {
        let items = catalog();
        let refs: Vec<_> = items.iter().collect();
        let profile = UserPreferenceProfile::default();
        let request = RecommendationRequest::new(10);
        let input = ScoringInput {
            profile: &profile,
            items: &refs,
            request: &request,
        };
        assert!(MoodTimeStrategy::default().candidates(&input).is_empty());
    }
}
