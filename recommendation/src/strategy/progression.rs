//! Difficulty progression recommendations.

use crate::strategy::{by_rating_desc, ScoringInput, Strategy};
use crate::types::{Difficulty, Recommendation, StrategyTag, UserPreferenceProfile};

/// Recommends the next difficulty rung within familiar categories.
#[derive(Debug, Clone)]
pub struct ProgressionStrategy {
    confidence: f64,
    limit: usize,
}

impl ProgressionStrategy {
    pub fn new(confidence: f64, limit: usize) -> Self {
        Self { confidence, limit }
    }

    /// The rung above the highest preferred difficulty, if any.
    pub fn target_difficulty(profile: &UserPreferenceProfile) -> Option<Difficulty> {
        profile
            .preferred_difficulties
            .iter()
            .max()
            .and_then(Difficulty::next)
    }
}

impl Default for ProgressionStrategy {
    fn default() -> Self {
        Self::new(0.8, 10)
    }
}

impl Strategy for ProgressionStrategy {
    fn name(&self) -> &str {
        "progression"
    }

    fn candidates(&self, input: &ScoringInput<'_>) -> Vec<Recommendation> {
        let Some(target) = Self::target_difficulty(input.profile) else {
            return Vec::new();
        };

        let mut eligible: Vec<_> = input
            .items
            .iter()
            .copied()
            .filter(|item| {
                item.difficulty == target
                    && input.profile.preferred_categories.contains(&item.category)
            })
            .collect();
        by_rating_desc(&mut eligible);

        eligible
            .into_iter()
            .take(self.limit)
            .map(|item| {
                Recommendation::new(
                    item.id.clone(),
                    format!("Siap naik ke tingkat {}", target.as_str()),
                    self.confidence,
                    StrategyTag::Progression,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentProfile, RecommendationRequest};

    fn profile(difficulties: Vec<Difficulty>) -> UserPreferenceProfile {
        UserPreferenceProfile {
            preferred_categories: vec!["breathing".to_string()],
            preferred_difficulties: difficulties,
            ..Default::default()
        }
    }

    #[test]
    fn test_target_is_above_highest_rung() {
        let p = profile(vec![Difficulty::Menengah, Difficulty::Pemula]);
        assert_eq!(ProgressionStrategy::target_difficulty(&p), Some(Difficulty::Lanjutan));
        assert_eq!(
            ProgressionStrategy::target_difficulty(&profile(vec![Difficulty::Lanjutan])),
            None
        );
        assert_eq!(ProgressionStrategy::target_difficulty(&profile(vec![])), None);
    }

    #[test]
    fn test_restricted_to_preferred_categories() {
        let items = [
            ContentProfile::new("b2", "breathing", Difficulty::Menengah, 10).with_stats(0, 4.0),
            ContentProfile::new("s2", "sleep", Difficulty::Menengah, 10),
            ContentProfile::new("b1", "breathing", Difficulty::Pemula, 10),
            ContentProfile::new("b2-top", "breathing", Difficulty::Menengah, 15).with_stats(0, 4.8),
        ];
        let refs: Vec<_> = items.iter().collect();
        let p = profile(vec![Difficulty::Pemula]);
        let request = RecommendationRequest::new(10);
        let input = ScoringInput {
            profile: &p,
            items: &refs,
            request: &request,
        };

        let recommendations = ProgressionStrategy::default().candidates(&input);
        let ids: Vec<_> = recommendations.iter().map(|r| r.content_id.as_str()).collect();
        assert_eq!(ids, ["b2-top", "b2"]);
        assert!(recommendations.iter().all(|r| r.confidence_score == 0.8));
    }
}
