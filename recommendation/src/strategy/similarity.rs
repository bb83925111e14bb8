//! Preference-similarity recommendations.

use crate::config::SimilarityConfig;
use crate::strategy::{by_confidence_desc, ScoringInput, Strategy};
use crate::types::{clamp_unit, ContentProfile, Recommendation, StrategyTag, UserPreferenceProfile};

/// Recommends content sharing features with the user's preferences.
#[derive(Debug, Clone)]
pub struct SimilarityStrategy {
    config: SimilarityConfig,
    limit: usize,
}

impl SimilarityStrategy {
    pub fn new(config: SimilarityConfig, limit: usize) -> Self {
        Self { config, limit }
    }

    /// Weighted sum of matching features, clamped to 0..1.
    pub fn score(&self, profile: &UserPreferenceProfile, item: &ContentProfile) -> f64 {
        let c = &self.config;
        let mut score = 0.0;

        if profile.preferred_categories.contains(&item.category) {
            score += c.category_weight;
        }
        if profile.preferred_difficulties.contains(&item.difficulty) {
            score += c.difficulty_weight;
        }
        if profile.preferred_durations.contains(&item.duration_minutes) {
            score += c.duration_weight;
        }
        if let Some(instructor) = &item.instructor_id {
            if profile.preferred_instructors.contains(instructor) {
                score += c.instructor_weight;
            }
        }

        clamp_unit(score)
    }
}

impl Default for SimilarityStrategy {
    fn default() -> Self {
        Self::new(SimilarityConfig::default(), 10)
    }
}

impl Strategy for SimilarityStrategy {
    fn name(&self) -> &str {
        "similarity"
    }

    fn candidates(&self, input: &ScoringInput<'_>) -> Vec<Recommendation> {
        let mut recommendations: Vec<_> = input
            .items
            .iter()
            .filter_map(|item| {
                let score = self.score(input.profile, item);
                (score >= self.config.min_score).then(|| {
                    Recommendation::new(
                        item.id.clone(),
                        format!("Mirip dengan latihan {} yang Anda sukai", item.category),
                        score,
                        StrategyTag::Similar,
                    )
                })
            })
            .collect();

        by_confidence_desc(&mut recommendations);
        recommendations.truncate(self.limit);
        recommendations
    }
}
