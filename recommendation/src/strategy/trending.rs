//! Popularity-based recommendations.

use crate::config::TrendingConfig;
use crate::strategy::{by_confidence_desc, ScoringInput, Strategy};
use crate::types::{clamp_unit, ContentProfile, Recommendation, StrategyTag};

/// Recommends content many users finish and rate well.
#[derive(Debug, Clone)]
pub struct TrendingStrategy {
    config: TrendingConfig,
    limit: usize,
}

impl TrendingStrategy {
    pub fn new(config: TrendingConfig, limit: usize) -> Self {
        Self { config, limit }
    }

    /// Trending score, clamped to 0..1.
    pub fn score(&self, item: &ContentProfile) -> f64 {
        let c = &self.config;
        let popularity = (item.completion_count as f64 / c.completion_divisor).min(c.completion_cap);
        let rating = ((item.average_rating - c.rating_pivot) / c.rating_divisor).min(c.rating_cap);
        clamp_unit(c.base + popularity + rating)
    }
}

impl Default for TrendingStrategy {
    fn default() -> Self {
        Self::new(TrendingConfig::default(), 10)
    }
}

impl Strategy for TrendingStrategy {
    fn name(&self) -> &str {
        "trending"
    }

    fn needs_preferences(&self) -> bool {
        false
    }

    fn candidates(&self, input: &ScoringInput<'_>) -> Vec<Recommendation> {
        let mut recommendations: Vec<_> = input
            .items
            .iter()
            .map(|item| {
                Recommendation::new(
                    item.id.clone(),
                    format!(
                        "Populer: diselesaikan {} kali, rating {:.1}",
                        item.completion_count, item.average_rating
                    ),
                    self.score(item),
                    StrategyTag::Trending,
                )
            })
            .collect();

        by_confidence_desc(&mut recommendations);
        recommendations.truncate(self.limit);
        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, RecommendationRequest, UserPreferenceProfile};

    fn item(id: &str, count: u64, rating: f64) -> ContentProfile {
        ContentProfile::new(id, "focus", Difficulty::Pemula, 10).with_stats(count, rating)
    }

    #[test]
    fn test_score_never_exceeds_one() {
        let strategy = TrendingStrategy::default();
        let score = strategy.score(&item("viral", 10_000_000, 5.0));
        assert!(score <= 1.0);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_components() {
        let strategy = TrendingStrategy::default();
        // 0.6 base + 0.1 popularity + 0 rating
        assert!((strategy.score(&item("a", 100, 3.0)) - 0.7).abs() < 1e-9);
        // Poor ratings pull the score down
        assert!(strategy.score(&item("b", 0, 1.0)) < 0.6);
        assert!(strategy.score(&item("c", 0, -100.0)) >= 0.0);
    }

    #[test]
    fn test_top_n_ordering() {
        let items = [item("low", 10, 3.0), item("high", 900, 4.5), item("mid", 300, 4.0)];
        let refs: Vec<_> = items.iter().collect();
        let profile = UserPreferenceProfile::default();
        let request = RecommendationRequest::new(10);
        let input = ScoringInput {
            profile: &profile,
            items: &refs,
            request: &request,
        };

        let strategy = TrendingStrategy::new(TrendingConfig::default(), 2);
        let ids: Vec<_> = strategy
            .candidates(&input)
            .into_iter()
            .map(|r| r.content_id)
            .collect();
        assert_eq!(ids, vec!["high", "mid"]);
    }
}
