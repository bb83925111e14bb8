//! Recommendation scoring.
//!
//! Runs the configured strategies over the eligible items, concatenates their
//! candidates in strategy order, keeps the first candidate per content id,
//! ranks by confidence and truncates. Nothing here returns an error: faulty
//! items are skipped and an empty catalog yields an empty list.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::{ScorerConfig, StrategyKind};
use crate::strategy::{
    by_confidence_desc, MoodTimeStrategy, ProgressionStrategy, ScoringInput, SimilarityStrategy,
    Strategy, TrendingStrategy,
};
use crate::types::{ContentProfile, Recommendation, RecommendationRequest, UserPreferenceProfile};

/// Score recommendations with the default configuration.
pub fn score_recommendations(
    profile: &UserPreferenceProfile,
    catalog: &[ContentProfile],
    exclude_ids: &[String],
    limit: usize,
) -> Vec<Recommendation> {
    let request = RecommendationRequest::new(limit).excluding(exclude_ids.iter().cloned());
    RecommendationScorer::new().score(profile, catalog, &request)
}

/// Items a strategy may consider: not excluded and with a usable rating.
pub(crate) fn eligible_items<'a>(
    catalog: &'a [ContentProfile],
    exclude_ids: &HashSet<String>,
) -> Vec<&'a ContentProfile> {
    catalog
        .iter()
        .filter(|item| {
            if !item.average_rating.is_finite() {
                warn!(content_id = %item.id, "Skipping content with non-finite rating");
                return false;
            }
            !exclude_ids.contains(&item.id)
        })
        .collect()
}

/// Keep the first recommendation per content id, rank and truncate.
pub(crate) fn merge_candidates(
    candidates: impl IntoIterator<Item = Recommendation>,
    limit: usize,
) -> Vec<Recommendation> {
    let mut seen = HashSet::new();
    let mut merged: Vec<_> = candidates
        .into_iter()
        .filter(|r| seen.insert(r.content_id.clone()))
        .collect();

    by_confidence_desc(&mut merged);
    merged.truncate(limit);
    merged
}

/// Configurable recommendation scorer.
pub struct RecommendationScorer {
    strategies: Vec<Box<dyn Strategy>>,
}

impl RecommendationScorer {
    /// Create a scorer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&ScorerConfig::default())
    }

    /// Create a scorer running the configured strategies in order.
    pub fn with_config(config: &ScorerConfig) -> Self {
        let limit = config.per_strategy_limit;
        let strategies = config
            .strategies
            .iter()
            .map(|kind| -> Box<dyn Strategy> {
                match kind {
                    StrategyKind::Trending => {
                        Box::new(TrendingStrategy::new(config.trending.clone(), limit))
                    }
                    StrategyKind::Similarity => {
                        Box::new(SimilarityStrategy::new(config.similarity.clone(), limit))
                    }
                    StrategyKind::Progression => {
                        Box::new(ProgressionStrategy::new(config.progression_confidence, limit))
                    }
                    StrategyKind::MoodTime => {
                        Box::new(MoodTimeStrategy::new(config.mood_time.clone(), limit))
                    }
                }
            })
            .collect();

        Self { strategies }
    }

    /// Builder: append a strategy after the configured ones.
    pub fn with_strategy(mut self, strategy: Box<dyn Strategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Names of the strategies, in run order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Score the catalog for a profile.
    pub fn score(
        &self,
        profile: &UserPreferenceProfile,
        catalog: &[ContentProfile],
        request: &RecommendationRequest,
    ) -> Vec<Recommendation> {
        let items = eligible_items(catalog, &request.exclude_ids);
        if items.is_empty() || request.limit == 0 {
            return Vec::new();
        }

        let input = ScoringInput {
            profile,
            items: &items,
            request,
        };
        let trending_only = profile.is_empty();

        let mut candidates = Vec::new();
        for strategy in &self.strategies {
            if trending_only && strategy.needs_preferences() {
                continue;
            }
            let proposed = strategy.candidates(&input);
            debug!(
                strategy = strategy.name(),
                candidates = proposed.len(),
                "Strategy proposed candidates"
            );
            candidates.extend(proposed);
        }

        let merged = merge_candidates(candidates, request.limit);
        debug!(
            eligible = items.len(),
            returned = merged.len(),
            trending_only,
            "Recommendations scored"
        );
        merged
    }
}

impl Default for RecommendationScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, StrategyTag};

    fn profile() -> UserPreferenceProfile {
        UserPreferenceProfile {
            preferred_categories: vec!["focus".to_string()],
            preferred_difficulties: vec![Difficulty::Pemula],
            preferred_durations: vec![10],
            ..Default::default()
        }
    }

    #[test]
    fn test_item_in_two_strategies_appears_once() {
        let catalog = vec![
            ContentProfile::new("focus-1", "focus", Difficulty::Pemula, 10).with_stats(5, 4.0),
        ];
        let recommendations = score_recommendations(&profile(), &catalog, &[], 10);

        assert_eq!(recommendations.len(), 1);
        // Trending runs first and owns the item
        assert_eq!(recommendations[0].strategy, StrategyTag::Trending);
    }

    #[test]
    fn test_similarity_wins_when_ordered_first() {
        let config = ScorerConfig {
            strategies: vec![StrategyKind::Similarity, StrategyKind::Trending],
            ..Default::default()
        };
        let catalog = vec![
            ContentProfile::new("focus-1", "focus", Difficulty::Pemula, 10).with_stats(5, 4.0),
        ];
        let request = RecommendationRequest::new(10);
        let recommendations =
            RecommendationScorer::with_config(&config).score(&profile(), &catalog, &request);

        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].strategy, StrategyTag::Similar);
        assert!((recommendations[0].confidence_score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_empty_catalog_is_empty() {
        assert!(score_recommendations(&profile(), &[], &[], 10).is_empty());
    }

    #[test]
    fn test_excluded_items_never_returned() {
        let catalog = vec![
            ContentProfile::new("done", "focus", Difficulty::Pemula, 10).with_stats(900, 5.0),
            ContentProfile::new("next", "focus", Difficulty::Menengah, 10),
        ];
        let recommendations = score_recommendations(&profile(), &catalog, &["done".to_string()], 10);
        assert!(recommendations.iter().all(|r| r.content_id != "done"));
        assert_eq!(recommendations.len(), 1);
    }

    #[test]
    fn test_empty_profile_is_trending_only() {
        let catalog = vec![
            ContentProfile::new("a", "sleep", Difficulty::Pemula, 10).with_stats(100, 4.0),
            ContentProfile::new("b", "focus", Difficulty::Menengah, 15).with_stats(10, 3.5),
        ];
        let request = RecommendationRequest::new(10).at(adaptation::TimeOfDay::Night);
        let recommendations =
            RecommendationScorer::new().score(&UserPreferenceProfile::default(), &catalog, &request);

        assert_eq!(recommendations.len(), 2);
        assert!(recommendations.iter().all(|r| r.strategy == StrategyTag::Trending));
    }

    #[test]
    fn test_non_finite_rating_is_skipped() {
        let catalog = vec![
            ContentProfile::new("broken", "focus", Difficulty::Pemula, 10).with_stats(5, f64::NAN),
            ContentProfile::new("fine", "focus", Difficulty::Pemula, 10).with_stats(5, 4.0),
        ];
        let recommendations = score_recommendations(&profile(), &catalog, &[], 10);
        let ids: Vec<_> = recommendations.iter().map(|r| r.content_id.as_str()).collect();
        assert_eq!(ids, ["fine"]);
    }

    #[test]
    fn test_ranked_and_truncated() {
        let catalog: Vec<_> = (0..20)
            .map(|i| {
                ContentProfile::new(format!("item-{i}"), "focus", Difficulty::Pemula, 10)
                    .with_stats(i * 10, 4.0)
            })
            .collect();
        let recommendations = score_recommendations(&profile(), &catalog, &[], 5);

        assert_eq!(recommendations.len(), 5);
        let scores: Vec<_> = recommendations.iter().map(|r| r.confidence_score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        let ids: HashSet<_> = recommendations.iter().map(|r| r.content_id.as_str()).collect();
        assert_eq!(ids.len(), 5);
    }
}
