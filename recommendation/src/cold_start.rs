//! Recommendations for users with no history.
//!
//! Ignores preferences entirely: the best-rated beginner content, followed by
//! one beginner item from each starter category.

use std::collections::HashSet;

use tracing::debug;

use crate::config::{ColdStartConfig, TrendingConfig};
use crate::scorer::{eligible_items, merge_candidates};
use crate::strategy::{by_rating_desc, TrendingStrategy};
use crate::types::{ContentProfile, Recommendation, StrategyTag};

/// Cold-start recommendations with the default configuration.
pub fn score_new_user_recommendations(
    catalog: &[ContentProfile],
    limit: usize,
) -> Vec<Recommendation> {
    ColdStartScorer::default().score(catalog, limit)
}

/// Scorer for users without completions.
#[derive(Debug, Clone, Default)]
pub struct ColdStartScorer {
    config: ColdStartConfig,
    trending: TrendingConfig,
}

impl ColdStartScorer {
    pub fn new(config: ColdStartConfig, trending: TrendingConfig) -> Self {
        Self { config, trending }
    }

    pub fn score(&self, catalog: &[ContentProfile], limit: usize) -> Vec<Recommendation> {
        let mut beginner: Vec<_> = eligible_items(catalog, &HashSet::new())
            .into_iter()
            .filter(|item| item.difficulty.is_beginner())
            .collect();
        if beginner.is_empty() || limit == 0 {
            return Vec::new();
        }
        by_rating_desc(&mut beginner);

        let trending = TrendingStrategy::new(self.trending.clone(), self.config.top_rated);
        let top_rated = beginner.iter().take(self.config.top_rated).map(|item| {
            Recommendation::new(
                item.id.clone(),
                "Pilihan terbaik untuk pemula",
                trending.score(item),
                StrategyTag::Trending,
            )
        });

        let starters = self.config.starter_categories.iter().filter_map(|category| {
            beginner
                .iter()
                .find(|item| &item.category == category)
                .map(|item| {
                    Recommendation::new(
                        item.id.clone(),
                        format!("Mulai dengan latihan {category}"),
                        self.config.starter_confidence,
                        StrategyTag::Similar,
                    )
                })
        });

        let merged = merge_candidates(top_rated.chain(starters), limit);
        debug!(
            beginner_items = beginner.len(),
            returned = merged.len(),
            "Cold-start recommendations scored"
        );
        merged
    }
}
