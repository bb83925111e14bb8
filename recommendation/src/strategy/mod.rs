//! Recommendation strategies.
//!
//! Each strategy proposes candidates independently:
//! - **Trending**: popular, well-rated content
//! - **Similarity**: content resembling what the user already practices
//! - **Progression**: the next difficulty rung in familiar categories
//! - **Mood/time**: categories suited to the current mood and time of day
//!
//! Strategies never see excluded items or items with unusable ratings; the
//! scorer filters those out once before any strategy runs.

mod mood_time;
mod progression;
mod similarity;
mod trending;

pub use mood_time::MoodTimeStrategy;
pub use progression::ProgressionStrategy;
pub use similarity::SimilarityStrategy;
pub use trending::TrendingStrategy;

use crate::types::{ContentProfile, Recommendation, RecommendationRequest, UserPreferenceProfile};

/// Inputs shared by every strategy for one scoring run.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub profile: &'a UserPreferenceProfile,
    /// Eligible items, in catalog order
    pub items: &'a [&'a ContentProfile],
    pub request: &'a RecommendationRequest,
}

/// Common trait for recommendation strategies.
pub trait Strategy: Send + Sync {
    /// Name of the strategy, for logging.
    fn name(&self) -> &str;

    /// Whether the strategy needs preference data. Only strategies returning
    /// false run for a profile with no preferences.
    fn needs_preferences(&self) -> bool {
        true
    }

    /// Propose candidates, best first.
    fn candidates(&self, input: &ScoringInput<'_>) -> Vec<Recommendation>;
}

/// Sort items by rating, best first, keeping catalog order on ties.
pub(crate) fn by_rating_desc(items: &mut [&ContentProfile]) {
    items.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
}

/// Sort recommendations by confidence, best first, keeping order on ties.
pub(crate) fn by_confidence_desc(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));
}
