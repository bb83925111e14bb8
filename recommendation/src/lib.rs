//! Meditation content recommendations for Sadar
//!
//! Scores the content catalog against a user's preference profile:
//!
//! - **Trending**: popular, well-rated content
//! - **Similarity**: weighted match on category, difficulty, duration, instructor
//! - **Progression**: the next difficulty rung in familiar categories
//! - **Mood/time**: categories suited to the current mood and time of day
//!
//! New users without history get a separate cold-start selection.
//!
//! # Example
//!
//! ```ignore
//! use recommendation::{score_recommendations, PreferenceAggregator};
//!
//! let profile = PreferenceAggregator::new().aggregate(&records, &catalog);
//! let recommendations = score_recommendations(&profile, &catalog, &completed_ids, 10);
//! ```

pub mod aggregate;
pub mod cold_start;
pub mod config;
pub mod scorer;
pub mod strategy;
pub mod types;

// Re-export main types
pub use aggregate::{AggregatorConfig, PreferenceAggregator};
pub use cold_start::{score_new_user_recommendations, ColdStartScorer};
pub use config::{ScorerConfig, StrategyKind};
pub use scorer::{score_recommendations, RecommendationScorer};
pub use strategy::{ScoringInput, Strategy};
pub use types::*;
