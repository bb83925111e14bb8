//! Configuration for recommendation scoring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use adaptation::{Mood, TimeOfDay};

use crate::types::{RecommendationError, Result};

/// Strategy identifiers, in the order they may be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Trending,
    Similarity,
    Progression,
    MoodTime,
}

/// Configuration for the scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Strategies to run; earlier strategies win duplicate items
    pub strategies: Vec<StrategyKind>,
    /// Maximum candidates per strategy
    pub per_strategy_limit: usize,
    pub trending: TrendingConfig,
    pub similarity: SimilarityConfig,
    /// Confidence of progression candidates
    pub progression_confidence: f64,
    pub mood_time: MoodTimeConfig,
    pub cold_start: ColdStartConfig,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            strategies: vec![
                StrategyKind::Trending,
                StrategyKind::Similarity,
                StrategyKind::Progression,
                StrategyKind::MoodTime,
            ],
            per_strategy_limit: 10,
            trending: TrendingConfig::default(),
            similarity: SimilarityConfig::default(),
            progression_confidence: 0.8,
            mood_time: MoodTimeConfig::default(),
            cold_start: ColdStartConfig::default(),
        }
    }
}

impl ScorerConfig {
    /// Load config from YAML and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| {
            if value.is_finite() && (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(RecommendationError::InvalidConfiguration(format!(
                    "{name} must be within 0..1, got {value}"
                )))
            }
        };

        unit("progression_confidence", self.progression_confidence)?;
        unit("mood_time.confidence", self.mood_time.confidence)?;
        unit("similarity.min_score", self.similarity.min_score)?;
        unit("cold_start.starter_confidence", self.cold_start.starter_confidence)?;

        let weights = &self.similarity;
        for (name, weight) in [
            ("similarity.category_weight", weights.category_weight),
            ("similarity.difficulty_weight", weights.difficulty_weight),
            ("similarity.duration_weight", weights.duration_weight),
            ("similarity.instructor_weight", weights.instructor_weight),
        ] {
            unit(name, weight)?;
        }

        if self.trending.completion_divisor <= 0.0 || self.trending.rating_divisor <= 0.0 {
            return Err(RecommendationError::InvalidConfiguration(
                "trending divisors must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Trending score: `base + min(count / completion_divisor, completion_cap)
/// + min((rating - rating_pivot) / rating_divisor, rating_cap)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingConfig {
    pub base: f64,
    pub completion_divisor: f64,
    pub completion_cap: f64,
    pub rating_pivot: f64,
    pub rating_divisor: f64,
    pub rating_cap: f64,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            base: 0.6,
            completion_divisor: 1000.0,
            completion_cap: 0.3,
            rating_pivot: 3.0,
            rating_divisor: 5.0,
            rating_cap: 0.1,
        }
    }
}

/// Similarity weights per matching feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub category_weight: f64,
    pub difficulty_weight: f64,
    pub duration_weight: f64,
    pub instructor_weight: f64,
    /// Candidates need at least this score (inclusive)
    pub min_score: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            category_weight: 0.4,
            difficulty_weight: 0.3,
            duration_weight: 0.2,
            instructor_weight: 0.1,
            min_score: 0.3,
        }
    }
}

/// Category mappings for mood and time-of-day suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodTimeConfig {
    pub confidence: f64,
    pub time_categories: BTreeMap<TimeOfDay, Vec<String>>,
    pub mood_categories: BTreeMap<Mood, Vec<String>>,
}

fn categories(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for MoodTimeConfig {
    fn default() -> Self {
        let time_categories = BTreeMap::from([
            (TimeOfDay::EarlyMorning, categories(&["prayer", "mindfulness"])),
            (TimeOfDay::Morning, categories(&["energy", "focus", "breathing"])),
            (TimeOfDay::Midday, categories(&["stress-relief", "breathing"])),
            (TimeOfDay::Afternoon, categories(&["focus", "stress-relief"])),
            (TimeOfDay::Evening, categories(&["gratitude", "relaxation"])),
            (TimeOfDay::Night, categories(&["sleep", "relaxation"])),
        ]);

        let mood_categories = BTreeMap::from([
            (Mood::Calm, categories(&["mindfulness", "focus"])),
            (Mood::Happy, categories(&["gratitude", "mindfulness"])),
            (Mood::Energetic, categories(&["focus", "energy"])),
            (Mood::Tired, categories(&["relaxation", "sleep"])),
            (Mood::Stressed, categories(&["stress-relief", "breathing"])),
            (Mood::Anxious, categories(&["breathing", "stress-relief"])),
            (Mood::Sad, categories(&["self-compassion", "gratitude"])),
        ]);

        Self {
            confidence: 0.7,
            time_categories,
            mood_categories,
        }
    }
}

/// Cold-start selection for users without history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColdStartConfig {
    /// Top-rated beginner items taken before the starter picks
    pub top_rated: usize,
    /// One beginner item is picked from each of these
    pub starter_categories: Vec<String>,
    pub starter_confidence: f64,
}

impl Default for ColdStartConfig {
    fn default() -> Self {
        Self {
            top_rated: 3,
            starter_categories: categories(&["breathing", "mindfulness", "sleep", "stress-relief"]),
            starter_confidence: 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy_order() {
        let config = ScorerConfig::default();
        assert_eq!(
            config.strategies,
            vec![
                StrategyKind::Trending,
                StrategyKind::Similarity,
                StrategyKind::Progression,
                StrategyKind::MoodTime
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = "strategies: [similarity, trending]\nsimilarity:\n  min_score: 0.5\n";
        let config = ScorerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.strategies, vec![StrategyKind::Similarity, StrategyKind::Trending]);
        assert_eq!(config.similarity.min_score, 0.5);
        assert_eq!(config.similarity.category_weight, 0.4);

        let roundtrip = ScorerConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(roundtrip.strategies, config.strategies);
    }

    #[test]
    fn test_yaml_output_is_stable() {
        let yaml = ScorerConfig::default().to_yaml().unwrap();
        assert_eq!(yaml, ScorerConfig::default().to_yaml().unwrap());

        let calm = yaml.find("calm:").unwrap();
        let sad = yaml.find("sad:").unwrap();
        assert!(calm < sad);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let result = ScorerConfig::from_yaml("progression_confidence: 1.5\n");
        assert!(matches!(result, Err(RecommendationError::InvalidConfiguration(_))));
    }
}
