//! Core types for recommendation scoring.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use adaptation::{Mood, TimeOfDay};

/// Content difficulty ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "beginner")]
    Pemula,
    #[serde(alias = "intermediate")]
    Menengah,
    #[serde(alias = "advanced")]
    Lanjutan,
}

impl Difficulty {
    /// The next rung, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Pemula => Some(Self::Menengah),
            Self::Menengah => Some(Self::Lanjutan),
            Self::Lanjutan => None,
        }
    }

    /// Parse a stored label, accepting the English aliases.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "pemula" | "beginner" => Some(Self::Pemula),
            "menengah" | "intermediate" => Some(Self::Menengah),
            "lanjutan" | "advanced" => Some(Self::Lanjutan),
            _ => None,
        }
    }

    pub fn is_beginner(&self) -> bool {
        matches!(self, Self::Pemula)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pemula => "pemula",
            Self::Menengah => "menengah",
            Self::Lanjutan => "lanjutan",
        }
    }
}

/// Read-only facts about one content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ContentProfile {
    /// Unique content ID
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    #[serde(default)]
    pub instructor_id: Option<String>,
    /// Number of completed plays
    #[serde(default)]
    pub completion_count: u64,
    /// Mean rating on a 1-5 scale
    #[serde(default)]
    pub average_rating: f64,
}

impl ContentProfile {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        difficulty: Difficulty,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            category: category.into(),
            difficulty,
            duration_minutes,
            instructor_id: None,
            completion_count: 0,
            average_rating: 0.0,
        }
    }

    /// Builder: set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder: set the instructor.
    pub fn with_instructor(mut self, instructor_id: impl Into<String>) -> Self {
        self.instructor_id = Some(instructor_id.into());
        self
    }

    /// Builder: set popularity figures.
    pub fn with_stats(mut self, completion_count: u64, average_rating: f64) -> Self {
        self.completion_count = completion_count;
        self.average_rating = average_rating;
        self
    }
}

/// Preferences derived from a user's completed sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct UserPreferenceProfile {
    /// Most practiced categories, most frequent first
    pub preferred_categories: Vec<String>,
    pub preferred_difficulties: Vec<Difficulty>,
    pub preferred_durations: Vec<u32>,
    pub preferred_instructors: Vec<String>,
    /// Share of started sessions that were completed (0.0 - 1.0)
    pub completion_rate: f64,
    pub most_active_time_of_day: Option<TimeOfDay>,
}

impl UserPreferenceProfile {
    /// True when no preference list has entries.
    pub fn is_empty(&self) -> bool {
        self.preferred_categories.is_empty()
            && self.preferred_difficulties.is_empty()
            && self.preferred_durations.is_empty()
            && self.preferred_instructors.is_empty()
    }

    /// Check the profile's shape.
    pub fn validate(&self) -> Result<()> {
        if !self.completion_rate.is_finite() || !(0.0..=1.0).contains(&self.completion_rate) {
            return Err(RecommendationError::InvalidProfile(format!(
                "completion_rate {} is outside 0..1",
                self.completion_rate
            )));
        }
        Ok(())
    }

    /// Parse and validate a profile payload.
    pub fn from_json(json: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(json)
            .map_err(|e| RecommendationError::InvalidProfile(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Parse a profile payload, substituting empty preferences when it is
    /// malformed. Scoring then falls back to trending only.
    pub fn from_json_or_default(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|e| {
            warn!(error = %e, "Invalid preference profile, using defaults");
            Self::default()
        })
    }
}

/// Which strategy produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "kebab-case")]
pub enum StrategyTag {
    Trending,
    Similar,
    Progression,
    Mood,
    TimeBased,
}

impl StrategyTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::Similar => "similar",
            Self::Progression => "progression",
            Self::Mood => "mood",
            Self::TimeBased => "time-based",
        }
    }
}

/// A recommended content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Recommendation {
    pub content_id: String,
    /// Shown to the user
    pub reason_text: String,
    /// Confidence (0.0 - 1.0)
    pub confidence_score: f64,
    pub strategy: StrategyTag,
}

impl Recommendation {
    /// Create a recommendation, clamping confidence to 0..1.
    pub fn new(
        content_id: impl Into<String>,
        reason_text: impl Into<String>,
        confidence_score: f64,
        strategy: StrategyTag,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            reason_text: reason_text.into(),
            confidence_score: clamp_unit(confidence_score),
            strategy,
        }
    }
}

/// Clamp to 0..1, mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// One started session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub user_id: String,
    pub content_id: String,
    /// Whether the session ran to the end
    pub completed: bool,
    /// Minutes actually practiced
    pub duration_minutes: u32,
    pub started_at: DateTime<Utc>,
}

/// Per-call scoring options.
#[derive(Debug, Clone, Default)]
pub struct RecommendationRequest {
    /// Content that must not be recommended, e.g. already completed
    pub exclude_ids: HashSet<String>,
    /// Maximum recommendations returned
    pub limit: usize,
    /// Current time bucket; falls back to the profile's most active bucket
    pub time_of_day: Option<TimeOfDay>,
    pub mood: Option<Mood>,
}

impl RecommendationRequest {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    /// Builder: exclude content ids.
    pub fn excluding<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Builder: set the current time bucket.
    pub fn at(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = Some(time_of_day);
        self
    }

    /// Builder: set the current mood.
    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }
}

/// Error types for recommendation operations.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    /// Preference profile payload is malformed
    #[error("Invalid preference profile: {0}")]
    InvalidProfile(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration could not be parsed
    #[error("Configuration parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for recommendation operations.
pub type Result<T> = std::result::Result<T, RecommendationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_ladder() {
        assert_eq!(Difficulty::Pemula.next(), Some(Difficulty::Menengah));
        assert_eq!(Difficulty::Menengah.next(), Some(Difficulty::Lanjutan));
        assert_eq!(Difficulty::Lanjutan.next(), None);
    }

    #[test]
    fn test_difficulty_accepts_english_aliases() {
        let d: Difficulty = serde_json::from_str("\"beginner\"").unwrap();
        assert_eq!(d, Difficulty::Pemula);
        let d: Difficulty = serde_json::from_str("\"advanced\"").unwrap();
        assert_eq!(d, Difficulty::Lanjutan);
        assert_eq!(serde_json::to_string(&Difficulty::Menengah).unwrap(), "\"menengah\"");
    }

    #[test]
    fn test_strategy_tag_serialization() {
        assert_eq!(serde_json::to_string(&StrategyTag::TimeBased).unwrap(), "\"time-based\"");
    }

    #[test]
    fn test_invalid_profile_falls_back() {
        let profile = UserPreferenceProfile::from_json_or_default(r#"{"completion_rate": 4.0}"#);
        assert!(profile.is_empty());
        assert_eq!(profile.completion_rate, 0.0);

        let profile = UserPreferenceProfile::from_json_or_default("not json");
        assert_eq!(profile, UserPreferenceProfile::default());
    }

    #[test]
    fn test_partial_profile_parses() {
        let profile =
            UserPreferenceProfile::from_json(r#"{"preferred_categories": ["focus"]}"#).unwrap();
        assert_eq!(profile.preferred_categories, vec!["focus"]);
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(Recommendation::new("a", "", 1.7, StrategyTag::Trending).confidence_score, 1.0);
        assert_eq!(Recommendation::new("a", "", f64::NAN, StrategyTag::Trending).confidence_score, 0.0);
    }
}
