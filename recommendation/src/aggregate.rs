//! Preference aggregation from completion history.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{FixedOffset, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use adaptation::TimeOfDay;

use crate::types::{CompletionRecord, ContentProfile, RecommendationError, Result, UserPreferenceProfile};

/// Configuration for preference aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Offset of the user's local time from UTC, in hours
    pub utc_offset_hours: i32,
    /// Maximum entries per preference list
    pub max_preferences: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 7, // WIB
            max_preferences: 5,
        }
    }
}

impl AggregatorConfig {
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

    /// Check that the offset is a valid time zone.
    pub fn validate(&self) -> Result<()> {
        self.offset().map(|_| ())
    }

    fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                RecommendationError::InvalidConfiguration(format!(
                    "utc_offset_hours {} is out of range",
                    self.utc_offset_hours
                ))
            })
    }
}

/// Most frequent values first, ties broken by first occurrence.
fn rank_by_frequency<T, I>(values: I, limit: usize) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (position, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });
    ranked.into_iter().take(limit).map(|(value, _)| value).collect()
}

/// Builds preference profiles from completion records.
#[derive(Debug, Clone, Default)]
pub struct PreferenceAggregator {
    config: AggregatorConfig,
}

impl PreferenceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AggregatorConfig) -> Self {
        Self { config }
    }

    /// Aggregate a user's records against the content catalog.
    pub fn aggregate(
        &self,
        records: &[CompletionRecord],
        catalog: &[ContentProfile],
    ) -> UserPreferenceProfile {
        let by_id: HashMap<&str, &ContentProfile> =
            catalog.iter().map(|item| (item.id.as_str(), item)).collect();

        let completed: Vec<&CompletionRecord> = records.iter().filter(|r| r.completed).collect();
        let practiced: Vec<&ContentProfile> = completed
            .iter()
            .filter_map(|r| by_id.get(r.content_id.as_str()).copied())
            .collect();

        let limit = self.config.max_preferences;
        let completion_rate = if records.is_empty() {
            0.0
        } else {
            completed.len() as f64 / records.len() as f64
        };

        let offset = self.config.offset().unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to UTC for time-of-day buckets");
            Utc.fix()
        });
        let most_active_time_of_day = rank_by_frequency(
            completed
                .iter()
                .map(|r| TimeOfDay::from_hour(r.started_at.with_timezone(&offset).hour())),
            1,
        )
        .into_iter()
        .next();

        let profile = UserPreferenceProfile {
            preferred_categories: rank_by_frequency(
                practiced.iter().map(|item| item.category.clone()),
                limit,
            ),
            preferred_difficulties: rank_by_frequency(
                practiced.iter().map(|item| item.difficulty),
                limit,
            ),
            preferred_durations: rank_by_frequency(
                practiced.iter().map(|item| item.duration_minutes),
                limit,
            ),
            preferred_instructors: rank_by_frequency(
                practiced.iter().filter_map(|item| item.instructor_id.clone()),
                limit,
            ),
            completion_rate,
            most_active_time_of_day,
        };

        debug!(
            records = records.len(),
            completed = completed.len(),
            matched = practiced.len(),
            "Preference profile aggregated"
        );

        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;
    use chrono::TimeZone;

    fn record(content_id: &str, completed: bool, utc_hour: u32) -> CompletionRecord {
        CompletionRecord {
            user_id: "user-1".to_string(),
            content_id: content_id.to_string(),
            completed,
            duration_minutes: 10,
            started_at: Utc.with_ymd_and_hms(2024, 3, 1, utc_hour, 0, 0).unwrap(),
        }
    }

    fn catalog() -> Vec<ContentProfile> {
        vec![
            ContentProfile::new("sleep-1", "sleep", Difficulty::Pemula, 20).with_instructor("ibu-sari"),
            ContentProfile::new("sleep-2", "sleep", Difficulty::Menengah, 20),
            ContentProfile::new("focus-1", "focus", Difficulty::Pemula, 10),
            ContentProfile::new("breath-1", "breathing", Difficulty::Pemula, 5),
        ]
    }

    #[test]
    fn test_frequency_then_first_occurrence() {
        let ranked = rank_by_frequency(vec!["b", "a", "a", "c", "b", "d"], 3);
        assert_eq!(ranked, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_lists_are_capped() {
        let ranked = rank_by_frequency(0..20u32, 5);
        assert_eq!(ranked, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_aggregate_profile() {
        let records = vec![
            record("focus-1", true, 1),
            record("sleep-1", true, 14),
            record("sleep-2", true, 15),
            record("breath-1", false, 2),
            record("missing", true, 14),
        ];

        let profile = PreferenceAggregator::new().aggregate(&records, &catalog());

        assert_eq!(profile.preferred_categories, vec!["sleep", "focus"]);
        assert_eq!(profile.preferred_difficulties, vec![Difficulty::Pemula, Difficulty::Menengah]);
        assert_eq!(profile.preferred_durations, vec![20, 10]);
        assert_eq!(profile.preferred_instructors, vec!["ibu-sari"]);
        assert!((profile.completion_rate - 0.8).abs() < 1e-9);
        // 14:00 and 15:00 UTC are 21:00 and 22:00 WIB
        assert_eq!(profile.most_active_time_of_day, Some(TimeOfDay::Night));
    }

    #[test]
    fn test_no_records() {
        let profile = PreferenceAggregator::new().aggregate(&[], &catalog());
        assert!(profile.is_empty());
        assert_eq!(profile.completion_rate, 0.0);
        assert_eq!(profile.most_active_time_of_day, None);
    }

    #[test]
    fn test_offset_config() {
        let config = AggregatorConfig::from_yaml("utc_offset_hours: 9\n").unwrap();
        let records = vec![record("focus-1", true, 0)];
        let profile = PreferenceAggregator::with_config(config).aggregate(&records, &catalog());
        // 00:00 UTC is 09:00 WIT
        assert_eq!(profile.most_active_time_of_day, Some(TimeOfDay::Morning));

        assert!(AggregatorConfig::from_yaml("utc_offset_hours: 30\n").is_err());
    }
}
