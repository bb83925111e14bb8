//! Progressive personalization.
//!
//! Features unlock as the user builds a practice. Each milestone is a rule
//! condition over the same context the adaptation rules see; once a
//! milestone is reached it stays unlocked.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::condition::RuleCondition;
use crate::notifier::{BoundedHistory, DEFAULT_HISTORY_CAPACITY};
use crate::types::AdaptationContext;

/// A practice milestone and the features it unlocks.
#[derive(Debug, Clone)]
pub struct Milestone {
    /// Unique identifier
    pub id: String,
    /// Shown when the milestone unlocks
    pub description: String,
    /// When the milestone is reached
    pub condition: RuleCondition,
    /// Feature ids unlocked
    pub unlocks: Vec<String>,
}

impl Milestone {
    pub fn new(id: impl Into<String>, description: impl Into<String>, condition: RuleCondition) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            condition,
            unlocks: Vec::new(),
        }
    }

    /// Builder: add an unlocked feature.
    pub fn unlocks(mut self, feature: impl Into<String>) -> Self {
        self.unlocks.push(feature.into());
        self
    }
}

/// Built-in milestones in the order they are checked.
pub fn default_milestones() -> Vec<Milestone> {
    vec![
        Milestone::new(
            "first-session",
            "Sesi pertama selesai",
            RuleCondition::SessionsAtLeast(1),
        )
        .unlocks("mood-check-in")
        .unlocks("session-journal"),
        Milestone::new(
            "three-day-streak",
            "Tiga hari berturut-turut",
            RuleCondition::StreakAtLeast(3),
        )
        .unlocks("daily-reminders")
        .unlocks("streak-badge"),
        Milestone::new(
            "ten-sessions",
            "Sepuluh sesi selesai",
            RuleCondition::SessionsAtLeast(10),
        )
        .unlocks("intermediate-courses")
        .unlocks("custom-timer"),
        Milestone::new(
            "practice-explorer",
            "Mencoba pernapasan, body scan dan visualisasi",
            RuleCondition::And(vec![
                RuleCondition::PracticedRecently("breathing".to_string()),
                RuleCondition::PracticedRecently("body-scan".to_string()),
                RuleCondition::PracticedRecently("visualization".to_string()),
            ]),
        )
        .unlocks("practice-mixer"),
        Milestone::new(
            "thirty-day-streak",
            "Tiga puluh hari berturut-turut",
            RuleCondition::StreakAtLeast(30),
        )
        .unlocks("advanced-courses")
        .unlocks("silent-retreat"),
        Milestone::new(
            "hundred-sessions",
            "Seratus sesi selesai",
            RuleCondition::SessionsAtLeast(100),
        )
        .unlocks("mentor-sessions"),
    ]
}

/// A milestone that was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockEvent {
    /// Unique event ID
    pub id: String,
    /// When the milestone unlocked
    pub timestamp: DateTime<Utc>,
    /// The milestone reached
    pub achievement_id: String,
    /// Human-readable reason
    pub reason: String,
    /// Feature ids unlocked by this milestone
    pub unlocked_features: Vec<String>,
}

/// Tracks which milestones a user has reached.
#[derive(Debug, Clone)]
pub struct ProgressivePersonalizationEngine {
    milestones: Vec<Milestone>,
    unlocked: HashSet<String>,
    history: BoundedHistory<UnlockEvent>,
}

impl ProgressivePersonalizationEngine {
    pub fn new() -> Self {
        Self::with_milestones(default_milestones())
    }

    pub fn with_milestones(milestones: Vec<Milestone>) -> Self {
        Self {
            milestones,
            unlocked: HashSet::new(),
            history: BoundedHistory::new(DEFAULT_HISTORY_CAPACITY),
        }
    }

    /// Builder: set the history capacity.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = BoundedHistory::new(capacity);
        self
    }

    /// Check every locked milestone and return the ones reached now, in
    /// catalog order.
    pub fn evaluate(&mut self, context: &AdaptationContext) -> Vec<UnlockEvent> {
        let mut events = Vec::new();
        let timestamp = Utc::now();

        for milestone in &self.milestones {
            if self.unlocked.contains(&milestone.id) {
                continue;
            }

            match milestone.condition.evaluate(context) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    warn!(milestone_id = %milestone.id, error = %error, "Milestone check failed");
                    continue;
                }
            }

            debug!(
                milestone_id = %milestone.id,
                features = milestone.unlocks.len(),
                "Milestone unlocked"
            );

            self.unlocked.insert(milestone.id.clone());
            let event = UnlockEvent {
                id: uuid::Uuid::new_v4().to_string(),
                timestamp,
                achievement_id: milestone.id.clone(),
                reason: milestone.description.clone(),
                unlocked_features: milestone.unlocks.clone(),
            };
            self.history.push(event.clone());
            events.push(event);
        }

        events
    }

    pub fn is_unlocked(&self, milestone_id: &str) -> bool {
        self.unlocked.contains(milestone_id)
    }

    /// Every feature unlocked so far.
    pub fn unlocked_features(&self) -> BTreeSet<String> {
        self.milestones
            .iter()
            .filter(|m| self.unlocked.contains(&m.id))
            .flat_map(|m| m.unlocks.iter().cloned())
            .collect()
    }

    /// Most recent unlock events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<UnlockEvent> {
        self.history.recent(limit)
    }
}

impl Default for ProgressivePersonalizationEngine {
    fn default() -> Self {
        Self::new()
    }
}
