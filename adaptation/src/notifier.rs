//! Change detection between successive adaptations.
//!
//! Compares the combined output structurally and keeps a short history of
//! which rules became active and when.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::CombinedAdaptation;

/// Default number of change events retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Outcome of comparing two adaptations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeDetection {
    /// Whether the combined output differs
    pub changed: bool,
    /// Rules active now but not before, in activation order
    pub newly_active_ids: Vec<String>,
}

/// Compare two adaptations. A missing previous adaptation means everything
/// is new.
pub fn detect_change(
    previous: Option<&CombinedAdaptation>,
    next: &CombinedAdaptation,
) -> ChangeDetection {
    match previous {
        None => ChangeDetection {
            changed: true,
            newly_active_ids: next.active_rules.clone(),
        },
        Some(previous) if previous == next => ChangeDetection::default(),
        Some(previous) => ChangeDetection {
            changed: true,
            newly_active_ids: next
                .active_rules
                .iter()
                .filter(|id| !previous.is_active(id))
                .cloned()
                .collect(),
        },
    }
}

/// A rule that became active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptationChangeEvent {
    /// Unique event ID
    pub id: String,
    /// When the change was observed
    pub timestamp: DateTime<Utc>,
    /// The newly active rule
    pub rule_id: String,
    /// Human-readable reason
    pub reason: String,
    /// Fingerprint of the adaptation the rule became active in
    pub fingerprint: String,
}

/// Bounded ring buffer, oldest entries evicted first.
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: T) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> BoundedHistory<T> {
    /// Most recent entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<T> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }
}

/// Detects adaptation changes and records newly active rules.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    history: BoundedHistory<AdaptationChangeEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: BoundedHistory::new(capacity),
        }
    }

    /// Compare adaptations and append one event per newly active rule.
    pub fn observe(
        &mut self,
        previous: Option<&CombinedAdaptation>,
        next: &CombinedAdaptation,
    ) -> ChangeDetection {
        self.observe_with(previous, next, |_| None)
    }

    /// Like [`observe`](Self::observe), with a lookup for rule descriptions
    /// used as the event reason.
    pub fn observe_with<F>(
        &mut self,
        previous: Option<&CombinedAdaptation>,
        next: &CombinedAdaptation,
        describe: F,
    ) -> ChangeDetection
    where
        F: Fn(&str) -> Option<String>,
    {
        let detection = detect_change(previous, next);
        if detection.newly_active_ids.is_empty() {
            return detection;
        }

        let fingerprint = next.fingerprint();
        let timestamp = Utc::now();

        for rule_id in &detection.newly_active_ids {
            let reason = describe(rule_id)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| format!("Rule '{rule_id}' became active"));

            debug!(rule_id = %rule_id, "Recording adaptation change");

            self.history.push(AdaptationChangeEvent {
                id: uuid::Uuid::new_v4().to_string(),
                timestamp,
                rule_id: rule_id.clone(),
                reason,
                fingerprint: fingerprint.clone(),
            });
        }

        detection
    }

    /// Most recent events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<AdaptationChangeEvent> {
        self.history.recent(limit)
    }

    pub fn history(&self) -> &BoundedHistory<AdaptationChangeEvent> {
        &self.history
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;

    fn adaptation(rules: &[&str]) -> CombinedAdaptation {
        let mut combined = CombinedAdaptation::default();
        for id in rules {
            combined.active_rules.push(id.to_string());
            combined
                .ui_changes
                .insert(format!("{id}_flag"), FieldValue::Flag(true));
        }
        combined
    }

    #[test]
    fn test_first_run_is_all_new() {
        let next = adaptation(&["a", "b"]);
        let detection = detect_change(None, &next);
        assert!(detection.changed);
        assert_eq!(detection.newly_active_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_structural_equality() {
        let previous = adaptation(&["a"]);
        let next = adaptation(&["a"]);
        assert_eq!(detect_change(Some(&previous), &next), ChangeDetection::default());
    }

    #[test]
    fn test_changed_values_without_new_rules() {
        let previous = adaptation(&["a"]);
        let mut next = previous.clone();
        next.ui_changes.insert("a_flag".to_string(), FieldValue::Flag(false));

        let detection = detect_change(Some(&previous), &next);
        assert!(detection.changed);
        assert!(detection.newly_active_ids.is_empty());
    }

    #[test]
    fn test_history_is_capped() {
        let mut notifier = ChangeNotifier::new();
        let mut previous: Option<CombinedAdaptation> = None;

        for i in 0..12 {
            let id = format!("rule-{i}");
            let next = adaptation(&[id.as_str()]);
            notifier.observe(previous.as_ref(), &next);
            previous = Some(next);
        }

        assert_eq!(notifier.history().len(), DEFAULT_HISTORY_CAPACITY);
        let recent = notifier.recent(1);
        assert_eq!(recent[0].rule_id, "rule-11");
        let oldest = notifier.history().iter().next().unwrap();
        assert_eq!(oldest.rule_id, "rule-2");
    }

    #[test]
    fn test_reason_uses_description() {
        let mut notifier = ChangeNotifier::new();
        let next = adaptation(&["a"]);
        notifier.observe_with(None, &next, |id| Some(format!("described {id}")));
        assert_eq!(notifier.recent(1)[0].reason, "described a");
        assert_eq!(notifier.recent(1)[0].fingerprint, next.fingerprint());
    }
}
