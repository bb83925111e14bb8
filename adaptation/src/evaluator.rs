//! Rule evaluation.
//!
//! Filters the catalog by condition, orders matches by priority and merges
//! the winners. Evaluation is a pure function of the context and catalog:
//! no clock reads, no randomness, and no error escapes it. A rule whose
//! condition or derived field fails is logged and treated as non-matching.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::RuleCatalog;
use crate::merge::{FieldKey, PatchMerger};
use crate::types::{AdaptationContext, AdaptationRule, CombinedAdaptation, RuleEvaluationError};

/// Default cap on simultaneously active rules.
pub const DEFAULT_MAX_ACTIVE: usize = 5;

/// Evaluator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Maximum number of rules merged into one adaptation
    pub max_active: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_active: DEFAULT_MAX_ACTIVE,
        }
    }
}

/// A rule excluded because it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFailure {
    pub rule_id: String,
    pub error: RuleEvaluationError,
}

/// Result of one evaluation.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Merged output
    pub combined: CombinedAdaptation,
    /// Rules excluded because they failed
    pub failures: Vec<RuleFailure>,
    /// Which rule set each field
    pub provenance: BTreeMap<FieldKey, String>,
}

impl Evaluation {
    /// Ids of the merged rules, highest priority first.
    pub fn active_rules(&self) -> &[String] {
        &self.combined.active_rules
    }
}

/// Evaluate the catalog against a context.
pub fn evaluate_adaptations(
    context: &AdaptationContext,
    catalog: &RuleCatalog,
    max_active: usize,
) -> Evaluation {
    RuleEvaluator::with_config(EvaluatorConfig { max_active }).evaluate(context, catalog)
}

/// Evaluates adaptation rules.
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluator {
    config: EvaluatorConfig,
}

impl RuleEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn max_active(&self) -> usize {
        self.config.max_active
    }

    /// Evaluate the catalog against a context.
    pub fn evaluate(&self, context: &AdaptationContext, catalog: &RuleCatalog) -> Evaluation {
        let mut failures = Vec::new();

        let mut matches: Vec<&AdaptationRule> = Vec::new();
        for rule in catalog.rules() {
            match rule.condition.evaluate(context) {
                Ok(true) => matches.push(rule),
                Ok(false) => {}
                Err(error) => {
                    warn!(rule_id = %rule.id, error = %error, "Rule condition failed, skipping");
                    failures.push(RuleFailure {
                        rule_id: rule.id.clone(),
                        error,
                    });
                }
            }
        }

        // Stable: equal priorities keep declaration order
        matches.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut merger = PatchMerger::new();
        for rule in matches {
            if merger.merged_count() >= self.config.max_active {
                break;
            }
            match merger.apply(rule, context) {
                Ok(written) => {
                    debug!(
                        rule_id = %rule.id,
                        priority = rule.priority,
                        fields_written = written,
                        "Rule merged"
                    );
                }
                Err(error) => {
                    warn!(rule_id = %rule.id, error = %error, "Rule patch failed, skipping");
                    failures.push(RuleFailure {
                        rule_id: rule.id.clone(),
                        error,
                    });
                }
            }
        }

        let (combined, provenance) = merger.finish();

        debug!(
            active = combined.active_rules.len(),
            failed = failures.len(),
            "Adaptation evaluated"
        );

        Evaluation {
            combined,
            failures,
            provenance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::condition::RuleCondition;
    use crate::types::{AdaptationPatch, Mood, Namespace, SpiritualTradition, TimeOfDay};

    fn always(id: &str, priority: i32) -> AdaptationRule {
        AdaptationRule::new(id, priority, RuleCondition::Always)
            .with_patch(AdaptationPatch::new().ui(format!("{id}_flag"), true))
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        let catalog = RuleCatalog::new(vec![always("a", 5), always("b", 7), always("c", 5)]).unwrap();
        let evaluation = evaluate_adaptations(&AdaptationContext::default(), &catalog, 5);
        assert_eq!(evaluation.active_rules(), ["b", "a", "c"]);
    }

    #[test]
    fn test_zero_cap_merges_nothing() {
        let catalog = RuleCatalog::new(vec![always("a", 5)]).unwrap();
        let evaluation = evaluate_adaptations(&AdaptationContext::default(), &catalog, 0);
        assert!(evaluation.combined.is_empty());
    }

    #[test]
    fn test_default_catalog_stress_at_night() {
        let context = AdaptationContext::at(TimeOfDay::Night)
            .with_tradition(SpiritualTradition::Buddha)
            .with_mood(Mood::Stressed);

        let evaluation = RuleEvaluator::new().evaluate(&context, default_catalog());
        assert_eq!(
            evaluation.active_rules(),
            ["buddhist-vipassana", "stress-relief-priority", "night-sleep-preparation"]
        );
        // Stress relief outranks the night rule for the session focus
        assert_eq!(
            evaluation
                .combined
                .get(Namespace::Content, "session_focus")
                .and_then(|v| v.as_str()),
            Some("breathing")
        );
        assert!(evaluation.failures.is_empty());
    }
}
