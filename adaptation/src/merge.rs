//! Merging rule patches into one combined adaptation.
//!
//! Patches are applied in priority order, highest first, and the first rule
//! to set a field owns it. A lower-priority rule can only fill fields nobody
//! above it has set.

use std::collections::BTreeMap;

use crate::types::{
    AdaptationContext, AdaptationRule, CombinedAdaptation, FieldValue, Namespace,
    RuleEvaluationError,
};

/// Address of a single output field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    pub namespace: Namespace,
    pub key: String,
}

impl FieldKey {
    pub fn new(namespace: Namespace, key: impl Into<String>) -> Self {
        Self {
            namespace,
            key: key.into(),
        }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace.as_str(), self.key)
    }
}

/// Accumulates patches with first-writer-wins semantics.
#[derive(Debug, Default)]
pub struct PatchMerger {
    combined: CombinedAdaptation,
    provenance: BTreeMap<FieldKey, String>,
}

impl PatchMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one rule's patch.
    ///
    /// Only fields not already owned are resolved, so a derived field hidden
    /// by a higher-priority rule is never computed. Nothing is committed if any
    /// resolved field fails.
    pub fn apply(
        &mut self,
        rule: &AdaptationRule,
        context: &AdaptationContext,
    ) -> Result<usize, RuleEvaluationError> {
        let mut staged: Vec<(Namespace, String, FieldValue)> = Vec::new();

        for namespace in Namespace::all() {
            let taken = self.combined.namespace(namespace);
            for (key, field) in rule.patch.namespace(namespace) {
                if taken.contains_key(key) {
                    continue;
                }
                let value = field.resolve(context).map_err(|e| match e {
                    RuleEvaluationError::ConditionFailed(reason) => {
                        RuleEvaluationError::DerivationFailed {
                            field: key.clone(),
                            reason,
                        }
                    }
                    other => other,
                })?;
                staged.push((namespace, key.clone(), value));
            }
        }

        let written = staged.len();
        for (namespace, key, value) in staged {
            self.provenance
                .insert(FieldKey::new(namespace, key.clone()), rule.id.clone());
            self.combined.namespace_mut(namespace).insert(key, value);
        }
        self.combined.active_rules.push(rule.id.clone());

        Ok(written)
    }

    /// Number of rules merged so far.
    pub fn merged_count(&self) -> usize {
        self.combined.active_rules.len()
    }

    /// Finish merging.
    pub fn finish(self) -> (CombinedAdaptation, BTreeMap<FieldKey, String>) {
        (self.combined, self.provenance)
    }
}

/// Explain which rule owns a field, for audit output.
pub fn explain_field(
    field: &FieldKey,
    provenance: &BTreeMap<FieldKey, String>,
    candidates: &[&AdaptationRule],
) -> String {
    let proposers: Vec<_> = candidates
        .iter()
        .filter(|r| r.patch.namespace(field.namespace).contains_key(&field.key))
        .collect();

    match provenance.get(field) {
        None => format!("Field '{field}' is not set by any active rule."),
        Some(owner) if proposers.len() <= 1 => {
            format!("Field '{field}' set by '{owner}' without conflict.")
        }
        Some(owner) => {
            let mut explanation = format!(
                "Field '{}' proposed by {} rules:\n",
                field,
                proposers.len()
            );
            for rule in proposers {
                explanation.push_str(&format!("  - {} (priority {})\n", rule.id, rule.priority));
            }
            explanation.push_str(&format!("\nResolution: '{owner}' wrote first.\n"));
            explanation
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::RuleCondition;
    use crate::types::AdaptationPatch;

    fn exploding(_: &AdaptationContext) -> Result<FieldValue, RuleEvaluationError> {
        Err(RuleEvaluationError::DerivationFailed {
            field: "greeting".to_string(),
            reason: "boom".to_string(),
        })
    }

    #[test]
    fn test_first_writer_wins() {
        let high = AdaptationRule::new("high", 10, RuleCondition::Always)
            .with_patch(AdaptationPatch::new().content("language", "formal-id"));
        let low = AdaptationRule::new("low", 5, RuleCondition::Always).with_patch(
            AdaptationPatch::new()
                .content("language", "casual-id")
                .ui("theme", "bright"),
        );

        let context = AdaptationContext::default();
        let mut merger = PatchMerger::new();
        assert_eq!(merger.apply(&high, &context).unwrap(), 1);
        assert_eq!(merger.apply(&low, &context).unwrap(), 1);

        let (combined, provenance) = merger.finish();
        assert_eq!(
            combined.get(Namespace::Content, "language").and_then(FieldValue::as_str),
            Some("formal-id")
        );
        assert_eq!(
            combined.get(Namespace::Ui, "theme").and_then(FieldValue::as_str),
            Some("bright")
        );
        assert_eq!(provenance[&FieldKey::new(Namespace::Content, "language")], "high");
        assert_eq!(combined.active_rules, vec!["high", "low"]);
    }

    #[test]
    fn test_shadowed_derived_field_is_not_evaluated() {
        let high = AdaptationRule::new("high", 10, RuleCondition::Always)
            .with_patch(AdaptationPatch::new().content("greeting", "Halo"));
        let low = AdaptationRule::new("low", 5, RuleCondition::Always)
            .with_patch(AdaptationPatch::new().derived_content("greeting", exploding));

        let context = AdaptationContext::default();
        let mut merger = PatchMerger::new();
        merger.apply(&high, &context).unwrap();
        assert_eq!(merger.apply(&low, &context).unwrap(), 0);
        assert_eq!(merger.merged_count(), 2);
    }

    #[test]
    fn test_failed_patch_commits_nothing() {
        let bad = AdaptationRule::new("bad", 10, RuleCondition::Always).with_patch(
            AdaptationPatch::new()
                .ui("theme", "dark")
                .derived_content("greeting", exploding),
        );

        let context = AdaptationContext::default();
        let mut merger = PatchMerger::new();
        assert!(merger.apply(&bad, &context).is_err());

        let (combined, provenance) = merger.finish();
        assert!(combined.is_empty());
        assert!(provenance.is_empty());
    }

    #[test]
    fn test_explain_field() {
        let high = AdaptationRule::new("high", 10, RuleCondition::Always)
            .with_patch(AdaptationPatch::new().content("language", "formal-id"));
        let low = AdaptationRule::new("low", 5, RuleCondition::Always)
            .with_patch(AdaptationPatch::new().content("language", "casual-id"));

        let context = AdaptationContext::default();
        let mut merger = PatchMerger::new();
        merger.apply(&high, &context).unwrap();
        merger.apply(&low, &context).unwrap();
        let (_, provenance) = merger.finish();

        let field = FieldKey::new(Namespace::Content, "language");
        let explanation = explain_field(&field, &provenance, &[&high, &low]);
        assert!(explanation.contains("proposed by 2 rules"));
        assert!(explanation.contains("'high' wrote first"));
    }
}
