//! The immutable rule catalog.
//!
//! A catalog is built once and only read afterwards. The default catalog is
//! a process-wide static assembled from the built-in rule providers.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::rules::{default_providers, RuleProvider};
use crate::types::AdaptationRule;

/// Error types for catalog and configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum AdaptationError {
    /// Two rules share an id
    #[error("Duplicate rule id: {0}")]
    DuplicateRuleId(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration could not be parsed
    #[error("Configuration parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

static DEFAULT_CATALOG: OnceLock<RuleCatalog> = OnceLock::new();

/// The default catalog built from every built-in provider.
pub fn default_catalog() -> &'static RuleCatalog {
    DEFAULT_CATALOG.get_or_init(|| RuleCatalog::assemble(&default_providers()))
}

/// Ordered, immutable list of adaptation rules.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: Vec<AdaptationRule>,
}

impl RuleCatalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(rules: Vec<AdaptationRule>) -> Result<Self, AdaptationError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(AdaptationError::DuplicateRuleId(rule.id.clone()));
            }
        }
        Ok(Self { rules })
    }

    /// Build a catalog from providers in order. A rule whose id is already
    /// taken is dropped with a warning.
    pub fn assemble(providers: &[Box<dyn RuleProvider>]) -> Self {
        let mut seen = HashSet::new();
        let mut rules = Vec::new();

        for provider in providers {
            for rule in provider.rules() {
                if seen.insert(rule.id.clone()) {
                    rules.push(rule);
                } else {
                    tracing::warn!(
                        rule_id = %rule.id,
                        group = provider.group().as_str(),
                        "Dropping rule with duplicate id"
                    );
                }
            }
        }

        tracing::debug!(rule_count = rules.len(), "Assembled rule catalog");
        Self { rules }
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[AdaptationRule] {
        &self.rules
    }

    /// Look up a rule by id.
    pub fn get(&self, id: &str) -> Option<&AdaptationRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::RuleCondition;

    #[test]
    fn test_default_catalog_has_unique_ids() {
        let catalog = default_catalog();
        assert!(!catalog.is_empty());

        let ids: HashSet<_> = catalog.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
        assert!(catalog.get("islamic-prayer-integration").is_some());
        assert!(catalog.get("morning-energy-adaptation").is_some());
    }

    #[test]
    fn test_default_catalog_is_shared() {
        assert!(std::ptr::eq(default_catalog(), default_catalog()));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let rules = vec![
            AdaptationRule::new("same", 1, RuleCondition::Always),
            AdaptationRule::new("same", 2, RuleCondition::Always),
        ];
        let result = RuleCatalog::new(rules);
        assert!(matches!(result, Err(AdaptationError::DuplicateRuleId(id)) if id == "same"));
    }
}
