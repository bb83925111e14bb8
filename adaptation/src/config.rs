//! Configuration for the adaptation engine.

use serde::{Deserialize, Serialize};

use crate::catalog::AdaptationError;
use crate::evaluator::{EvaluatorConfig, RuleEvaluator};
use crate::notifier::{ChangeNotifier, DEFAULT_HISTORY_CAPACITY};
use crate::progressive::ProgressivePersonalizationEngine;

/// Configuration for the adaptation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationConfig {
    /// Evaluator configuration
    pub evaluator: EvaluatorConfig,
    /// Change and unlock history configuration
    pub notifier: NotifierConfig,
}

impl AdaptationConfig {
    /// Load config from YAML and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, AdaptationError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, AdaptationError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), AdaptationError> {
        if self.evaluator.max_active == 0 {
            return Err(AdaptationError::InvalidConfiguration(
                "evaluator.max_active must be at least 1".to_string(),
            ));
        }
        if self.notifier.history_capacity == 0 {
            return Err(AdaptationError::InvalidConfiguration(
                "notifier.history_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn evaluator(&self) -> RuleEvaluator {
        RuleEvaluator::with_config(self.evaluator.clone())
    }

    pub fn notifier(&self) -> ChangeNotifier {
        ChangeNotifier::with_capacity(self.notifier.history_capacity)
    }

    pub fn progressive_engine(&self) -> ProgressivePersonalizationEngine {
        ProgressivePersonalizationEngine::new().with_history_capacity(self.notifier.history_capacity)
    }
}

/// History configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Maximum events kept per history
    pub history_capacity: usize,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}
