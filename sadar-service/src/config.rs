//! Service configuration.

use serde::{Deserialize, Serialize};

use adaptation::AdaptationConfig;
use recommendation::{AggregatorConfig, ScorerConfig};

use crate::repository::RestConfig;
use crate::service::ServiceError;

/// Environment variable holding the REST API key.
pub const API_KEY_ENV: &str = "SADAR_REST_API_KEY";
/// Environment variable overriding the REST base URL.
pub const BASE_URL_ENV: &str = "SADAR_REST_URL";

/// Configuration for the personalization service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Rule evaluation and history settings
    pub adaptation: AdaptationConfig,
    /// Recommendation scoring settings
    pub scorer: ScorerConfig,
    /// Preference aggregation settings
    pub aggregator: AggregatorConfig,
    /// Hosted database connection
    pub repository: RestConfig,
    /// Recommendations returned when the caller gives no limit
    pub default_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            adaptation: AdaptationConfig::default(),
            scorer: ScorerConfig::default(),
            aggregator: AggregatorConfig::default(),
            repository: RestConfig::default(),
            default_limit: 10,
        }
    }
}

impl ServiceConfig {
    /// Load config from YAML and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, ServiceError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML. The API key is never written out.
    pub fn to_yaml(&self) -> Result<String, ServiceError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply environment overrides for the REST connection.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.repository.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.is_empty() {
                self.repository.base_url = url;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        self.adaptation.validate()?;
        self.scorer.validate()?;
        self.aggregator.validate()?;
        if self.default_limit == 0 {
            return Err(ServiceError::InvalidConfiguration(
                "default_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
