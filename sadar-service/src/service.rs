//! PersonalizationService - main entry point for personalization.
//!
//! Wraps the synchronous adaptation and recommendation core with the I/O it
//! needs: content and history come from a repository, and per-user
//! adaptation state is kept in memory.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use adaptation::{
    default_catalog, AdaptationChangeEvent, AdaptationContext, AdaptationError, ChangeDetection,
    ChangeNotifier, CombinedAdaptation, Evaluation, Mood, ProgressivePersonalizationEngine,
    RuleCatalog, RuleEvaluator, TimeOfDay, UnlockEvent,
};
use recommendation::{
    ColdStartScorer, CompletionRecord, PreferenceAggregator, Recommendation, RecommendationError,
    RecommendationRequest, RecommendationScorer, UserPreferenceProfile,
};

use crate::config::ServiceConfig;
use crate::repository::{ContentRepository, RepositoryError};

/// Error types for the service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Repository error
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Adaptation configuration error
    #[error("Adaptation error: {0}")]
    Adaptation(#[from] AdaptationError),

    /// Recommendation configuration error
    #[error("Recommendation error: {0}")]
    Recommendation(#[from] RecommendationError),

    /// Invalid service configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration could not be parsed
    #[error("Configuration parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Adaptation state kept per user.
struct UserState {
    previous: Option<CombinedAdaptation>,
    notifier: ChangeNotifier,
    progressive: ProgressivePersonalizationEngine,
}

/// Result of adapting the app for one context.
#[derive(Debug, Clone)]
pub struct AdaptationOutcome {
    /// Merged rule output
    pub evaluation: Evaluation,
    /// Change against the user's previous adaptation
    pub change: ChangeDetection,
    /// Milestones reached by this context
    pub unlocks: Vec<UnlockEvent>,
    /// Every feature unlocked so far
    pub unlocked_features: BTreeSet<String>,
}

/// Options for one recommendation call.
#[derive(Debug, Clone, Default)]
pub struct RecommendOptions {
    /// Maximum recommendations; the configured default when unset
    pub limit: Option<usize>,
    pub time_of_day: Option<TimeOfDay>,
    pub mood: Option<Mood>,
}

/// Recommendations and how they were produced.
#[derive(Debug, Clone)]
pub struct RecommendationSet {
    pub recommendations: Vec<Recommendation>,
    /// True when the user had no completed sessions
    pub cold_start: bool,
    /// Aggregated preferences; absent for cold start
    pub profile: Option<UserPreferenceProfile>,
}

/// Main entry point for personalization.
///
/// Adaptation state is held in memory for every user passed to `adapt` and
/// is never evicted automatically. Callers own eviction: call `reset_user`
/// when a session ends or the user signs out, and watch `tracked_users`.
pub struct PersonalizationService {
    /// Configuration
    config: ServiceConfig,
    /// Content and history source
    repository: Arc<dyn ContentRepository>,
    /// Adaptation rules
    catalog: Arc<RuleCatalog>,
    evaluator: RuleEvaluator,
    scorer: RecommendationScorer,
    cold_start: ColdStartScorer,
    aggregator: PreferenceAggregator,
    /// Per-user adaptation state, kept until `reset_user`
    users: DashMap<String, UserState>,
}

impl PersonalizationService {
    /// Create a service with default configuration.
    pub fn new(repository: Arc<dyn ContentRepository>) -> Self {
        Self::build(repository, ServiceConfig::default())
    }

    /// Create a service with validated configuration.
    pub fn with_config(
        repository: Arc<dyn ContentRepository>,
        config: ServiceConfig,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        Ok(Self::build(repository, config))
    }

    fn build(repository: Arc<dyn ContentRepository>, config: ServiceConfig) -> Self {
        info!(repository = %repository.id(), "Creating PersonalizationService");

        Self {
            evaluator: config.adaptation.evaluator(),
            scorer: RecommendationScorer::with_config(&config.scorer),
            cold_start: ColdStartScorer::new(
                config.scorer.cold_start.clone(),
                config.scorer.trending.clone(),
            ),
            aggregator: PreferenceAggregator::with_config(config.aggregator.clone()),
            catalog: Arc::new(default_catalog().clone()),
            users: DashMap::new(),
            repository,
            config,
        }
    }

    /// Builder: replace the rule catalog.
    pub fn with_catalog(mut self, catalog: RuleCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Evaluate adaptation rules for a user and track what changed.
    pub fn adapt(&self, user_id: &str, context: &AdaptationContext) -> AdaptationOutcome {
        let evaluation = self.evaluator.evaluate(context, &self.catalog);

        let mut entry = self.users.entry(user_id.to_string()).or_insert_with(|| UserState {
            previous: None,
            notifier: self.config.adaptation.notifier(),
            progressive: self.config.adaptation.progressive_engine(),
        });
        let state = entry.value_mut();

        let catalog = &self.catalog;
        let change = state.notifier.observe_with(
            state.previous.as_ref(),
            &evaluation.combined,
            |rule_id| catalog.get(rule_id).map(|rule| rule.description.clone()),
        );
        let unlocks = state.progressive.evaluate(context);
        let unlocked_features = state.progressive.unlocked_features();
        state.previous = Some(evaluation.combined.clone());

        debug!(
            user_id = %user_id,
            active = evaluation.active_rules().len(),
            changed = change.changed,
            unlocked = unlocks.len(),
            "Adaptation computed"
        );

        AdaptationOutcome {
            evaluation,
            change,
            unlocks,
            unlocked_features,
        }
    }

    /// Recommend content for a user.
    pub async fn recommend(
        &self,
        user_id: &str,
        options: RecommendOptions,
    ) -> Result<RecommendationSet, ServiceError> {
        let limit = options.limit.unwrap_or(self.config.default_limit);

        let (catalog, records) = tokio::try_join!(
            self.repository.fetch_catalog(),
            self.repository.fetch_completions(user_id)
        )?;

        let completed: HashSet<String> = records
            .iter()
            .filter(|r| r.completed)
            .map(|r| r.content_id.clone())
            .collect();

        if completed.is_empty() {
            let recommendations = self.cold_start.score(&catalog, limit);
            debug!(
                user_id = %user_id,
                returned = recommendations.len(),
                "Cold-start recommendations"
            );
            return Ok(RecommendationSet {
                recommendations,
                cold_start: true,
                profile: None,
            });
        }

        let profile = self.aggregator.aggregate(&records, &catalog);
        let request = RecommendationRequest {
            exclude_ids: completed,
            limit,
            time_of_day: options.time_of_day,
            mood: options.mood,
        };
        let recommendations = self.scorer.score(&profile, &catalog, &request);

        debug!(
            user_id = %user_id,
            completed = request.exclude_ids.len(),
            returned = recommendations.len(),
            "Recommendations computed"
        );

        Ok(RecommendationSet {
            recommendations,
            cold_start: false,
            profile: Some(profile),
        })
    }

    /// Persist a session record.
    pub async fn record_completion(&self, record: CompletionRecord) -> Result<(), ServiceError> {
        if let Err(e) = self.repository.record_completion(&record).await {
            warn!(
                user_id = %record.user_id,
                content_id = %record.content_id,
                error = %e,
                "Failed to record completion"
            );
            return Err(e.into());
        }

        info!(
            user_id = %record.user_id,
            content_id = %record.content_id,
            completed = record.completed,
            "Completion recorded"
        );
        Ok(())
    }

    /// Most recent adaptation changes for a user, newest first.
    pub fn change_history(&self, user_id: &str) -> Vec<AdaptationChangeEvent> {
        self.users
            .get(user_id)
            .map(|state| state.notifier.recent(state.notifier.history().capacity()))
            .unwrap_or_default()
    }

    /// Most recent unlocks for a user, newest first.
    pub fn unlock_history(&self, user_id: &str) -> Vec<UnlockEvent> {
        let capacity = self.config.adaptation.notifier.history_capacity;
        self.users
            .get(user_id)
            .map(|state| state.progressive.recent(capacity))
            .unwrap_or_default()
    }

    /// Forget a user's adaptation state.
    pub fn reset_user(&self, user_id: &str) -> bool {
        let removed = self.users.remove(user_id).is_some();
        if removed {
            debug!(user_id = %user_id, remaining = self.users.len(), "User state evicted");
        }
        removed
    }

    /// Number of users with adaptation state in memory.
    pub fn tracked_users(&self) -> usize {
        self.users.len()
    }

    /// Check if the repository is reachable.
    pub async fn is_available(&self) -> bool {
        self.repository.is_available().await
    }
}
