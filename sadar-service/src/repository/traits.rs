//! Repository trait and common types.

use async_trait::async_trait;

use recommendation::{CompletionRecord, ContentProfile};

/// Error types for repository operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    /// Repository is not available
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    /// Request was rejected
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Referenced row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response could not be decoded
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Source of content and completion history.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Identifier for logging.
    fn id(&self) -> &str;

    /// Check if the repository can serve requests.
    async fn is_available(&self) -> bool;

    /// Fetch the full content catalog.
    async fn fetch_catalog(&self) -> Result<Vec<ContentProfile>, RepositoryError>;

    /// Fetch every session a user started, oldest first.
    async fn fetch_completions(&self, user_id: &str) -> Result<Vec<CompletionRecord>, RepositoryError>;

    /// Persist a session record.
    async fn record_completion(&self, record: &CompletionRecord) -> Result<(), RepositoryError>;
}
