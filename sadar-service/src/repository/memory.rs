//! In-memory repository for tests and offline use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use recommendation::{CompletionRecord, ContentProfile};

use super::traits::*;

/// Repository holding everything in memory.
///
/// Counts calls and can be switched off to simulate an outage.
pub struct InMemoryRepository {
    catalog: RwLock<Vec<ContentProfile>>,
    completions: RwLock<HashMap<String, Vec<CompletionRecord>>>,
    available: AtomicBool,
    call_count: AtomicU32,
}

impl InMemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(Vec::new()),
            completions: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            call_count: AtomicU32::new(0),
        }
    }

    /// Seed the content catalog.
    pub fn with_catalog(mut self, catalog: Vec<ContentProfile>) -> Self {
        self.catalog = RwLock::new(catalog);
        self
    }

    /// Seed completion records.
    pub fn with_completions(mut self, records: Vec<CompletionRecord>) -> Self {
        let mut by_user: HashMap<String, Vec<CompletionRecord>> = HashMap::new();
        for record in records {
            by_user.entry(record.user_id.clone()).or_default().push(record);
        }
        self.completions = RwLock::new(by_user);
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.set_available(available);
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of repository calls served or refused.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<(), RepositoryError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepositoryError::Unavailable("In-memory repository disabled".to_string()))
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    fn id(&self) -> &str {
        "in-memory"
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn fetch_catalog(&self) -> Result<Vec<ContentProfile>, RepositoryError> {
        self.begin_call()?;
        Ok(self.catalog.read().await.clone())
    }

    async fn fetch_completions(&self, user_id: &str) -> Result<Vec<CompletionRecord>, RepositoryError> {
        self.begin_call()?;
        let completions = self.completions.read().await;
        let mut records = completions.get(user_id).cloned().unwrap_or_default();
        records.sort_by_key(|r| r.started_at);
        Ok(records)
    }

    async fn record_completion(&self, record: &CompletionRecord) -> Result<(), RepositoryError> {
        self.begin_call()?;

        let known = self
            .catalog
            .read()
            .await
            .iter()
            .any(|item| item.id == record.content_id);
        if !known {
            return Err(RepositoryError::NotFound(format!(
                "content '{}'",
                record.content_id
            )));
        }

        self.completions
            .write()
            .await
            .entry(record.user_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use recommendation::Difficulty;

    fn record(user: &str, content: &str, hour: u32) -> CompletionRecord {
        CompletionRecord {
            user_id: user.to_string(),
            content_id: content.to_string(),
            completed: true,
            duration_minutes: 10,
            started_at: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_completions_are_per_user_and_ordered() {
        let repo = InMemoryRepository::new().with_completions(vec![
            record("a", "x", 9),
            record("b", "x", 8),
            record("a", "y", 7),
        ]);

        let records = repo.fetch_completions("a").await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.content_id.as_str()).collect();
        assert_eq!(ids, ["y", "x"]);
        assert!(repo.fetch_completions("nobody").await.unwrap().is_empty());
        assert_eq!(repo.call_count(), 2);
    }

    #[tokio::test]
    async fn test_record_requires_known_content() {
        let repo = InMemoryRepository::new()
            .with_catalog(vec![ContentProfile::new("x", "sleep", Difficulty::Pemula, 10)]);

        repo.record_completion(&record("a", "x", 9)).await.unwrap();
        let result = repo.record_completion(&record("a", "missing", 9)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
        assert_eq!(repo.fetch_completions("a").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let repo = InMemoryRepository::new().with_available(false);
        assert!(!repo.is_available().await);
        assert!(matches!(
            repo.fetch_catalog().await,
            Err(RepositoryError::Unavailable(_))
        ));
        assert_eq!(repo.call_count(), 1);
    }
}
