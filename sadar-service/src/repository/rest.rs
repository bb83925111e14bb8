//! Repository backed by a PostgREST-style hosted database.
//!
//! Reads `meditation_content` and `session_completions` over HTTP. Every
//! request carries the project key both as `apikey` and as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use recommendation::{CompletionRecord, ContentProfile, Difficulty};

use super::traits::*;

const CONTENT_TABLE: &str = "meditation_content";
const COMPLETIONS_TABLE: &str = "session_completions";

/// Connection settings for the REST repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    /// Project URL, without the `/rest/v1` suffix
    pub base_url: String,
    /// Project API key; usually supplied through the environment
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

/// Row of `meditation_content`.
#[derive(Debug, Deserialize)]
struct ContentRow {
    id: String,
    #[serde(default)]
    title: Option<String>,
    category: String,
    difficulty_level: String,
    duration_minutes: u32,
    #[serde(default)]
    instructor_id: Option<String>,
    #[serde(default)]
    completion_count: Option<u64>,
    #[serde(default)]
    average_rating: Option<f64>,
}

impl ContentRow {
    fn into_profile(self) -> Option<ContentProfile> {
        let Some(difficulty) = Difficulty::from_label(&self.difficulty_level) else {
            warn!(
                content_id = %self.id,
                difficulty = %self.difficulty_level,
                "Skipping content with unknown difficulty"
            );
            return None;
        };

        let mut profile = ContentProfile::new(self.id, self.category, difficulty, self.duration_minutes)
            .with_title(self.title.unwrap_or_default())
            .with_stats(
                self.completion_count.unwrap_or(0),
                self.average_rating.unwrap_or(0.0),
            );
        profile.instructor_id = self.instructor_id;
        Some(profile)
    }
}

/// Row of `session_completions`.
#[derive(Debug, Serialize, Deserialize)]
struct CompletionRow {
    user_id: String,
    content_id: String,
    completed: bool,
    #[serde(default)]
    duration_minutes: Option<u32>,
    started_at: DateTime<Utc>,
}

impl From<CompletionRow> for CompletionRecord {
    fn from(row: CompletionRow) -> Self {
        Self {
            user_id: row.user_id,
            content_id: row.content_id,
            completed: row.completed,
            duration_minutes: row.duration_minutes.unwrap_or(0),
            started_at: row.started_at,
        }
    }
}

impl From<&CompletionRecord> for CompletionRow {
    fn from(record: &CompletionRecord) -> Self {
        Self {
            user_id: record.user_id.clone(),
            content_id: record.content_id.clone(),
            completed: record.completed,
            duration_minutes: Some(record.duration_minutes),
            started_at: record.started_at,
        }
    }
}

/// REST repository.
pub struct RestRepository {
    client: Client,
    base_url: String,
}

impl RestRepository {
    /// Create a repository from connection settings.
    pub fn new(config: &RestConfig) -> Result<Self, RepositoryError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if let Some(key) = &config.api_key {
            let invalid = |_| RepositoryError::Unavailable("API key is not a valid header value".to_string());
            headers.insert("apikey", header::HeaderValue::from_str(key).map_err(invalid)?);
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {key}")).map_err(invalid)?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Map non-2xx responses to errors.
    async fn check(response: Response) -> Result<Response, RepositoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(body));
        }
        Err(RepositoryError::RequestFailed(format!("HTTP {}: {}", status, body)))
    }
}

#[async_trait]
impl ContentRepository for RestRepository {
    fn id(&self) -> &str {
        &self.base_url
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(self.table_url(CONTENT_TABLE))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn fetch_catalog(&self) -> Result<Vec<ContentProfile>, RepositoryError> {
        let response = self
            .client
            .get(self.table_url(CONTENT_TABLE))
            .query(&[("select", "*")])
            .send()
            .await
            .map_err(|e| RepositoryError::NetworkError(e.to_string()))?;

        let rows: Vec<ContentRow> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::ParseError(e.to_string()))?;

        let total = rows.len();
        let catalog: Vec<_> = rows.into_iter().filter_map(ContentRow::into_profile).collect();
        debug!(rows = total, items = catalog.len(), "Fetched content catalog");
        Ok(catalog)
    }

    async fn fetch_completions(&self, user_id: &str) -> Result<Vec<CompletionRecord>, RepositoryError> {
        let user_filter = format!("eq.{user_id}");
        let response = self
            .client
            .get(self.table_url(COMPLETIONS_TABLE))
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("order", "started_at.asc"),
            ])
            .send()
            .await
            .map_err(|e| RepositoryError::NetworkError(e.to_string()))?;

        let rows: Vec<CompletionRow> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::ParseError(e.to_string()))?;

        debug!(user_id = %user_id, records = rows.len(), "Fetched completions");
        Ok(rows.into_iter().map(CompletionRecord::from).collect())
    }

    async fn record_completion(&self, record: &CompletionRecord) -> Result<(), RepositoryError> {
        let response = self
            .client
            .post(self.table_url(COMPLETIONS_TABLE))
            .header("Prefer", "return=minimal")
            .json(&CompletionRow::from(record))
            .send()
            .await
            .map_err(|e| RepositoryError::NetworkError(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_mapping() {
        let row: ContentRow = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "title": "Napas Pagi",
            "category": "breathing",
            "difficulty_level": "Beginner",
            "duration_minutes": 5,
            "instructor_id": null,
            "completion_count": 12,
            "average_rating": 4.5
        }))
        .unwrap();

        let profile = row.into_profile().unwrap();
        assert_eq!(profile.difficulty, Difficulty::Pemula);
        assert_eq!(profile.title, "Napas Pagi");
        assert_eq!(profile.completion_count, 12);
        assert_eq!(profile.instructor_id, None);
    }

    #[test]
    fn test_unknown_difficulty_skipped() {
        let row: ContentRow = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "category": "breathing",
            "difficulty_level": "expert",
            "duration_minutes": 5
        }))
        .unwrap();
        assert!(row.into_profile().is_none());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let repo = RestRepository::new(&RestConfig {
            base_url: "https://project.example.co/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            repo.table_url(CONTENT_TABLE),
            "https://project.example.co/rest/v1/meditation_content"
        );
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let config = RestConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("secret"));
    }
}
