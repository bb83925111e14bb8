//! Sadar Personalization Service
//!
//! Connects the adaptation and recommendation cores to stored content and
//! session history:
//! - Repository trait with REST (hosted database) and in-memory backends
//! - Per-user change tracking and milestone unlocks
//! - Cold-start handling for users without completed sessions
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        PersonalizationService           │
//! │  (adapt / recommend / record)           │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌──────────────────┐
//! │ Content     │       │ adaptation +     │
//! │ Repository  │       │ recommendation   │
//! │ (REST/Mem)  │       │                  │
//! └─────────────┘       └──────────────────┘
//! ```

pub mod config;
pub mod repository;
pub mod service;

// Re-export main types for convenience
pub use config::{ServiceConfig, API_KEY_ENV, BASE_URL_ENV};
pub use repository::{
    ContentRepository, InMemoryRepository, RepositoryError, RestConfig, RestRepository,
};
pub use service::{
    AdaptationOutcome, PersonalizationService, RecommendOptions, RecommendationSet, ServiceError,
};
