//! Content repository abstraction.
//!
//! The personalization core never performs I/O; repositories supply the
//! content catalog and completion history it runs on:
//! - REST repository for the hosted database
//! - In-memory repository for tests and offline use

pub mod memory;
pub mod rest;
pub mod traits;

pub use memory::InMemoryRepository;
pub use rest::{RestConfig, RestRepository};
pub use traits::{ContentRepository, RepositoryError};
