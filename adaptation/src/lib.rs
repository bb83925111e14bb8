//! Cultural adaptation engine for Sadar
//!
//! Turns who the user is and what is happening right now into a set of UI,
//! content and behavior changes:
//!
//! - **Spiritual**: tradition-specific language, greetings and practice tracks
//! - **Temporal**: subuh, morning, midday, evening and night sessions
//! - **Mood**: stress relief, compassion and rest
//! - **Social**: holidays, family sessions, public and workplace settings
//!
//! # Key Components
//!
//! - [`RuleCatalog`]: Immutable, priority-ordered list of rules
//! - [`RuleEvaluator`]: Filters, orders and merges matching rules
//! - [`ChangeNotifier`]: Detects changes between successive adaptations
//! - [`ProgressivePersonalizationEngine`]: Unlocks features at milestones
//!
//! # Example
//!
//! ```ignore
//! use adaptation::{default_catalog, evaluate_adaptations, AdaptationContext, TimeOfDay};
//!
//! let context = AdaptationContext::at(TimeOfDay::from_hour(7))
//!     .with_tradition(SpiritualTradition::Islam);
//!
//! let evaluation = evaluate_adaptations(&context, default_catalog(), 5);
//! println!("{:?}", evaluation.active_rules());
//! ```

pub mod catalog;
pub mod condition;
pub mod config;
pub mod evaluator;
pub mod merge;
pub mod notifier;
pub mod progressive;
pub mod rules;
pub mod types;

// Re-export main types
pub use catalog::{default_catalog, AdaptationError, RuleCatalog};
pub use condition::RuleCondition;
pub use config::{AdaptationConfig, NotifierConfig};
pub use evaluator::{evaluate_adaptations, Evaluation, EvaluatorConfig, RuleEvaluator, RuleFailure};
pub use merge::{explain_field, FieldKey};
pub use notifier::{detect_change, AdaptationChangeEvent, ChangeDetection, ChangeNotifier};
pub use progressive::{Milestone, ProgressivePersonalizationEngine, UnlockEvent};
pub use rules::{RuleGroup, RuleProvider};
pub use types::*;
