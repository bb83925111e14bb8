//! Built-in adaptation rules.
//!
//! Each provider contributes the rules for one concern. The default catalog
//! is assembled from all of them once per process.

pub mod mood;
pub mod social;
pub mod spiritual;
pub mod temporal;

pub use mood::MoodRules;
pub use social::SocialRules;
pub use spiritual::SpiritualRules;
pub use temporal::TemporalRules;

use serde::{Deserialize, Serialize};

use crate::types::AdaptationRule;

/// Concern a group of rules addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleGroup {
    Spiritual,
    Temporal,
    Mood,
    Social,
}

impl RuleGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spiritual => "spiritual",
            Self::Temporal => "temporal",
            Self::Mood => "mood",
            Self::Social => "social",
        }
    }
}

/// Trait for concern-specific rule sets.
pub trait RuleProvider: Send + Sync {
    /// The concern this provider handles
    fn group(&self) -> RuleGroup;

    /// Rules in declaration order
    fn rules(&self) -> Vec<AdaptationRule>;
}

/// Providers that make up the default catalog, in declaration order.
pub fn default_providers() -> Vec<Box<dyn RuleProvider>> {
    vec![
        Box::new(SpiritualRules),
        Box::new(TemporalRules),
        Box::new(MoodRules),
        Box::new(SocialRules),
    ]
}
