//! Core types for the adaptation engine.
//!
//! These types model the context a rule is evaluated against, the patches
//! rules contribute, and the combined output handed to the presentation layer.
//!
//! With the `typescript` feature enabled, the output types can be exported to
//! TypeScript using ts-rs for consistency with the web frontend.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::condition::RuleCondition;

/// Spiritual tradition declared during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum SpiritualTradition {
    Islam,
    Kristen,
    Katolik,
    Hindu,
    Buddha,
    Konghucu,
    Kejawen,
    /// Prefers secular, non-religious practice
    Secular,
}

/// Home region of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Jawa,
    Sumatra,
    Bali,
    Kalimantan,
    Sulawesi,
    NusaTenggara,
    Maluku,
    Papua,
}

/// Household the user practices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum FamilyContext {
    Single,
    Couple,
    NuclearFamily,
    ExtendedFamily,
}

/// Self-reported mood at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Calm,
    Happy,
    Energetic,
    Tired,
    Stressed,
    Anxious,
    Sad,
}

/// Time-of-day bucket.
///
/// Always computed by the caller; nothing in this crate reads the clock while
/// evaluating rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    /// 03:00-05:59, around subuh
    EarlyMorning,
    /// 06:00-10:59
    Morning,
    /// 11:00-13:59
    Midday,
    /// 14:00-17:59
    Afternoon,
    /// 18:00-20:59
    Evening,
    /// 21:00-02:59
    Night,
}

impl TimeOfDay {
    /// Bucket a local wall-clock hour (0-23). Hours past 23 wrap.
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            3..=5 => Self::EarlyMorning,
            6..=10 => Self::Morning,
            11..=13 => Self::Midday,
            14..=17 => Self::Afternoon,
            18..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    /// All buckets in chronological order starting at early morning.
    pub fn all() -> [Self; 6] {
        [
            Self::EarlyMorning,
            Self::Morning,
            Self::Midday,
            Self::Afternoon,
            Self::Evening,
            Self::Night,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EarlyMorning => "early_morning",
            Self::Morning => "morning",
            Self::Midday => "midday",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }
}

impl Default for TimeOfDay {
    fn default() -> Self {
        Self::Morning
    }
}

/// Holidays that change the tone of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Holiday {
    Ramadan,
    IdulFitri,
    Nyepi,
    Natal,
    Waisak,
    Imlek,
    HariKemerdekaan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Hot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum SocialSetting {
    Alone,
    WithFamily,
    Public,
    Workplace,
}

/// Cultural facts collected during onboarding. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CulturalProfile {
    pub spiritual_tradition: Option<SpiritualTradition>,
    pub region: Option<Region>,
    pub family_context: Option<FamilyContext>,
}

/// Counters and lists summarizing past sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHistory {
    /// Number of completed sessions
    pub completed_sessions: u32,
    /// Consecutive days with at least one session
    pub current_streak_days: u32,
    /// Total minutes practiced
    pub total_minutes: u32,
    /// Categories the user returns to most
    pub favorite_categories: Vec<String>,
    /// Practice ids from the most recent sessions
    pub recent_practices: Vec<String>,
}

/// Signals that change from moment to moment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealTimeFlags {
    pub holiday: Option<Holiday>,
    pub weather: Option<Weather>,
    pub social_setting: Option<SocialSetting>,
}

/// Snapshot of everything a rule may look at for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptationContext {
    pub cultural: CulturalProfile,
    pub mood: Option<Mood>,
    pub time_of_day: TimeOfDay,
    pub history: SessionHistory,
    pub real_time: RealTimeFlags,
}

impl AdaptationContext {
    /// Create a context for the given time bucket with everything else empty.
    pub fn at(time_of_day: TimeOfDay) -> Self {
        Self {
            time_of_day,
            ..Default::default()
        }
    }

    /// Builder: set spiritual tradition.
    pub fn with_tradition(mut self, tradition: SpiritualTradition) -> Self {
        self.cultural.spiritual_tradition = Some(tradition);
        self
    }

    /// Builder: set region.
    pub fn with_region(mut self, region: Region) -> Self {
        self.cultural.region = Some(region);
        self
    }

    /// Builder: set family context.
    pub fn with_family(mut self, family: FamilyContext) -> Self {
        self.cultural.family_context = Some(family);
        self
    }

    /// Builder: set mood.
    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    /// Builder: set session history.
    pub fn with_history(mut self, history: SessionHistory) -> Self {
        self.history = history;
        self
    }

    /// Builder: set holiday.
    pub fn with_holiday(mut self, holiday: Holiday) -> Self {
        self.real_time.holiday = Some(holiday);
        self
    }

    /// Builder: set weather.
    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.real_time.weather = Some(weather);
        self
    }

    /// Builder: set social setting.
    pub fn with_social_setting(mut self, setting: SocialSetting) -> Self {
        self.real_time.social_setting = Some(setting);
        self
    }
}

/// A primitive value surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => write!(f, "[{}]", items.join(",")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Computes a field value from the context. Must be pure.
pub type DeriveFn = fn(&AdaptationContext) -> Result<FieldValue, RuleEvaluationError>;

/// A field in a patch: either fixed or computed from the context.
#[derive(Clone)]
pub enum PatchField {
    Literal(FieldValue),
    Derived(DeriveFn),
}

impl fmt::Debug for PatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl PatchField {
    /// Resolve the field against a context.
    pub fn resolve(&self, context: &AdaptationContext) -> Result<FieldValue, RuleEvaluationError> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Derived(compute) => compute(context),
        }
    }
}

impl From<FieldValue> for PatchField {
    fn from(value: FieldValue) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for PatchField {
    fn from(value: &str) -> Self {
        Self::Literal(value.into())
    }
}

impl From<bool> for PatchField {
    fn from(value: bool) -> Self {
        Self::Literal(value.into())
    }
}

impl From<f64> for PatchField {
    fn from(value: f64) -> Self {
        Self::Literal(value.into())
    }
}

impl From<DeriveFn> for PatchField {
    fn from(compute: DeriveFn) -> Self {
        Self::Derived(compute)
    }
}

/// The three disjoint output namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    Ui,
    Content,
    Behavior,
}

impl Namespace {
    pub fn all() -> [Self; 3] {
        [Self::Ui, Self::Content, Self::Behavior]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ui => "ui",
            Self::Content => "content",
            Self::Behavior => "behavior",
        }
    }
}

/// Partial output a rule contributes when it matches.
#[derive(Debug, Clone, Default)]
pub struct AdaptationPatch {
    pub ui_changes: BTreeMap<String, PatchField>,
    pub content_changes: BTreeMap<String, PatchField>,
    pub behavior_changes: BTreeMap<String, PatchField>,
}

impl AdaptationPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a UI field.
    pub fn ui(mut self, key: impl Into<String>, field: impl Into<PatchField>) -> Self {
        self.ui_changes.insert(key.into(), field.into());
        self
    }

    /// Builder: add a content field.
    pub fn content(mut self, key: impl Into<String>, field: impl Into<PatchField>) -> Self {
        self.content_changes.insert(key.into(), field.into());
        self
    }

    /// Builder: add a behavior field.
    pub fn behavior(mut self, key: impl Into<String>, field: impl Into<PatchField>) -> Self {
        self.behavior_changes.insert(key.into(), field.into());
        self
    }

    /// Builder: add a content field computed from the context.
    pub fn derived_content(mut self, key: impl Into<String>, compute: DeriveFn) -> Self {
        self.content_changes.insert(key.into(), PatchField::Derived(compute));
        self
    }

    /// Fields of one namespace.
    pub fn namespace(&self, namespace: Namespace) -> &BTreeMap<String, PatchField> {
        match namespace {
            Namespace::Ui => &self.ui_changes,
            Namespace::Content => &self.content_changes,
            Namespace::Behavior => &self.behavior_changes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ui_changes.is_empty() && self.content_changes.is_empty() && self.behavior_changes.is_empty()
    }
}

/// An adaptation rule: a condition plus the patch applied when it holds.
#[derive(Debug, Clone)]
pub struct AdaptationRule {
    /// Unique identifier
    pub id: String,
    /// Human-readable description, used in change events
    pub description: String,
    /// Higher priority wins ties and truncation
    pub priority: i32,
    /// When the rule applies
    pub condition: RuleCondition,
    /// What the rule changes
    pub patch: AdaptationPatch,
}

impl AdaptationRule {
    pub fn new(id: impl Into<String>, priority: i32, condition: RuleCondition) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            priority,
            condition,
            patch: AdaptationPatch::default(),
        }
    }

    /// Builder: set the description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set the patch.
    pub fn with_patch(mut self, patch: AdaptationPatch) -> Self {
        self.patch = patch;
        self
    }
}

/// Merged output of every active rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CombinedAdaptation {
    pub ui_changes: BTreeMap<String, FieldValue>,
    pub content_changes: BTreeMap<String, FieldValue>,
    pub behavior_changes: BTreeMap<String, FieldValue>,
    /// Ids of the merged rules, highest priority first
    pub active_rules: Vec<String>,
}

impl CombinedAdaptation {
    /// Fields of one namespace.
    pub fn namespace(&self, namespace: Namespace) -> &BTreeMap<String, FieldValue> {
        match namespace {
            Namespace::Ui => &self.ui_changes,
            Namespace::Content => &self.content_changes,
            Namespace::Behavior => &self.behavior_changes,
        }
    }

    pub(crate) fn namespace_mut(&mut self, namespace: Namespace) -> &mut BTreeMap<String, FieldValue> {
        match namespace {
            Namespace::Ui => &mut self.ui_changes,
            Namespace::Content => &mut self.content_changes,
            Namespace::Behavior => &mut self.behavior_changes,
        }
    }

    /// Look up a resolved field.
    pub fn get(&self, namespace: Namespace, key: &str) -> Option<&FieldValue> {
        self.namespace(namespace).get(key)
    }

    pub fn is_active(&self, rule_id: &str) -> bool {
        self.active_rules.iter().any(|id| id == rule_id)
    }

    pub fn is_empty(&self) -> bool {
        self.active_rules.is_empty()
            && self.ui_changes.is_empty()
            && self.content_changes.is_empty()
            && self.behavior_changes.is_empty()
    }

    /// SHA-256 over the combined output for audit purposes.
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();

        for namespace in Namespace::all() {
            hasher.update(namespace.as_str().as_bytes());
            for (key, value) in self.namespace(namespace) {
                hasher.update(key.as_bytes());
                hasher.update(b"=");
                hasher.update(value.to_string().as_bytes());
                hasher.update(b";");
            }
        }

        for id in &self.active_rules {
            hasher.update(id.as_bytes());
            hasher.update(b",");
        }

        hex::encode(hasher.finalize())
    }
}

/// Failure of a single rule's condition or derived field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleEvaluationError {
    /// The condition could not be evaluated
    #[error("Condition failed: {0}")]
    ConditionFailed(String),

    /// A derived field could not be computed
    #[error("Derivation of '{field}' failed: {reason}")]
    DerivationFailed { field: String, reason: String },
}
