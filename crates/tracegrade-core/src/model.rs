//! Core data model types for tracegrade.
//!
//! These are the values that flow through the evaluation pipeline: normalized
//! session events, the raw feature vector, the four behavioral metrics, the AI
//! usage report, fuzzy scoring output, and the final summary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The five kinds of candidate action the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Run,
    Edit,
    AiQuery,
    Paste,
    SelfExplanation,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Run => "run",
            EventType::Edit => "edit",
            EventType::AiQuery => "ai_query",
            EventType::Paste => "paste",
            EventType::SelfExplanation => "self_explanation",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    /// Exact, case-sensitive match on the canonical names only. Vocabulary
    /// variants are mapped by the ingestor before this is called.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run" => Ok(EventType::Run),
            "edit" => Ok(EventType::Edit),
            "ai_query" => Ok(EventType::AiQuery),
            "paste" => Ok(EventType::Paste),
            "self_explanation" => Ok(EventType::SelfExplanation),
            other => Err(format!("unknown event type: {other}")),
        }
    }
}

/// A single normalized, timestamped candidate action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "event_type")]
    pub kind: EventType,
    /// Always a mapping after ingestion.
    #[serde(default)]
    pub payload: Map<String, Value>,
    /// Seconds; epoch seconds when the source used date/time strings.
    #[serde(default)]
    pub timestamp: f64,
    /// False when the source timestamp was missing or unparsable and
    /// `timestamp` holds the `0.0` placeholder.
    #[serde(default = "timestamp_parsed_default")]
    pub timestamp_parsed: bool,
}

fn timestamp_parsed_default() -> bool {
    true
}

impl Event {
    pub fn new(kind: EventType, timestamp: f64) -> Self {
        Self {
            kind,
            payload: Map::new(),
            timestamp,
            timestamp_parsed: true,
        }
    }

    /// An event whose source timestamp could not be read; it sorts at `0.0`
    /// but does not count towards the session duration.
    pub fn untimed(kind: EventType) -> Self {
        Self {
            timestamp_parsed: false,
            ..Self::new(kind, 0.0)
        }
    }

    /// Builder-style payload field, mostly useful in tests and fixtures.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    /// Looks up a payload field, treating JSON `null` as absent.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key).filter(|v| !v.is_null())
    }

    /// True when any of the given payload fields is truthy.
    pub fn any_truthy(&self, keys: &[&str]) -> bool {
        keys.iter()
            .any(|k| self.payload.get(*k).is_some_and(is_truthy))
    }
}

/// JSON truthiness: `false`, `null`, `0`, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Raw countable signals accumulated from one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub runs: u64,
    pub successful_runs: u64,
    pub edits: u64,
    pub unique_versions: u64,
    pub ai_queries: u64,
    pub relevant_ai: u64,
    pub paste_events: u64,
    pub keystrokes: u64,
    pub self_explanations: u64,
    /// Span between the first and last event, never negative.
    pub duration_s: f64,
}

/// The four normalized behavioral metrics, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreMetrics {
    pub reasoning_score: f64,
    pub debugging_efficiency: f64,
    pub adaptability: f64,
    pub ethical_ai_usage: f64,
}

impl CoreMetrics {
    /// Metric values keyed by their short display name, in a fixed order.
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("reasoning", self.reasoning_score),
            ("debugging", self.debugging_efficiency),
            ("adaptability", self.adaptability),
            ("ethical_ai", self.ethical_ai_usage),
        ]
    }
}

/// How the candidate used the AI assistant over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UsagePattern {
    ManualOnly,
    Balanced,
    CopyHeavy,
    Inefficient,
    Unclear,
}

impl fmt::Display for UsagePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UsagePattern::ManualOnly => "manual-only",
            UsagePattern::Balanced => "balanced",
            UsagePattern::CopyHeavy => "copy-heavy",
            UsagePattern::Inefficient => "inefficient",
            UsagePattern::Unclear => "unclear",
        };
        f.write_str(s)
    }
}

/// Ethical classification of the AI usage pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EthicalFlag {
    Neutral,
    Ethical,
    Overuse,
    Underuse,
    Mixed,
}

impl fmt::Display for EthicalFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EthicalFlag::Neutral => "neutral",
            EthicalFlag::Ethical => "ethical",
            EthicalFlag::Overuse => "overuse",
            EthicalFlag::Underuse => "underuse",
            EthicalFlag::Mixed => "mixed",
        };
        f.write_str(s)
    }
}

/// Output of the AI usage analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiUsageReport {
    pub ai_queries: u64,
    pub relevant_ai: u64,
    pub paste_after_ai: u64,
    pub copy_paste_total: u64,
    pub edits_after_ai: u64,
    pub engagement_score: f64,
    pub usage_pattern: UsagePattern,
    pub ethical_flag: EthicalFlag,
}

/// Low/medium/high membership degrees for one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MembershipDegrees {
    pub low: f64,
    pub med: f64,
    pub high: f64,
}

/// Membership degrees for all four metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub reasoning: MembershipDegrees,
    pub debugging: MembershipDegrees,
    pub adaptability: MembershipDegrees,
    pub ethical_ai: MembershipDegrees,
}

/// Crisp score produced by a fuzzy scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyResult {
    /// In `[0, 100]`.
    pub score: f64,
    pub summary: String,
    /// `None` when an external scoring backend produced the score.
    pub membership: Option<Membership>,
}

/// The fuzzy result as reported to callers, with the AI usage analysis
/// attached alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyReport {
    #[serde(flatten)]
    pub fuzzy: FuzzyResult,
    pub ai_analysis: AiUsageReport,
}

/// The complete output of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub features: FeatureVector,
    pub core_metrics: CoreMetrics,
    pub fuzzy_result: FuzzyReport,
    pub final_score: f64,
    pub recommendations: Vec<String>,
}

/// Letter grade derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// Qualitative label for a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Strong,
    Moderate,
    Weak,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tag::Strong => "strong",
            Tag::Moderate => "moderate",
            Tag::Weak => "weak",
        };
        f.write_str(s)
    }
}

/// Per-metric qualitative tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTags {
    pub reasoning: Tag,
    pub debugging: Tag,
    pub adaptability: Tag,
    pub ethical_ai: Tag,
}

/// Recruiter-facing summary of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub grade: Grade,
    /// Rounded to one decimal.
    pub score: f64,
    pub short_summary: String,
    pub long_summary: String,
    pub tags: MetricTags,
    pub recommendations: Vec<String>,
}

/// Round to a fixed number of decimals for presentation.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
