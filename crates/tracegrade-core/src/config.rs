//! Tunable heuristic constants.
//!
//! Every hand-tuned number the pipeline uses lives here so it can be
//! golden-tested and overridden from a config file without touching logic.
//! None of these values are calibrated against labeled outcomes.

use serde::{Deserialize, Serialize};

/// The full table of heuristic constants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    pub metrics: MetricWeights,
    pub usage: UsageWindows,
    pub rules: RuleOutputs,
    pub grades: GradeThresholds,
    pub tags: TagThresholds,
    pub recommendations: RecommendationThresholds,
}

impl Heuristics {
    /// Parse a heuristics table from TOML; missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Constants used by the metric computer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricWeights {
    /// Weight of the self-explanation signal in the reasoning score.
    pub explanation_weight: f64,
    /// Weight of the code-version churn signal in the reasoning score.
    pub version_weight: f64,
    /// Self-explanations needed to saturate the explanation signal.
    pub explanations_to_saturate: f64,
    /// Divisor in `1 - e^(-edits_per_minute / divisor)`.
    pub adaptability_rate: f64,
    /// AI queries per edit that earn the full over-reliance penalty.
    pub ai_per_edit_saturation: f64,
    /// Share of the ethical score removed at full over-reliance.
    pub ai_penalty_weight: f64,
    /// Reduction applied per paste event.
    pub paste_penalty_step: f64,
    /// Maximum total paste reduction.
    pub paste_penalty_cap: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            explanation_weight: 0.6,
            version_weight: 0.4,
            explanations_to_saturate: 2.0,
            adaptability_rate: 3.0,
            ai_per_edit_saturation: 3.0,
            ai_penalty_weight: 0.5,
            paste_penalty_step: 0.15,
            paste_penalty_cap: 0.6,
        }
    }
}

/// Time windows and cut-offs used by the AI usage analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageWindows {
    /// A paste this soon after an AI query counts as AI-driven.
    pub paste_window_s: f64,
    /// An edit this soon after an AI query counts as engagement.
    pub edit_window_s: f64,
    pub ethical_engagement: f64,
    pub overuse_paste_dependency: f64,
    pub overuse_engagement: f64,
    pub underuse_relevance: f64,
}

impl Default for UsageWindows {
    fn default() -> Self {
        Self {
            paste_window_s: 20.0,
            edit_window_s: 30.0,
            ethical_engagement: 0.7,
            overuse_paste_dependency: 0.5,
            overuse_engagement: 0.5,
            underuse_relevance: 0.3,
        }
    }
}

/// Crisp output value attached to each fuzzy rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOutputs {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
    pub poor: f64,
    pub adaptable: f64,
    /// Membership degree above which a summary phrase is chosen.
    pub summary_threshold: f64,
    /// Scale the "good" and "adaptable" rules by `1 - activation(excellent)`.
    /// Off evaluates the five rules independently.
    pub subsume_excellent: bool,
}

impl Default for RuleOutputs {
    fn default() -> Self {
        Self {
            excellent: 0.95,
            good: 0.8,
            average: 0.55,
            poor: 0.3,
            adaptable: 0.75,
            summary_threshold: 0.5,
            subsume_excellent: true,
        }
    }
}

/// Minimum score for each letter grade; anything below `d` is an F.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeThresholds {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            a: 85.0,
            b: 70.0,
            c: 55.0,
            d: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagThresholds {
    pub strong: f64,
    pub moderate: f64,
}

impl Default for TagThresholds {
    fn default() -> Self {
        Self {
            strong: 0.75,
            moderate: 0.5,
        }
    }
}

/// A recommendation is emitted when its metric falls below the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub debugging: f64,
    pub ethical_ai: f64,
    pub adaptability: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            debugging: 0.4,
            ethical_ai: 0.5,
            adaptability: 0.4,
        }
    }
}
