//! Improvement recommendations derived from the core metrics.

use crate::config::RecommendationThresholds;
use crate::model::CoreMetrics;

pub const DEBUGGING_ADVICE: &str = "Focus on debugging fundamentals (test-driven runs).";
pub const AI_USAGE_ADVICE: &str =
    "Encourage more selective and relevant AI prompts; avoid copy-paste.";
pub const ADAPTABILITY_ADVICE: &str =
    "Work on iterative problem decomposition and smaller refactors.";
pub const READY_ADVICE: &str = "Ready for next-round interview (probe system design).";

/// One line of advice per weak metric, or a ready-to-advance note when none
/// fall below their threshold.
pub fn recommendations(metrics: &CoreMetrics, t: &RecommendationThresholds) -> Vec<String> {
    let mut recs = Vec::new();
    if metrics.debugging_efficiency < t.debugging {
        recs.push(DEBUGGING_ADVICE.to_string());
    }
    if metrics.ethical_ai_usage < t.ethical_ai {
        recs.push(AI_USAGE_ADVICE.to_string());
    }
    if metrics.adaptability < t.adaptability {
        recs.push(ADAPTABILITY_ADVICE.to_string());
    }
    if recs.is_empty() {
        recs.push(READY_ADVICE.to_string());
    }
    recs
}
