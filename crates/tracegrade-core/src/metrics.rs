//! Normalized behavioral metrics.
//!
//! Maps the raw feature vector to four scores in `[0, 1]`. Every division is
//! guarded, every result is clamped, and the returned values are rounded to
//! three decimals (intermediate math keeps full precision).

use crate::config::MetricWeights;
use crate::model::{round_to, CoreMetrics, FeatureVector};

const METRIC_DECIMALS: i32 = 3;

/// Compute all four core metrics.
pub fn compute_core_metrics(features: &FeatureVector, weights: &MetricWeights) -> CoreMetrics {
    CoreMetrics {
        reasoning_score: present(reasoning_score(features, weights)),
        debugging_efficiency: present(debugging_efficiency(features)),
        adaptability: present(adaptability(features, weights)),
        ethical_ai_usage: present(ethical_ai_usage(features, weights)),
    }
}

fn present(value: f64) -> f64 {
    round_to(clamp_unit(value), METRIC_DECIMALS)
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Share of runs that succeeded.
pub fn debugging_efficiency(f: &FeatureVector) -> f64 {
    if f.runs == 0 {
        return 0.0;
    }
    clamp_unit(f.successful_runs as f64 / f.runs as f64)
}

/// Saturating curve over the edit rate: `1 - e^(-edits_per_minute / rate)`.
pub fn adaptability(f: &FeatureVector, w: &MetricWeights) -> f64 {
    let edits = f.edits as f64;
    let edits_per_minute = if f.duration_s > 0.0 {
        edits / (f.duration_s / 60.0)
    } else {
        edits
    };
    let rate = if w.adaptability_rate > 0.0 {
        w.adaptability_rate
    } else {
        1.0
    };
    clamp_unit(1.0 - (-edits_per_minute / rate).exp())
}

/// Self-explanation weighted over code-version churn.
pub fn reasoning_score(f: &FeatureVector, w: &MetricWeights) -> f64 {
    let explanations = if w.explanations_to_saturate > 0.0 {
        (f.self_explanations as f64 / w.explanations_to_saturate).min(1.0)
    } else {
        1.0
    };
    let churn = (f.unique_versions as f64 / (f.edits as f64 + 1.0)).min(1.0);
    clamp_unit(w.explanation_weight * explanations + w.version_weight * churn)
}

/// Relevance of AI queries, penalized for heavy reliance per edit and for
/// pasting. No AI use at all scores 1.0 before the paste penalty.
pub fn ethical_ai_usage(f: &FeatureVector, w: &MetricWeights) -> f64 {
    let mut score = if f.ai_queries == 0 {
        1.0
    } else {
        let queries = f.ai_queries as f64;
        let relevance = f.relevant_ai as f64 / queries;
        let ai_per_edit = queries / (f.edits as f64).max(1.0);
        let penalty = if w.ai_per_edit_saturation > 0.0 {
            (ai_per_edit / w.ai_per_edit_saturation).min(1.0)
        } else {
            1.0
        };
        clamp_unit(relevance * (1.0 - w.ai_penalty_weight * penalty))
    };

    if f.paste_events > 0 {
        let reduction = (f.paste_events as f64 * w.paste_penalty_step).min(w.paste_penalty_cap);
        score *= (1.0 - reduction).max(0.0);
    }

    clamp_unit(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_a() -> FeatureVector {
        FeatureVector {
            runs: 2,
            successful_runs: 1,
            edits: 2,
            unique_versions: 0,
            ai_queries: 1,
            relevant_ai: 1,
            paste_events: 0,
            keystrokes: 70,
            self_explanations: 1,
            duration_s: 79.0,
        }
    }

    #[test]
    fn scenario_a_metrics() {
        let m = compute_core_metrics(&scenario_a(), &MetricWeights::default());
        assert_eq!(m.debugging_efficiency, 0.5);
        assert_eq!(m.reasoning_score, 0.3);
        assert!((m.ethical_ai_usage - 0.917).abs() < 0.01, "{}", m.ethical_ai_usage);
        assert!((m.adaptability - 0.397).abs() < 0.01, "{}", m.adaptability);
    }

    #[test]
    fn pastes_reduce_ethical_usage() {
        let w = MetricWeights::default();
        let base = FeatureVector {
            ai_queries: 2,
            relevant_ai: 2,
            edits: 1,
            ..Default::default()
        };
        let pasted = FeatureVector {
            paste_events: 5,
            ..base.clone()
        };
        let clean = ethical_ai_usage(&base, &w);
        let penalized = ethical_ai_usage(&pasted, &w);
        assert!(penalized < clean);
        // five pastes hit the 60% cap
        assert!((penalized - clean * 0.4).abs() < 1e-9);
    }

    #[test]
    fn no_ai_is_neutral_positive() {
        let w = MetricWeights::default();
        let f = FeatureVector {
            edits: 10,
            ..Default::default()
        };
        assert_eq!(ethical_ai_usage(&f, &w), 1.0);
        let pasted = FeatureVector {
            paste_events: 2,
            ..f
        };
        assert!((ethical_ai_usage(&pasted, &w) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn zero_runs_is_zero_debugging() {
        assert_eq!(debugging_efficiency(&FeatureVector::default()), 0.0);
    }

    #[test]
    fn zero_duration_uses_raw_edit_count() {
        let w = MetricWeights::default();
        let f = FeatureVector {
            edits: 3,
            ..Default::default()
        };
        assert!((adaptability(&f, &w) - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
        assert_eq!(adaptability(&FeatureVector::default(), &w), 0.0);
    }

    #[test]
    fn reasoning_saturates() {
        let w = MetricWeights::default();
        let f = FeatureVector {
            self_explanations: 5,
            edits: 3,
            unique_versions: 9,
            ..Default::default()
        };
        assert_eq!(reasoning_score(&f, &w), 1.0);
    }

    #[test]
    fn metrics_stay_in_unit_range() {
        let w = MetricWeights::default();
        let extremes = [
            FeatureVector::default(),
            FeatureVector {
                runs: 1,
                successful_runs: 5,
                edits: u32::MAX as u64,
                unique_versions: u32::MAX as u64,
                ai_queries: 1000,
                relevant_ai: 5000,
                paste_events: 100,
                keystrokes: 0,
                self_explanations: 100,
                duration_s: 0.001,
            },
        ];
        for f in &extremes {
            let m = compute_core_metrics(f, &w);
            for (name, v) in m.named() {
                assert!((0.0..=1.0).contains(&v), "{name} = {v}");
            }
        }
    }
}
