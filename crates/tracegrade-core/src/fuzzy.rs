//! Fuzzy inference over the core metrics.
//!
//! Each metric is fuzzified into low/medium/high degrees with piecewise-linear
//! membership functions, a five-rule base is evaluated with min/max as AND/OR,
//! and the activations are defuzzified by weighted average into a 0–100 score.

use serde::{Deserialize, Serialize};

use crate::config::RuleOutputs;
use crate::model::{round_to, CoreMetrics, FuzzyResult, Membership, MembershipDegrees};

/// Floor for the defuzzification denominator.
const ACTIVATION_EPSILON: f64 = 1e-6;

/// Score reported when no rule fires at all.
const NEUTRAL_SCORE: f64 = 0.5;

/// Degree of membership in "low": full at 0, gone by 0.4.
pub fn low(x: f64) -> f64 {
    if x <= 0.0 {
        1.0
    } else if x < 0.4 {
        ((0.4 - x) / 0.4).min(1.0)
    } else {
        0.0
    }
}

/// Degree of membership in "medium": a triangle peaking at 0.5 over (0.2, 0.8).
pub fn medium(x: f64) -> f64 {
    let degree = if x > 0.2 && x < 0.5 {
        (x - 0.2) / 0.3
    } else if (0.5..0.8).contains(&x) {
        (0.8 - x) / 0.3
    } else {
        0.0
    };
    // 0.3 is not exact in binary; keep the peak at 1
    degree.min(1.0)
}

/// Degree of membership in "high": starts above 0.5, full from 0.8.
pub fn high(x: f64) -> f64 {
    if x <= 0.5 {
        0.0
    } else if x < 0.8 {
        ((x - 0.5) / 0.3).min(1.0)
    } else {
        1.0
    }
}

fn degrees(x: f64) -> MembershipDegrees {
    MembershipDegrees {
        low: low(x),
        med: medium(x),
        high: high(x),
    }
}

/// Fuzzify all four metrics.
pub fn fuzzify(metrics: &CoreMetrics) -> Membership {
    Membership {
        reasoning: degrees(metrics.reasoning_score),
        debugging: degrees(metrics.debugging_efficiency),
        adaptability: degrees(metrics.adaptability),
        ethical_ai: degrees(metrics.ethical_ai_usage),
    }
}

/// The rules of the inference base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Every metric high.
    AllHigh,
    /// Debugging high and ethical AI use high.
    DebuggingAndEthics,
    /// Reasoning, debugging and ethical AI use all medium.
    Balanced,
    /// Ethical AI use low or debugging low.
    Weakness,
    /// Adaptability high with at least medium reasoning.
    Adaptable,
}

/// One evaluated rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleFiring {
    pub rule: Rule,
    pub activation: f64,
    pub output: f64,
}

/// Evaluate every rule against a fuzzified metric set.
///
/// `AllHigh` implies the antecedents of `DebuggingAndEthics` and `Adaptable`.
/// With `subsume_excellent` set, those two are scaled by
/// `1 - activation(AllHigh)` so a session that fully earns the top rule is
/// scored by it alone.
pub fn fire_rules(m: &Membership, outputs: &RuleOutputs) -> [RuleFiring; 5] {
    let all_high = m
        .reasoning
        .high
        .min(m.debugging.high)
        .min(m.adaptability.high)
        .min(m.ethical_ai.high);
    let residual = if outputs.subsume_excellent {
        1.0 - all_high
    } else {
        1.0
    };

    let debugging_and_ethics = m.debugging.high.min(m.ethical_ai.high) * residual;
    let balanced = m.reasoning.med.min(m.debugging.med).min(m.ethical_ai.med);
    let weakness = m.ethical_ai.low.max(m.debugging.low);
    let adaptable = m
        .adaptability
        .high
        .min(m.reasoning.med.max(m.reasoning.high))
        * residual;

    [
        RuleFiring {
            rule: Rule::AllHigh,
            activation: all_high,
            output: outputs.excellent,
        },
        RuleFiring {
            rule: Rule::DebuggingAndEthics,
            activation: debugging_and_ethics,
            output: outputs.good,
        },
        RuleFiring {
            rule: Rule::Balanced,
            activation: balanced,
            output: outputs.average,
        },
        RuleFiring {
            rule: Rule::Weakness,
            activation: weakness,
            output: outputs.poor,
        },
        RuleFiring {
            rule: Rule::Adaptable,
            activation: adaptable,
            output: outputs.adaptable,
        },
    ]
}

/// Weighted average of rule outputs, in `[0, 1]`. No activation at all
/// yields the neutral midpoint.
pub fn defuzzify(firings: &[RuleFiring]) -> f64 {
    let total: f64 = firings.iter().map(|f| f.activation).sum();
    if total == 0.0 {
        return NEUTRAL_SCORE;
    }
    let weighted: f64 = firings.iter().map(|f| f.activation * f.output).sum();
    weighted / total.max(ACTIVATION_EPSILON)
}

/// Short natural-language characterization of the membership degrees.
pub fn describe(m: &Membership, threshold: f64) -> String {
    let level = |d: &MembershipDegrees| {
        if d.high > threshold {
            Level::High
        } else if d.med > threshold {
            Level::Medium
        } else {
            Level::Other
        }
    };

    let mut parts: Vec<&str> = Vec::with_capacity(4);
    parts.push(match level(&m.debugging) {
        Level::High => "strong debugging",
        Level::Medium => "moderate debugging",
        Level::Other => "weak debugging",
    });
    parts.push(match level(&m.ethical_ai) {
        Level::High => "ethical AI use",
        Level::Medium => "balanced AI use",
        Level::Other => "questionable AI dependence",
    });
    parts.push(match level(&m.adaptability) {
        Level::High => "high adaptability",
        Level::Medium => "moderate adaptability",
        Level::Other => "limited adaptability",
    });
    match level(&m.reasoning) {
        Level::High => parts.push("strong reasoning"),
        Level::Medium => parts.push("partial reasoning"),
        Level::Other => {}
    }
    parts.join("; ")
}

enum Level {
    High,
    Medium,
    Other,
}

/// The built-in fuzzy scorer. Always available as the fallback for an
/// external scoring backend.
#[derive(Debug, Clone, Default)]
pub struct FuzzyScorer {
    outputs: RuleOutputs,
}

impl FuzzyScorer {
    pub fn new(outputs: RuleOutputs) -> Self {
        Self { outputs }
    }

    /// Score a metric set on the 0–100 scale.
    pub fn evaluate(&self, metrics: &CoreMetrics) -> FuzzyResult {
        let membership = fuzzify(metrics);
        let firings = fire_rules(&membership, &self.outputs);
        let raw = defuzzify(&firings);
        let score = round_to((raw * 100.0).clamp(0.0, 100.0), 2);

        tracing::debug!(score, "built-in fuzzy score");

        FuzzyResult {
            score,
            summary: describe(&membership, self.outputs.summary_threshold),
            membership: Some(membership),
        }
    }

    /// The evaluated rule base, for explaining a score.
    pub fn explain(&self, metrics: &CoreMetrics) -> [RuleFiring; 5] {
        fire_rules(&fuzzify(metrics), &self.outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(x: f64) -> CoreMetrics {
        CoreMetrics {
            reasoning_score: x,
            debugging_efficiency: x,
            adaptability: x,
            ethical_ai_usage: x,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn membership_breakpoints() {
        assert_eq!(low(0.0), 1.0);
        assert!(close(low(0.2), 0.5));
        assert_eq!(low(0.4), 0.0);
        assert_eq!(medium(0.2), 0.0);
        assert!(close(medium(0.35), 0.5));
        assert!(close(medium(0.5), 1.0));
        assert!(close(medium(0.65), 0.5));
        assert_eq!(medium(0.8), 0.0);
        assert_eq!(high(0.5), 0.0);
        assert!(close(high(0.65), 0.5));
        assert_eq!(high(0.8), 1.0);
        assert_eq!(high(1.0), 1.0);
    }

    #[test]
    fn memberships_stay_in_unit_range() {
        for i in 0..=100 {
            let x = i as f64 / 100.0;
            for d in [low(x), medium(x), high(x)] {
                assert!((0.0..=1.0).contains(&d), "x = {x}, degree = {d}");
            }
        }
    }

    #[test]
    fn all_high_scores_excellent() {
        let scorer = FuzzyScorer::default();
        let metrics = uniform(0.9);
        let firings = scorer.explain(&metrics);
        assert_eq!(firings[0].rule, Rule::AllHigh);
        assert_eq!(firings[0].activation, 1.0);
        let result = scorer.evaluate(&metrics);
        assert!((result.score - 95.0).abs() <= 1.0, "{}", result.score);
        assert!(result.summary.starts_with("strong debugging; ethical AI use"));
    }

    #[test]
    fn all_medium_scores_average() {
        let result = FuzzyScorer::default().evaluate(&uniform(0.5));
        assert_eq!(result.score, 55.0);
        assert_eq!(
            result.summary,
            "moderate debugging; balanced AI use; moderate adaptability; partial reasoning"
        );
    }

    #[test]
    fn all_zero_scores_poor() {
        let result = FuzzyScorer::default().evaluate(&uniform(0.0));
        assert_eq!(result.score, 30.0);
        assert_eq!(
            result.summary,
            "weak debugging; questionable AI dependence; limited adaptability"
        );
    }

    #[test]
    fn no_activation_is_neutral() {
        let metrics = CoreMetrics {
            reasoning_score: 0.1,
            debugging_efficiency: 0.45,
            adaptability: 0.45,
            ethical_ai_usage: 0.45,
        };
        let scorer = FuzzyScorer::default();
        assert!(scorer.explain(&metrics).iter().all(|f| f.activation == 0.0));
        assert_eq!(scorer.evaluate(&metrics).score, 50.0);
    }

    #[test]
    fn debugging_and_ethics_without_rest() {
        let metrics = CoreMetrics {
            reasoning_score: 0.0,
            debugging_efficiency: 0.9,
            adaptability: 0.0,
            ethical_ai_usage: 0.9,
        };
        assert_eq!(FuzzyScorer::default().evaluate(&metrics).score, 80.0);
    }

    #[test]
    fn adaptability_rule_needs_reasoning() {
        let outputs = RuleOutputs::default();
        let with = fuzzify(&CoreMetrics {
            reasoning_score: 0.5,
            debugging_efficiency: 0.45,
            adaptability: 0.9,
            ethical_ai_usage: 0.45,
        });
        let without = fuzzify(&CoreMetrics {
            reasoning_score: 0.1,
            ..Default::default()
        });
        assert!(close(fire_rules(&with, &outputs)[4].activation, 1.0));
        assert_eq!(fire_rules(&without, &outputs)[4].activation, 0.0);
    }

    #[test]
    fn scores_stay_in_range() {
        let scorer = FuzzyScorer::default();
        for r in 0..=10 {
            for d in 0..=10 {
                let metrics = CoreMetrics {
                    reasoning_score: r as f64 / 10.0,
                    debugging_efficiency: d as f64 / 10.0,
                    adaptability: (10 - r) as f64 / 10.0,
                    ethical_ai_usage: (10 - d) as f64 / 10.0,
                };
                let score = scorer.evaluate(&metrics).score;
                assert!((0.0..=100.0).contains(&score), "{metrics:?} -> {score}");
            }
        }
    }

    #[test]
    fn custom_rule_outputs_apply() {
        let scorer = FuzzyScorer::new(RuleOutputs {
            poor: 0.1,
            ..Default::default()
        });
        assert_eq!(scorer.evaluate(&uniform(0.0)).score, 10.0);
    }

    fn reasoning_slightly_below_high() -> CoreMetrics {
        CoreMetrics {
            reasoning_score: 0.7,
            ..uniform(0.9)
        }
    }

    #[test]
    fn partial_excellence_with_subsumption() {
        let scorer = FuzzyScorer::default();
        let score = scorer.evaluate(&reasoning_slightly_below_high()).score;
        assert!((score - 87.27).abs() < 0.01, "{score}");
    }

    #[test]
    fn independent_rules_without_subsumption() {
        let scorer = FuzzyScorer::new(RuleOutputs {
            subsume_excellent: false,
            ..Default::default()
        });
        let score = scorer.evaluate(&reasoning_slightly_below_high()).score;
        assert!((score - 82.86).abs() < 0.01, "{score}");

        // all three overlapping rules fire fully
        let all_high = scorer.evaluate(&uniform(0.9)).score;
        assert!((all_high - 83.33).abs() < 0.01, "{all_high}");
    }
}
