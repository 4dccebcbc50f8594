//! AI usage pattern analysis.
//!
//! Walks the time-ordered events looking at what candidates do right after
//! asking the assistant: pasting suggests dependency, editing suggests
//! engagement. The result is classified independently of the core metrics.

use crate::config::UsageWindows;
use crate::features::RELEVANCE_FIELDS;
use crate::model::{round_to, AiUsageReport, EthicalFlag, Event, EventType, UsagePattern};

/// A pluggable AI usage analyzer.
///
/// The evaluator always has [`BuiltinUsageAnalyzer`] available; an external
/// implementation that errors is logged and replaced by it for that call.
pub trait UsageAnalyzer: Send + Sync {
    /// Human-readable analyzer name, used in logs.
    fn name(&self) -> &str;

    /// Analyze events already sorted by timestamp.
    fn analyze(&self, events: &[Event]) -> anyhow::Result<AiUsageReport>;
}

/// The built-in windowed analyzer.
#[derive(Debug, Clone, Default)]
pub struct BuiltinUsageAnalyzer {
    windows: UsageWindows,
}

impl BuiltinUsageAnalyzer {
    pub fn new(windows: UsageWindows) -> Self {
        Self { windows }
    }
}

impl UsageAnalyzer for BuiltinUsageAnalyzer {
    fn name(&self) -> &str {
        "builtin"
    }

    fn analyze(&self, events: &[Event]) -> anyhow::Result<AiUsageReport> {
        Ok(analyze_ai_usage(events, &self.windows))
    }
}

/// Run the windowed analysis over events sorted by timestamp.
pub fn analyze_ai_usage(events: &[Event], windows: &UsageWindows) -> AiUsageReport {
    let mut ai_queries = 0u64;
    let mut relevant_ai = 0u64;
    let mut paste_after_ai = 0u64;
    let mut copy_paste_total = 0u64;
    let mut edits_after_ai = 0u64;
    let mut last_ai_at: Option<f64> = None;
    let mut previous: Option<EventType> = None;

    let follows_ai = |previous: Option<EventType>, last_ai_at: Option<f64>, ts: f64, window: f64| {
        previous == Some(EventType::AiQuery) || last_ai_at.is_some_and(|at| ts - at < window)
    };

    for event in events {
        match event.kind {
            EventType::AiQuery => {
                ai_queries += 1;
                last_ai_at = Some(event.timestamp);
                if event.any_truthy(&RELEVANCE_FIELDS) {
                    relevant_ai += 1;
                }
            }
            EventType::Paste => {
                copy_paste_total += 1;
                if follows_ai(previous, last_ai_at, event.timestamp, windows.paste_window_s) {
                    paste_after_ai += 1;
                }
            }
            EventType::Edit => {
                if follows_ai(previous, last_ai_at, event.timestamp, windows.edit_window_s) {
                    edits_after_ai += 1;
                }
            }
            EventType::Run | EventType::SelfExplanation => {}
        }
        previous = Some(event.kind);
    }

    let relevance_ratio = ratio(relevant_ai, ai_queries);
    let paste_dependency = ratio(paste_after_ai, copy_paste_total);
    let engagement_ratio = ratio(edits_after_ai, ai_queries);

    let base = relevance_ratio * (1.0 - paste_dependency) * (0.5 + engagement_ratio);
    let engagement_score = round_to(base.clamp(0.0, 1.0), 3);

    let (ethical_flag, usage_pattern) = classify(
        ai_queries,
        relevance_ratio,
        paste_dependency,
        engagement_score,
        windows,
    );

    tracing::debug!(
        ai_queries,
        paste_after_ai,
        edits_after_ai,
        engagement_score,
        %ethical_flag,
        "analyzed AI usage"
    );

    AiUsageReport {
        ai_queries,
        relevant_ai,
        paste_after_ai,
        copy_paste_total,
        edits_after_ai,
        engagement_score,
        usage_pattern,
        ethical_flag,
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// First matching rule wins.
fn classify(
    ai_queries: u64,
    relevance_ratio: f64,
    paste_dependency: f64,
    engagement_score: f64,
    w: &UsageWindows,
) -> (EthicalFlag, UsagePattern) {
    if ai_queries == 0 {
        (EthicalFlag::Neutral, UsagePattern::ManualOnly)
    } else if engagement_score > w.ethical_engagement {
        (EthicalFlag::Ethical, UsagePattern::Balanced)
    } else if paste_dependency > w.overuse_paste_dependency
        && engagement_score < w.overuse_engagement
    {
        (EthicalFlag::Overuse, UsagePattern::CopyHeavy)
    } else if relevance_ratio < w.underuse_relevance {
        (EthicalFlag::Underuse, UsagePattern::Inefficient)
    } else {
        (EthicalFlag::Mixed, UsagePattern::Unclear)
    }
}
