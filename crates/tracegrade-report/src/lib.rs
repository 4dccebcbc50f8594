//! tracegrade-report — Recruiter-facing report rendering.
//!
//! Renders one evaluated session as a self-contained HTML page or as
//! Markdown suitable for pasting into an applicant tracking system.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tracegrade_core::model::{EvaluationResult, SummaryReport};

pub mod html;
pub mod markdown;

/// Everything a report renders for one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport<'a> {
    /// Heading shown at the top, usually the session file name.
    pub title: String,
    pub candidate_id: Option<String>,
    pub task_id: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub result: &'a EvaluationResult,
    pub summary: &'a SummaryReport,
}

impl<'a> SessionReport<'a> {
    pub fn new(title: &str, result: &'a EvaluationResult, summary: &'a SummaryReport) -> Self {
        Self {
            title: title.to_string(),
            candidate_id: None,
            task_id: None,
            generated_at: Utc::now(),
            result,
            summary,
        }
    }

    /// Attach the candidate and task the session belongs to.
    pub fn with_subject(mut self, candidate_id: &str, task_id: &str) -> Self {
        self.candidate_id = Some(candidate_id.to_string());
        self.task_id = Some(task_id.to_string());
        self
    }
}

/// Metric rows shared by every renderer: display label, value, and tag.
pub(crate) fn metric_rows(report: &SessionReport<'_>) -> [(&'static str, f64, String); 4] {
    let m = &report.result.core_metrics;
    let t = &report.summary.tags;
    [
        ("Reasoning", m.reasoning_score, t.reasoning.to_string()),
        ("Debugging efficiency", m.debugging_efficiency, t.debugging.to_string()),
        ("Adaptability", m.adaptability, t.adaptability.to_string()),
        ("Ethical AI usage", m.ethical_ai_usage, t.ethical_ai.to_string()),
    ]
}
