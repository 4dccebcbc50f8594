//! Stored evaluation records with JSON persistence and attempt comparison.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{EvaluationResult, SummaryReport};

/// A finished evaluation tied to a candidate and task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Unique record identifier.
    pub id: Uuid,
    pub candidate_id: String,
    pub task_id: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    pub result: EvaluationResult,
    pub summary: SummaryReport,
}

impl EvaluationRecord {
    pub fn new(
        candidate_id: &str,
        task_id: &str,
        result: EvaluationResult,
        summary: SummaryReport,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_id: candidate_id.to_string(),
            task_id: task_id.to_string(),
            created_at: Utc::now(),
            result,
            summary,
        }
    }

    /// Save the record as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize record")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write record to {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read record from {}", path.display()))?;
        let record: EvaluationRecord =
            serde_json::from_str(&content).context("failed to parse record JSON")?;
        Ok(record)
    }

    /// Compare this record against an earlier attempt.
    ///
    /// Metrics are on a 0–1 scale and the final score on 0–100; `threshold`
    /// is in metric units and is scaled by 100 for the score.
    pub fn compare(&self, baseline: &EvaluationRecord, threshold: f64) -> RecordComparison {
        let mut changes = Vec::new();

        let current = self.result.core_metrics.named();
        let previous = baseline.result.core_metrics.named();
        for ((name, now), (_, before)) in current.iter().zip(previous.iter()) {
            changes.push(MetricChange::new(name, *before, *now, threshold));
        }
        changes.push(MetricChange::new(
            "final_score",
            baseline.result.final_score,
            self.result.final_score,
            threshold * 100.0,
        ));

        RecordComparison {
            candidate_id: self.candidate_id.clone(),
            task_id: self.task_id.clone(),
            baseline_grade: baseline.summary.grade.to_string(),
            current_grade: self.summary.grade.to_string(),
            changes,
        }
    }
}

/// Direction of a metric change relative to the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Regressed,
    Improved,
    Unchanged,
}

/// Change in one metric between two attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricChange {
    pub metric: String,
    pub baseline: f64,
    pub current: f64,
    pub delta: f64,
    pub trend: Trend,
}

impl MetricChange {
    fn new(metric: &str, baseline: f64, current: f64, threshold: f64) -> Self {
        let delta = current - baseline;
        let trend = if delta < -threshold {
            Trend::Regressed
        } else if delta > threshold {
            Trend::Improved
        } else {
            Trend::Unchanged
        };
        Self {
            metric: metric.to_string(),
            baseline,
            current,
            delta,
            trend,
        }
    }
}

/// Result of comparing two records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordComparison {
    pub candidate_id: String,
    pub task_id: String,
    pub baseline_grade: String,
    pub current_grade: String,
    pub changes: Vec<MetricChange>,
}

impl RecordComparison {
    pub fn regressions(&self) -> impl Iterator<Item = &MetricChange> {
        self.changes.iter().filter(|c| c.trend == Trend::Regressed)
    }

    pub fn improvements(&self) -> impl Iterator<Item = &MetricChange> {
        self.changes.iter().filter(|c| c.trend == Trend::Improved)
    }

    /// Returns true if any metric regressed.
    pub fn has_regressions(&self) -> bool {
        self.regressions().next().is_some()
    }

    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**{} / {}:** grade {} -> {}, {} regressions, {} improvements\n\n",
            self.candidate_id,
            self.task_id,
            self.baseline_grade,
            self.current_grade,
            self.regressions().count(),
            self.improvements().count()
        ));

        md.push_str("| Metric | Baseline | Current | Delta | Trend |\n");
        md.push_str("|--------|----------|---------|-------|-------|\n");
        for c in &self.changes {
            md.push_str(&format!(
                "| {} | {:.3} | {:.3} | {:+.3} | {:?} |\n",
                c.metric, c.baseline, c.current, c.delta, c.trend
            ));
        }

        md
    }
}
