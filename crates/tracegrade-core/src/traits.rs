//! Collaborator trait definitions.
//!
//! The pipeline itself is pure; everything that talks to the outside world
//! sits behind these async traits. Implementations live in
//! `tracegrade-backends`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{CoreMetrics, EvaluationResult, SummaryReport};
use crate::record::EvaluationRecord;

// ---------------------------------------------------------------------------
// Scoring backend
// ---------------------------------------------------------------------------

/// An external replacement for the built-in fuzzy scorer.
///
/// The evaluator prefers a configured backend, bounds every call with a
/// timeout, and falls back to the built-in scorer on any failure.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Score a metric set.
    async fn fuzzy_evaluate(&self, metrics: &CoreMetrics) -> anyhow::Result<ExternalScore>;
}

/// Score returned by an external backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalScore {
    /// Expected in `[0, 100]`; anything else is treated as malformed.
    pub score: f64,
    #[serde(default)]
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Storage for finished evaluations, keyed by candidate and task.
#[async_trait]
pub trait EvaluationStore: Send + Sync {
    /// Persist an evaluation, replacing any earlier one for the same key.
    async fn save_evaluation(
        &self,
        candidate_id: &str,
        task_id: &str,
        scores: &EvaluationResult,
        summary: &SummaryReport,
    ) -> anyhow::Result<EvaluationRecord>;

    /// Fetch the evaluation for a candidate and task, if any.
    async fn get_evaluation(
        &self,
        candidate_id: &str,
        task_id: &str,
    ) -> anyhow::Result<Option<EvaluationRecord>>;

    /// Every stored evaluation, oldest first.
    async fn list_all_evaluations(&self) -> anyhow::Result<Vec<EvaluationRecord>>;
}

// ---------------------------------------------------------------------------
// Code execution
// ---------------------------------------------------------------------------

/// A sandbox that runs candidate code. The pipeline never executes code
/// itself; this is the seam for whatever service does.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn execute(&self, request: &ExecutionRequest) -> anyhow::Result<ExecutionOutcome>;
}

/// Request to run a piece of candidate code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub source: String,
    pub language: String,
    #[serde(default)]
    pub stdin: String,
}

/// What the sandbox reported back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub output: String,
    #[serde(default)]
    pub error: Option<String>,
    pub exit_status: i32,
}

impl ExecutionOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_status == 0 && self.error.is_none()
    }
}
