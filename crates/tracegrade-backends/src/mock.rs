//! Mock collaborators for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tracegrade_core::model::CoreMetrics;
use tracegrade_core::traits::{
    CodeExecutor, ExecutionOutcome, ExecutionRequest, ExternalScore, ScoringBackend,
};

/// A mock scoring backend for exercising the evaluator's fallback paths
/// without a real service.
pub struct MockScorer {
    /// `None` makes every call fail.
    response: Option<ExternalScore>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last metrics received.
    last_metrics: Mutex<Option<CoreMetrics>>,
}

impl MockScorer {
    /// A scorer that always returns the same score and summary.
    pub fn with_fixed_response(score: f64, summary: &str) -> Self {
        Self {
            response: Some(ExternalScore {
                score,
                summary: summary.to_string(),
            }),
            call_count: AtomicU32::new(0),
            last_metrics: Mutex::new(None),
        }
    }

    /// A scorer whose every call errors.
    pub fn failing() -> Self {
        Self {
            response: None,
            call_count: AtomicU32::new(0),
            last_metrics: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this scorer.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last metrics passed to this scorer.
    pub fn last_metrics(&self) -> Option<CoreMetrics> {
        *self.last_metrics.lock().unwrap()
    }
}

#[async_trait]
impl ScoringBackend for MockScorer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fuzzy_evaluate(&self, metrics: &CoreMetrics) -> anyhow::Result<ExternalScore> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_metrics.lock().unwrap() = Some(*metrics);

        match &self.response {
            Some(response) => Ok(response.clone()),
            None => anyhow::bail!("mock scorer configured to fail"),
        }
    }
}

/// A mock code executor that echoes stdin back as output.
pub struct MockExecutor {
    /// Fixed outcome; `None` echoes the request's stdin.
    outcome: Option<ExecutionOutcome>,
    call_count: AtomicU32,
    last_request: Mutex<Option<ExecutionRequest>>,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self {
            outcome: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }
}

impl MockExecutor {
    /// An executor that always reports the same outcome.
    pub fn with_outcome(outcome: ExecutionOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<ExecutionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeExecutor for MockExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> anyhow::Result<ExecutionOutcome> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        Ok(self.outcome.clone().unwrap_or_else(|| ExecutionOutcome {
            output: request.stdin.clone(),
            error: None,
            exit_status: 0,
        }))
    }
}
