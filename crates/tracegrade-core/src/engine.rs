//! Evaluation orchestrator.
//!
//! Chains ingestion, feature extraction, metric computation, AI usage
//! analysis, fuzzy scoring, and recommendations into one
//! [`EvaluationResult`]. Optional external capabilities are held as trait
//! objects; each one falls back to its built-in counterpart on failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::config::Heuristics;
use crate::error::{CapabilityError, EvaluationError};
use crate::features::extract_features;
use crate::fuzzy::FuzzyScorer;
use crate::ingest::{ingest, SessionSource};
use crate::metrics::compute_core_metrics;
use crate::model::{
    round_to, AiUsageReport, CoreMetrics, EvaluationResult, Event, FeatureVector, FuzzyReport,
    FuzzyResult, SummaryReport,
};
use crate::recommend::recommendations;
use crate::summary::generate_summary;
use crate::traits::ScoringBackend;
use crate::usage::{analyze_ai_usage, UsageAnalyzer};

const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_PARALLELISM: usize = 4;

/// Evaluate normalized events with the built-in scorer and analyzer.
///
/// Pure and deterministic: the same events and heuristics always produce the
/// same result.
pub fn evaluate_events(
    events: &[Event],
    heuristics: &Heuristics,
) -> Result<EvaluationResult, EvaluationError> {
    let (features, core_metrics) = measure(events, heuristics)?;
    let fuzzy = FuzzyScorer::new(heuristics.rules.clone()).evaluate(&core_metrics);
    let ai_analysis = analyze_ai_usage(events, &heuristics.usage);
    Ok(assemble(features, core_metrics, fuzzy, ai_analysis, heuristics))
}

fn measure(
    events: &[Event],
    heuristics: &Heuristics,
) -> Result<(FeatureVector, CoreMetrics), EvaluationError> {
    if events.is_empty() {
        return Err(EvaluationError::NoValidEvents);
    }
    let features = extract_features(events);
    let metrics = compute_core_metrics(&features, &heuristics.metrics);
    Ok((features, metrics))
}

fn assemble(
    features: FeatureVector,
    core_metrics: CoreMetrics,
    fuzzy: FuzzyResult,
    ai_analysis: AiUsageReport,
    heuristics: &Heuristics,
) -> EvaluationResult {
    let recommendations = recommendations(&core_metrics, &heuristics.recommendations);

    tracing::debug!(
        score = fuzzy.score,
        pattern = %ai_analysis.usage_pattern,
        flag = %ai_analysis.ethical_flag,
        "evaluated session"
    );

    EvaluationResult {
        features,
        core_metrics,
        final_score: fuzzy.score,
        fuzzy_result: FuzzyReport { fuzzy, ai_analysis },
        recommendations,
    }
}

/// Progress reporting for batch evaluation.
pub trait ProgressReporter: Send + Sync {
    fn on_session_start(&self, name: &str);
    fn on_session_complete(&self, name: &str, result: &EvaluationResult);
    fn on_session_error(&self, name: &str, error: &str);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_session_start(&self, _: &str) {}
    fn on_session_complete(&self, _: &str, _: &EvaluationResult) {}
    fn on_session_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Outcome of one session in a batch.
#[derive(Debug)]
pub struct SessionOutcome {
    pub name: String,
    pub result: Result<EvaluationResult, EvaluationError>,
}

/// The session evaluator.
///
/// Holds the heuristics plus the optional external scorer and analyzer.
/// Cheap to share behind an `Arc`.
pub struct Evaluator {
    heuristics: Heuristics,
    scorer: FuzzyScorer,
    analyzer: Option<Arc<dyn UsageAnalyzer>>,
    backend: Option<Arc<dyn ScoringBackend>>,
    backend_timeout: Duration,
    parallelism: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Heuristics::default())
    }
}

impl Evaluator {
    pub fn new(heuristics: Heuristics) -> Self {
        Self {
            scorer: FuzzyScorer::new(heuristics.rules.clone()),
            heuristics,
            analyzer: None,
            backend: None,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
            parallelism: DEFAULT_PARALLELISM,
        }
    }

    /// Use an external AI usage analyzer instead of the built-in one.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn UsageAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Prefer an external scoring backend, bounded by `timeout` per call.
    pub fn with_backend(mut self, backend: Arc<dyn ScoringBackend>, timeout: Duration) -> Self {
        self.backend = Some(backend);
        self.backend_timeout = timeout;
        self
    }

    /// Maximum sessions scored concurrently by [`Evaluator::evaluate_batch`].
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn heuristics(&self) -> &Heuristics {
        &self.heuristics
    }

    /// Evaluate normalized events.
    pub async fn evaluate(&self, events: &[Event]) -> Result<EvaluationResult, EvaluationError> {
        let (features, metrics) = measure(events, &self.heuristics)?;
        let fuzzy = self.score(&metrics).await;
        let ai_analysis = self.analyze(events);
        Ok(assemble(features, metrics, fuzzy, ai_analysis, &self.heuristics))
    }

    /// Ingest a raw session and evaluate it.
    pub async fn evaluate_source(
        &self,
        source: SessionSource<'_>,
    ) -> Result<EvaluationResult, EvaluationError> {
        let events = ingest(source);
        self.evaluate(&events).await
    }

    /// Build the recruiter summary for a result.
    pub fn summarize(&self, result: &EvaluationResult) -> SummaryReport {
        generate_summary(result, &self.heuristics)
    }

    /// Evaluate many named sessions with bounded concurrency.
    ///
    /// Outcomes are returned in input order regardless of completion order.
    pub async fn evaluate_batch(
        &self,
        sessions: Vec<(String, Vec<Event>)>,
        progress: &dyn ProgressReporter,
    ) -> Vec<SessionOutcome> {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        let total = sessions.len();

        let mut futures = FuturesUnordered::new();
        for (index, (name, events)) in sessions.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            futures.push(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        progress.on_session_start(&name);
                        self.evaluate(&events).await
                    }
                    // never closed while the batch runs; evaluate unbounded
                    Err(_) => self.evaluate(&events).await,
                };
                (index, SessionOutcome { name, result })
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        let mut completed = 0usize;
        let mut failed = 0usize;

        while let Some((index, outcome)) = futures.next().await {
            match &outcome.result {
                Ok(result) => {
                    progress.on_session_complete(&outcome.name, result);
                    completed += 1;
                }
                Err(e) => {
                    tracing::warn!("evaluation failed for {}: {e}", outcome.name);
                    progress.on_session_error(&outcome.name, &e.to_string());
                    failed += 1;
                }
            }
            outcomes.push((index, outcome));
        }

        progress.on_batch_complete(total, completed, failed, start.elapsed());

        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    fn analyze(&self, events: &[Event]) -> AiUsageReport {
        if let Some(analyzer) = &self.analyzer {
            match analyzer.analyze(events) {
                Ok(report) => return report,
                Err(e) => {
                    let err = CapabilityError::Failed {
                        capability: "usage analyzer",
                        message: format!("{e:#}"),
                    };
                    tracing::warn!(analyzer = analyzer.name(), "{err}; using built-in analyzer");
                }
            }
        }
        analyze_ai_usage(events, &self.heuristics.usage)
    }

    async fn score(&self, metrics: &CoreMetrics) -> FuzzyResult {
        if let Some(backend) = &self.backend {
            match self.score_external(backend.as_ref(), metrics).await {
                Ok(result) => return result,
                Err(e) => {
                    tracing::warn!(backend = backend.name(), "{e}; using built-in scorer");
                }
            }
        }
        self.scorer.evaluate(metrics)
    }

    async fn score_external(
        &self,
        backend: &dyn ScoringBackend,
        metrics: &CoreMetrics,
    ) -> Result<FuzzyResult, CapabilityError> {
        const CAPABILITY: &str = "scoring backend";

        let external = tokio::time::timeout(self.backend_timeout, backend.fuzzy_evaluate(metrics))
            .await
            .map_err(|_| CapabilityError::Timeout {
                capability: CAPABILITY,
                timeout_ms: self.backend_timeout.as_millis() as u64,
            })?
            .map_err(|e| CapabilityError::Failed {
                capability: CAPABILITY,
                message: format!("{e:#}"),
            })?;

        if !external.score.is_finite() || !(0.0..=100.0).contains(&external.score) {
            return Err(CapabilityError::Malformed {
                capability: CAPABILITY,
                message: format!("score {} outside [0, 100]", external.score),
            });
        }

        Ok(FuzzyResult {
            score: round_to(external.score, 2),
            summary: external.summary,
            membership: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventType, Grade};
    use crate::recommend::ADAPTABILITY_ADVICE;
    use crate::traits::ExternalScore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn scenario_a() -> Vec<Event> {
        vec![
            Event::new(EventType::Edit, 1.0).with("keystrokes", 30),
            Event::new(EventType::Run, 2.0).with("result", "fail"),
            Event::new(EventType::AiQuery, 3.0).with("relevant", true),
            Event::new(EventType::Run, 60.0).with("result", "success"),
            Event::new(EventType::Edit, 70.0).with("keystrokes", 40),
            Event::new(EventType::SelfExplanation, 80.0).with("text", "checked the endpoints"),
        ]
    }

    struct FixedBackend(f64);

    #[async_trait]
    impl ScoringBackend for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn fuzzy_evaluate(&self, _: &CoreMetrics) -> anyhow::Result<ExternalScore> {
            Ok(ExternalScore {
                score: self.0,
                summary: "external".into(),
            })
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl ScoringBackend for FailingBackend {
        fn name(&self) -> &str {
            "failing"
        }
        async fn fuzzy_evaluate(&self, _: &CoreMetrics) -> anyhow::Result<ExternalScore> {
            anyhow::bail!("connection refused")
        }
    }

    struct SlowBackend;

    #[async_trait]
    impl ScoringBackend for SlowBackend {
        fn name(&self) -> &str {
            "slow"
        }
        async fn fuzzy_evaluate(&self, _: &CoreMetrics) -> anyhow::Result<ExternalScore> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ExternalScore {
                score: 99.0,
                summary: String::new(),
            })
        }
    }

    struct FailingAnalyzer;

    impl UsageAnalyzer for FailingAnalyzer {
        fn name(&self) -> &str {
            "failing"
        }
        fn analyze(&self, _: &[Event]) -> anyhow::Result<AiUsageReport> {
            anyhow::bail!("model unavailable")
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        completed: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
        totals: Mutex<Option<(usize, usize, usize)>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn on_session_start(&self, _: &str) {}
        fn on_session_complete(&self, name: &str, _: &EvaluationResult) {
            self.completed.lock().unwrap().push(name.to_string());
        }
        fn on_session_error(&self, name: &str, _: &str) {
            self.errors.lock().unwrap().push(name.to_string());
        }
        fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, _: Duration) {
            *self.totals.lock().unwrap() = Some((total, completed, failed));
        }
    }

    #[test]
    fn empty_session_has_no_valid_events() {
        let err = evaluate_events(&[], &Heuristics::default()).unwrap_err();
        assert!(matches!(err, EvaluationError::NoValidEvents));
    }

    #[test]
    fn scenario_a_end_to_end() {
        let result = evaluate_events(&scenario_a(), &Heuristics::default()).unwrap();
        assert_eq!(result.core_metrics.debugging_efficiency, 0.5);
        assert_eq!(result.core_metrics.reasoning_score, 0.3);
        // no rule fires for this metric profile
        assert_eq!(result.final_score, 50.0);
        assert_eq!(result.fuzzy_result.fuzzy.score, result.final_score);
        assert_eq!(result.fuzzy_result.ai_analysis.ai_queries, 1);
        assert_eq!(result.recommendations, vec![ADAPTABILITY_ADVICE.to_string()]);

        let summary = generate_summary(&result, &Heuristics::default());
        assert_eq!(summary.grade, Grade::D);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let h = Heuristics::default();
        let a = serde_json::to_string(&evaluate_events(&scenario_a(), &h).unwrap()).unwrap();
        let b = serde_json::to_string(&evaluate_events(&scenario_a(), &h).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn result_json_shape() {
        let result = evaluate_events(&scenario_a(), &Heuristics::default()).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        for key in ["features", "core_metrics", "fuzzy_result", "final_score", "recommendations"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["fuzzy_result"]["ai_analysis"].is_object());
        assert!(value["fuzzy_result"]["membership"]["debugging"]["med"].is_number());
    }

    #[tokio::test]
    async fn evaluator_matches_pure_function() {
        let evaluator = Evaluator::default();
        let async_result = evaluator.evaluate(&scenario_a()).await.unwrap();
        let pure = evaluate_events(&scenario_a(), &Heuristics::default()).unwrap();
        assert_eq!(async_result, pure);
    }

    #[tokio::test]
    async fn evaluate_source_ingests_raw_json() {
        let raw = r#"{"events": [
            {"type": "run_code", "payload": {"result": "success"}, "timestamp": 5},
            {"event": "text_edit", "payload": "{\"keystrokes\": 10}", "timestamp": 1},
            {"type": "unknown", "timestamp": 2}
        ]}"#;
        let result = Evaluator::default()
            .evaluate_source(SessionSource::Encoded(raw))
            .await
            .unwrap();
        assert_eq!(result.features.runs, 1);
        assert_eq!(result.features.edits, 1);
        assert_eq!(result.features.keystrokes, 10);
        assert_eq!(result.features.duration_s, 4.0);
    }

    #[tokio::test]
    async fn evaluate_source_rejects_garbage() {
        let err = Evaluator::default()
            .evaluate_source(SessionSource::Encoded("not json"))
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationError::NoValidEvents));
    }

    #[tokio::test]
    async fn external_backend_replaces_builtin_score() {
        let evaluator = Evaluator::default()
            .with_backend(Arc::new(FixedBackend(72.5)), Duration::from_secs(1));
        let result = evaluator.evaluate(&scenario_a()).await.unwrap();
        assert_eq!(result.final_score, 72.5);
        assert_eq!(result.fuzzy_result.fuzzy.summary, "external");
        assert!(result.fuzzy_result.fuzzy.membership.is_none());
    }

    #[tokio::test]
    async fn failing_backend_falls_back() {
        let evaluator =
            Evaluator::default().with_backend(Arc::new(FailingBackend), Duration::from_secs(1));
        let result = evaluator.evaluate(&scenario_a()).await.unwrap();
        assert_eq!(result.final_score, 50.0);
        assert!(result.fuzzy_result.fuzzy.membership.is_some());
    }

    #[tokio::test]
    async fn out_of_range_backend_score_falls_back() {
        for bad in [150.0, -1.0, f64::NAN] {
            let evaluator = Evaluator::default()
                .with_backend(Arc::new(FixedBackend(bad)), Duration::from_secs(1));
            let result = evaluator.evaluate(&scenario_a()).await.unwrap();
            assert_eq!(result.final_score, 50.0, "backend score {bad}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let evaluator =
            Evaluator::default().with_backend(Arc::new(SlowBackend), Duration::from_millis(100));
        let result = evaluator.evaluate(&scenario_a()).await.unwrap();
        assert_eq!(result.final_score, 50.0);
    }

    #[tokio::test]
    async fn failing_analyzer_falls_back() {
        let evaluator = Evaluator::default().with_analyzer(Arc::new(FailingAnalyzer));
        let result = evaluator.evaluate(&scenario_a()).await.unwrap();
        let builtin = evaluate_events(&scenario_a(), &Heuristics::default()).unwrap();
        assert_eq!(result.fuzzy_result.ai_analysis, builtin.fuzzy_result.ai_analysis);
    }

    #[tokio::test]
    async fn batch_keeps_input_order_and_reports_failures() {
        let evaluator = Evaluator::default().with_parallelism(2);
        let sessions = vec![
            ("alice".to_string(), scenario_a()),
            ("empty".to_string(), vec![]),
            ("bob".to_string(), scenario_a()),
        ];
        let reporter = RecordingReporter::default();

        let outcomes = evaluator.evaluate_batch(sessions, &reporter).await;

        let names: Vec<&str> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "empty", "bob"]);
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(outcomes[1].result, Err(EvaluationError::NoValidEvents)));
        assert_eq!(reporter.completed.lock().unwrap().len(), 2);
        assert_eq!(*reporter.errors.lock().unwrap(), vec!["empty".to_string()]);
        assert_eq!(*reporter.totals.lock().unwrap(), Some((3, 2, 1)));
    }

    #[tokio::test]
    async fn summarize_uses_configured_grades() {
        let mut heuristics = Heuristics::default();
        heuristics.grades.d = 60.0;
        let evaluator = Evaluator::new(heuristics);
        let result = evaluator.evaluate(&scenario_a()).await.unwrap();
        assert_eq!(evaluator.summarize(&result).grade, Grade::F);
    }
}
