//! HTTP client for an external fuzzy scoring service.
//!
//! The service receives the four core metrics as JSON on `POST /score` and
//! answers `{"score": f64, "summary": string}`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use tracegrade_core::model::CoreMetrics;
use tracegrade_core::traits::{ExternalScore, ScoringBackend};

use crate::error::BackendError;

/// External scorer reached over HTTP.
pub struct HttpScorer {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpScorer {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
            client,
        }
    }
}

#[async_trait]
impl ScoringBackend for HttpScorer {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, metrics), fields(url = %self.base_url))]
    async fn fuzzy_evaluate(&self, metrics: &CoreMetrics) -> anyhow::Result<ExternalScore> {
        let mut request = self
            .client
            .post(format!("{}/score", self.base_url))
            .json(metrics);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(self.timeout.as_millis() as u64)
            } else {
                BackendError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::AuthenticationFailed(body).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let score: ExternalScore = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("failed to parse response: {e}")))?;

        tracing::debug!(score = score.score, "external score received");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn metrics() -> CoreMetrics {
        CoreMetrics {
            reasoning_score: 0.3,
            debugging_efficiency: 0.5,
            adaptability: 0.397,
            ethical_ai_usage: 0.917,
        }
    }

    #[tokio::test]
    async fn successful_score() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/score"))
            .and(body_json(serde_json::json!({
                "reasoning_score": 0.3,
                "debugging_efficiency": 0.5,
                "adaptability": 0.397,
                "ethical_ai_usage": 0.917
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"score": 64.2, "summary": "solid"})),
            )
            .mount(&server)
            .await;

        let scorer = HttpScorer::new(&server.uri(), None, Duration::from_secs(5));
        let score = scorer.fuzzy_evaluate(&metrics()).await.unwrap();
        assert_eq!(score.score, 64.2);
        assert_eq!(score.summary, "solid");
    }

    #[tokio::test]
    async fn sends_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/score"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"score": 10})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/", server.uri());
        let scorer = HttpScorer::new(&base, Some("sk-test".into()), Duration::from_secs(5));
        let score = scorer.fuzzy_evaluate(&metrics()).await.unwrap();
        assert_eq!(score.score, 10.0);
    }

    #[tokio::test]
    async fn auth_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/score"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let scorer = HttpScorer::new(&server.uri(), Some("wrong".into()), Duration::from_secs(5));
        let err = scorer.fuzzy_evaluate(&metrics()).await.unwrap_err();
        assert!(err.to_string().contains("authentication failed"));
    }

    #[tokio::test]
    async fn server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/score"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let scorer = HttpScorer::new(&server.uri(), None, Duration::from_secs(5));
        let err = scorer.fuzzy_evaluate(&metrics()).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/score"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let scorer = HttpScorer::new(&server.uri(), None, Duration::from_secs(5));
        let err = scorer.fuzzy_evaluate(&metrics()).await.unwrap_err();
        assert!(err.to_string().contains("invalid response"));
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/score"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"score": 50}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let scorer = HttpScorer::new(&server.uri(), None, Duration::from_millis(100));
        let err = scorer.fuzzy_evaluate(&metrics()).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
