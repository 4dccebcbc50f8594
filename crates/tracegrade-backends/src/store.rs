//! Evaluation stores.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

use tracegrade_core::model::{EvaluationResult, SummaryReport};
use tracegrade_core::record::EvaluationRecord;
use tracegrade_core::traits::EvaluationStore;

use crate::error::BackendError;

/// Keeps evaluations in memory, in insertion order.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<EvaluationRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EvaluationStore for InMemoryStore {
    async fn save_evaluation(
        &self,
        candidate_id: &str,
        task_id: &str,
        scores: &EvaluationResult,
        summary: &SummaryReport,
    ) -> Result<EvaluationRecord> {
        let record = EvaluationRecord::new(candidate_id, task_id, scores.clone(), summary.clone());
        let mut records = self.records.write().await;
        records.retain(|r| !(r.candidate_id == candidate_id && r.task_id == task_id));
        records.push(record.clone());
        Ok(record)
    }

    async fn get_evaluation(
        &self,
        candidate_id: &str,
        task_id: &str,
    ) -> Result<Option<EvaluationRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.candidate_id == candidate_id && r.task_id == task_id)
            .cloned())
    }

    async fn list_all_evaluations(&self) -> Result<Vec<EvaluationRecord>> {
        Ok(self.records.read().await.clone())
    }
}

/// Stores one pretty-printed JSON file per `(candidate, task)` pair.
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, candidate_id: &str, task_id: &str) -> PathBuf {
        self.dir.join(format!(
            "{}__{}.json",
            file_component(candidate_id),
            file_component(task_id)
        ))
    }
}

/// Escape ids for use in file names. ASCII letters, digits and `-` are kept;
/// every other byte becomes `_xx` (lowercase hex), so distinct ids never share
/// a file and `__` cannot appear inside a component.
fn file_component(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("_{byte:02x}"));
        }
    }
    out
}

#[async_trait]
impl EvaluationStore for JsonDirStore {
    async fn save_evaluation(
        &self,
        candidate_id: &str,
        task_id: &str,
        scores: &EvaluationResult,
        summary: &SummaryReport,
    ) -> Result<EvaluationRecord> {
        let record = EvaluationRecord::new(candidate_id, task_id, scores.clone(), summary.clone());
        let path = self.record_path(candidate_id, task_id);
        let json = serde_json::to_string_pretty(&record).context("failed to serialize record")?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create store dir {}", self.dir.display()))?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write record to {}", path.display()))?;

        tracing::debug!("saved evaluation to {}", path.display());
        Ok(record)
    }

    async fn get_evaluation(
        &self,
        candidate_id: &str,
        task_id: &str,
    ) -> Result<Option<EvaluationRecord>> {
        let path = self.record_path(candidate_id, task_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        let record: EvaluationRecord = serde_json::from_str(&content)
            .map_err(|e| BackendError::Store(format!("{}: {e}", path.display())))?;

        // a hand-copied file may hold other ids; the record itself is authoritative
        if record.candidate_id == candidate_id && record.task_id == task_id {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    async fn list_all_evaluations(&self) -> Result<Vec<EvaluationRecord>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to list {}", self.dir.display()));
            }
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            match serde_json::from_str::<EvaluationRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("skipping unreadable record {}: {e}", path.display()),
            }
        }

        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }
}
