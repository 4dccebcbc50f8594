//! Configuration loading and scorer factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tracegrade_core::traits::ScoringBackend;
use tracegrade_core::{Evaluator, Heuristics};

use crate::http::HttpScorer;

/// Which scorer produces the fuzzy score.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScorerConfig {
    /// The in-process fuzzy scorer.
    Builtin,
    /// An external scoring service reached over HTTP.
    Http {
        url: String,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
        #[serde(default)]
        api_key: Option<String>,
    },
}

impl std::fmt::Debug for ScorerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScorerConfig::Builtin => f.write_str("Builtin"),
            ScorerConfig::Http {
                url,
                timeout_ms,
                api_key,
            } => f
                .debug_struct("Http")
                .field("url", url)
                .field("timeout_ms", timeout_ms)
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .finish(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

/// Top-level tracegrade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracegradeConfig {
    /// Heuristic constants; missing keys keep their defaults.
    #[serde(default)]
    pub heuristics: Heuristics,
    /// External scorer. Absent means the built-in scorer.
    #[serde(default)]
    pub scorer: Option<ScorerConfig>,
    /// Max sessions evaluated concurrently in a batch.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Directory for stored evaluation records.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
}

fn default_parallelism() -> usize {
    4
}
fn default_store_dir() -> PathBuf {
    PathBuf::from("./tracegrade-results")
}

impl Default for TracegradeConfig {
    fn default() -> Self {
        Self {
            heuristics: Heuristics::default(),
            scorer: None,
            parallelism: default_parallelism(),
            store_dir: default_store_dir(),
        }
    }
}

impl TracegradeConfig {
    /// Build an evaluator wired with the configured scorer.
    pub fn evaluator(&self) -> Result<Evaluator> {
        let mut evaluator =
            Evaluator::new(self.heuristics.clone()).with_parallelism(self.parallelism);
        if let Some(scorer) = &self.scorer {
            if let Some(backend) = create_scorer(scorer)? {
                let timeout = match scorer {
                    ScorerConfig::Http { timeout_ms, .. } => Duration::from_millis(*timeout_ms),
                    ScorerConfig::Builtin => Duration::from_millis(default_timeout_ms()),
                };
                evaluator = evaluator.with_backend(backend, timeout);
            }
        }
        Ok(evaluator)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_scorer_config(config: &ScorerConfig) -> ScorerConfig {
    match config {
        ScorerConfig::Builtin => ScorerConfig::Builtin,
        ScorerConfig::Http {
            url,
            timeout_ms,
            api_key,
        } => ScorerConfig::Http {
            url: resolve_env_vars(url),
            timeout_ms: *timeout_ms,
            api_key: api_key
                .as_ref()
                .map(|k| resolve_env_vars(k))
                .filter(|k| !k.is_empty()),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `tracegrade.toml` in the current directory
/// 2. `~/.config/tracegrade/config.toml`
///
/// Environment variable override: `TRACEGRADE_SCORER_URL`.
pub fn load_config() -> Result<TracegradeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TracegradeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("tracegrade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            toml::from_str::<TracegradeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TracegradeConfig::default(),
    };

    if let Ok(url) = std::env::var("TRACEGRADE_SCORER_URL") {
        match &mut config.scorer {
            Some(ScorerConfig::Http { url: existing, .. }) => *existing = url,
            _ => {
                config.scorer = Some(ScorerConfig::Http {
                    url,
                    timeout_ms: default_timeout_ms(),
                    api_key: None,
                })
            }
        }
    }

    config.scorer = config.scorer.as_ref().map(resolve_scorer_config);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("tracegrade"))
}

/// Create an external scoring backend from its configuration.
///
/// Returns `None` for the built-in scorer, which the evaluator always has.
pub fn create_scorer(config: &ScorerConfig) -> Result<Option<Arc<dyn ScoringBackend>>> {
    match config {
        ScorerConfig::Builtin => Ok(None),
        ScorerConfig::Http {
            url,
            timeout_ms,
            api_key,
        } => {
            if url.is_empty() {
                anyhow::bail!("http scorer requires a non-empty url");
            }
            Ok(Some(Arc::new(HttpScorer::new(
                url,
                api_key.clone(),
                Duration::from_millis(*timeout_ms),
            ))))
        }
    }
}
