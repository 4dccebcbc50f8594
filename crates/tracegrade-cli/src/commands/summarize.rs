//! The `tracegrade summarize` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use tracegrade_backends::config::load_config_from;
use tracegrade_core::model::EvaluationResult;
use tracegrade_core::summary::generate_summary;

use super::print_summary_text;

pub fn execute(result_path: PathBuf, format: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let content = std::fs::read_to_string(&result_path)
        .with_context(|| format!("failed to read result {}", result_path.display()))?;
    let result: EvaluationResult =
        serde_json::from_str(&content).context("failed to parse evaluation result JSON")?;

    let summary = generate_summary(&result, &config.heuristics);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        "text" => print_summary_text(&summary),
        other => anyhow::bail!("unknown format: {other} (expected json, text)"),
    }

    Ok(())
}
