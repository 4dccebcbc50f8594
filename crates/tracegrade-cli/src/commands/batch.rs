//! The `tracegrade batch` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use tracegrade_backends::config::load_config_from;
use tracegrade_core::engine::{ProgressReporter, SessionOutcome};
use tracegrade_core::ingest::{ingest, SessionSource};
use tracegrade_core::model::{EvaluationResult, Event};
use tracegrade_core::Evaluator;

use super::{read_session, session_name};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_session_start(&self, name: &str) {
        eprintln!("  Starting: {name}");
    }

    fn on_session_complete(&self, name: &str, result: &EvaluationResult) {
        eprintln!("  Done: {name} ({:.1})", result.final_score);
    }

    fn on_session_error(&self, name: &str, error: &str) {
        eprintln!("  ERROR: {name}: {error}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} evaluated, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    dir: PathBuf,
    parallelism: Option<usize>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    if let Some(p) = parallelism {
        anyhow::ensure!(p >= 1, "parallelism must be at least 1");
    }

    let config = load_config_from(config_path.as_deref())?;
    let evaluator = config
        .evaluator()?
        .with_parallelism(parallelism.unwrap_or(config.parallelism));

    let sessions = load_sessions(&dir)?;
    anyhow::ensure!(
        !sessions.is_empty(),
        "no session files (*.json) found in {}",
        dir.display()
    );

    eprintln!("tracegrade: evaluating {} sessions\n", sessions.len());
    let outcomes = evaluator.evaluate_batch(sessions, &ConsoleReporter).await;

    print_summary(&evaluator, &outcomes);

    if let Some(output) = &output {
        std::fs::create_dir_all(output)
            .with_context(|| format!("failed to create {}", output.display()))?;
        for outcome in &outcomes {
            if let Ok(result) = &outcome.result {
                let path = output.join(format!("{}.json", outcome.name));
                std::fs::write(&path, serde_json::to_string_pretty(result)?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
        }
        eprintln!("Results saved to: {}", output.display());
    }

    Ok(())
}

fn load_sessions(dir: &std::path::Path) -> Result<Vec<(String, Vec<Event>)>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let raw = read_session(path)?;
            Ok((session_name(path), ingest(SessionSource::Encoded(&raw))))
        })
        .collect()
}

fn print_summary(evaluator: &Evaluator, outcomes: &[SessionOutcome]) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Session",
        "Grade",
        "Score",
        "Reasoning",
        "Debugging",
        "Adaptability",
        "Ethical AI",
        "AI usage",
    ]);

    for outcome in outcomes {
        match &outcome.result {
            Ok(result) => {
                let summary = evaluator.summarize(result);
                let m = &result.core_metrics;
                table.add_row(vec![
                    Cell::new(&outcome.name),
                    Cell::new(summary.grade),
                    Cell::new(format!("{:.1}", summary.score)),
                    Cell::new(format!("{:.3}", m.reasoning_score)),
                    Cell::new(format!("{:.3}", m.debugging_efficiency)),
                    Cell::new(format!("{:.3}", m.adaptability)),
                    Cell::new(format!("{:.3}", m.ethical_ai_usage)),
                    Cell::new(result.fuzzy_result.ai_analysis.ethical_flag),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(&outcome.name),
                    Cell::new("-"),
                    Cell::new(e),
                ]);
            }
        }
    }

    println!("{table}");
}
