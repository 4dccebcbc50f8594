//! The `tracegrade evaluate` command.

use std::path::PathBuf;

use anyhow::Result;

use tracegrade_backends::config::load_config_from;
use tracegrade_backends::JsonDirStore;
use tracegrade_core::ingest::SessionSource;
use tracegrade_core::traits::EvaluationStore;
use tracegrade_report::html::{generate_html, write_html_report};
use tracegrade_report::markdown::{generate_markdown, write_markdown_report};
use tracegrade_report::SessionReport;

use super::{metrics_table, print_summary_text, read_session, session_name};

pub async fn execute(
    session_path: PathBuf,
    format: String,
    summary_only: bool,
    candidate: Option<String>,
    task: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "json" | "text" | "html" | "markdown" | "md"),
        "unknown format: {format} (expected json, text, html, markdown)"
    );

    let config = load_config_from(config_path.as_deref())?;
    let evaluator = config.evaluator()?;
    let raw = read_session(&session_path)?;

    let result = match evaluator.evaluate_source(SessionSource::Encoded(&raw)).await {
        Ok(result) => result,
        Err(e) => {
            if format == "json" {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
                std::process::exit(1);
            }
            return Err(e.into());
        }
    };
    let summary = evaluator.summarize(&result);

    if let (Some(candidate), Some(task)) = (&candidate, &task) {
        let store = JsonDirStore::new(&config.store_dir);
        let record = store
            .save_evaluation(candidate, task, &result, &summary)
            .await?;
        eprintln!(
            "Saved evaluation {} to {}",
            record.id,
            store.dir().display()
        );
    }

    let title = session_name(&session_path);
    let mut report = SessionReport::new(&title, &result, &summary);
    if let (Some(candidate), Some(task)) = (&candidate, &task) {
        report = report.with_subject(candidate, task);
    }

    match format.as_str() {
        "json" => {
            if summary_only {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        "html" => match &output {
            Some(path) => {
                write_html_report(&report, path)?;
                eprintln!("HTML report: {}", path.display());
            }
            None => print!("{}", generate_html(&report)),
        },
        "markdown" | "md" => match &output {
            Some(path) => {
                write_markdown_report(&report, path)?;
                eprintln!("Markdown report: {}", path.display());
            }
            None => print!("{}", generate_markdown(&report)),
        },
        _ => {
            print_summary_text(&summary);
            if !summary_only {
                println!("\n{}", metrics_table(&result, &summary));
                let ai = &result.fuzzy_result.ai_analysis;
                println!(
                    "\nAI usage: {} queries, {} pastes after AI, {} edits after AI ({}, {})",
                    ai.ai_queries,
                    ai.paste_after_ai,
                    ai.edits_after_ai,
                    ai.usage_pattern,
                    ai.ethical_flag
                );
            }
        }
    }

    Ok(())
}
