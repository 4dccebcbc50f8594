//! The `tracegrade compare` command.

use std::path::PathBuf;

use anyhow::Result;

use tracegrade_core::record::EvaluationRecord;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(threshold >= 0.0, "threshold must not be negative");

    let baseline = EvaluationRecord::load_json(&baseline_path)?;
    let current = EvaluationRecord::load_json(&current_path)?;

    if baseline.candidate_id != current.candidate_id || baseline.task_id != current.task_id {
        tracing::warn!(
            "comparing different subjects: {}/{} vs {}/{}",
            baseline.candidate_id,
            baseline.task_id,
            current.candidate_id,
            current.task_id
        );
    }

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: grade {} -> {}, {} regressions, {} improvements",
                report.baseline_grade,
                report.current_grade,
                report.regressions().count(),
                report.improvements().count()
            );

            let regressions: Vec<_> = report.regressions().collect();
            if !regressions.is_empty() {
                println!("\nRegressions:");
                for r in regressions {
                    println!(
                        "  {} {:.3} -> {:.3} ({:+.3})",
                        r.metric, r.baseline, r.current, r.delta
                    );
                }
            }

            let improvements: Vec<_> = report.improvements().collect();
            if !improvements.is_empty() {
                println!("\nImprovements:");
                for i in improvements {
                    println!(
                        "  {} {:.3} -> {:.3} ({:+.3})",
                        i.metric, i.baseline, i.current, i.delta
                    );
                }
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
