pub mod batch;
pub mod compare;
pub mod evaluate;
pub mod init;
pub mod list;
pub mod summarize;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use tracegrade_core::model::{EvaluationResult, SummaryReport};

/// Read a session file as text.
pub(crate) fn read_session(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session {}", path.display()))
}

/// Session display name: the file stem.
pub(crate) fn session_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Metric table shared by the text outputs.
pub(crate) fn metrics_table(
    result: &EvaluationResult,
    summary: &SummaryReport,
) -> comfy_table::Table {
    use comfy_table::{Cell, Table};

    let m = &result.core_metrics;
    let t = &summary.tags;
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value", "Assessment"]);
    for (name, value, tag) in [
        ("Reasoning", m.reasoning_score, t.reasoning),
        ("Debugging", m.debugging_efficiency, t.debugging),
        ("Adaptability", m.adaptability, t.adaptability),
        ("Ethical AI", m.ethical_ai_usage, t.ethical_ai),
    ] {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{value:.3}")),
            Cell::new(tag),
        ]);
    }
    table
}

/// Print a summary as plain text.
pub(crate) fn print_summary_text(summary: &SummaryReport) {
    println!("Grade: {} ({:.1}/100)", summary.grade, summary.score);
    println!("{}", summary.short_summary);
    println!();
    println!("{}", summary.long_summary);
}
