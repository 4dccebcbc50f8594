//! Markdown report generator.

use anyhow::{Context, Result};
use std::path::Path;

use crate::{metric_rows, SessionReport};

/// Generate a Markdown report for one evaluated session.
pub fn generate_markdown(report: &SessionReport<'_>) -> String {
    let summary = report.summary;
    let ai = &report.result.fuzzy_result.ai_analysis;
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", report.title));
    if let (Some(candidate), Some(task)) = (&report.candidate_id, &report.task_id) {
        md.push_str(&format!("Candidate `{candidate}`, task `{task}`\n\n"));
    }

    md.push_str(&format!(
        "**Grade {}** ({:.1}/100): {}\n\n",
        summary.grade, summary.score, summary.short_summary
    ));
    md.push_str(&summary.long_summary);
    md.push_str("\n\n");

    md.push_str("## Metrics\n\n");
    md.push_str("| Metric | Value | Assessment |\n");
    md.push_str("|--------|-------|------------|\n");
    for (label, value, tag) in metric_rows(report) {
        md.push_str(&format!("| {label} | {value:.3} | {tag} |\n"));
    }
    md.push('\n');

    md.push_str("## AI usage\n\n");
    md.push_str(&format!(
        "- {} queries ({} relevant)\n- {} of {} pastes followed a query\n- {} edits followed a query\n- engagement {:.3}, pattern `{}`, classified `{}`\n\n",
        ai.ai_queries,
        ai.relevant_ai,
        ai.paste_after_ai,
        ai.copy_paste_total,
        ai.edits_after_ai,
        ai.engagement_score,
        ai.usage_pattern,
        ai.ethical_flag
    ));

    if !summary.recommendations.is_empty() {
        md.push_str("## Recommendations\n\n");
        for rec in &summary.recommendations {
            md.push_str(&format!("- {rec}\n"));
        }
        md.push('\n');
    }

    md.push_str(&format!(
        "_Generated {}_\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md
}

/// Write a Markdown report to a file.
pub fn write_markdown_report(report: &SessionReport<'_>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, generate_markdown(report))
        .with_context(|| format!("failed to write Markdown report to {}", path.display()))?;
    Ok(())
}
