//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use tracegrade_core::model::{Grade, Membership, MembershipDegrees};

use crate::{metric_rows, SessionReport};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn grade_class(grade: Grade) -> &'static str {
    match grade {
        Grade::A | Grade::B => "pass",
        Grade::C => "warn",
        Grade::D | Grade::F => "fail",
    }
}

/// Generate an HTML report for one evaluated session.
pub fn generate_html(report: &SessionReport<'_>) -> String {
    let result = report.result;
    let summary = report.summary;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>tracegrade report: {}</title>\n",
        html_escape(&report.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.title)));
    let mut meta = Vec::new();
    if let Some(candidate) = &report.candidate_id {
        meta.push(format!("Candidate: <strong>{}</strong>", html_escape(candidate)));
    }
    if let Some(task) = &report.task_id {
        meta.push(format!("Task: <strong>{}</strong>", html_escape(task)));
    }
    meta.push(report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    html.push_str(&format!("<p class=\"meta\">{}</p>\n", meta.join(" | ")));
    html.push_str("</header>\n");

    // Grade
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<div class=\"grade {}\">{}</div>\n<p class=\"score\">{:.1} / 100</p>\n",
        grade_class(summary.grade),
        summary.grade,
        summary.score
    ));
    html.push_str(&format!(
        "<p class=\"short\">{}</p>\n<p>{}</p>\n",
        html_escape(&summary.short_summary),
        html_escape(&summary.long_summary)
    ));
    html.push_str("</section>\n");

    // Metrics
    html.push_str("<section class=\"metrics\">\n");
    html.push_str("<h2>Behavioral metrics</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Metric</th><th>Value</th><th>Assessment</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    let rows = metric_rows(report);
    for (label, value, tag) in &rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.3}</td><td class=\"{}\">{}</td></tr>\n",
            label,
            value,
            tag_class(tag),
            tag
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str(&generate_bar_chart(&rows));
    html.push_str("</section>\n");

    // AI usage
    let ai = &result.fuzzy_result.ai_analysis;
    html.push_str("<section class=\"ai-usage\">\n");
    html.push_str("<h2>AI assistant usage</h2>\n");
    html.push_str("<table>\n<tbody>\n");
    for (label, value) in [
        ("Queries", ai.ai_queries.to_string()),
        ("Relevant queries", ai.relevant_ai.to_string()),
        ("Pastes after a query", ai.paste_after_ai.to_string()),
        ("Total pastes", ai.copy_paste_total.to_string()),
        ("Edits after a query", ai.edits_after_ai.to_string()),
        ("Engagement score", format!("{:.3}", ai.engagement_score)),
        ("Usage pattern", ai.usage_pattern.to_string()),
        ("Classification", ai.ethical_flag.to_string()),
    ] {
        html.push_str(&format!("<tr><th>{label}</th><td>{value}</td></tr>\n"));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    if let Some(membership) = &result.fuzzy_result.fuzzy.membership {
        html.push_str(&generate_membership_table(membership));
    }

    // Recommendations
    if !summary.recommendations.is_empty() {
        html.push_str("<section class=\"recommendations\">\n");
        html.push_str("<h2>Recommendations</h2>\n<ul>\n");
        for rec in &summary.recommendations {
            html.push_str(&format!("<li>{}</li>\n", html_escape(rec)));
        }
        html.push_str("</ul>\n</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>\n");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &SessionReport<'_>, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn tag_class(tag: &str) -> &'static str {
    match tag {
        "strong" => "pass",
        "moderate" => "warn",
        _ => "fail",
    }
}

fn generate_membership_table(m: &Membership) -> String {
    let mut html = String::new();
    html.push_str("<section class=\"membership\">\n");
    html.push_str("<h2>Fuzzy membership</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Metric</th><th>Low</th><th>Medium</th><th>High</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    let rows: [(&str, &MembershipDegrees); 4] = [
        ("Reasoning", &m.reasoning),
        ("Debugging", &m.debugging),
        ("Adaptability", &m.adaptability),
        ("Ethical AI", &m.ethical_ai),
    ];
    for (label, d) in rows {
        html.push_str(&format!(
            "<tr><td>{label}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>\n",
            d.low, d.med, d.high
        ));
    }
    html.push_str("</tbody></table>\n</section>\n");
    html
}

fn generate_bar_chart(rows: &[(&'static str, f64, String)]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = rows.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (label, value, _)) in rows.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (value.clamp(0.0, 1.0) * max_width as f64) as usize;

        let color = if *value >= 0.75 {
            "#22c55e"
        } else if *value >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            label
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.0}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            value * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #ffffff; --fg: #1f2937; --border: #e5e7eb; --pass: #d1fae5; --warn: #fef3c7; --fail: #fee2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --warn: #78350f; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); max-width: 60rem; }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.grade { display: inline-block; font-size: 3rem; font-weight: bold; padding: 0.5rem 1.5rem; border-radius: 8px; }
.score { font-size: 1.25rem; }
.short { font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.warn { background: var(--warn); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;
