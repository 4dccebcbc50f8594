//! Recruiter-facing summary generation.

use crate::config::{GradeThresholds, Heuristics, TagThresholds};
use crate::model::{round_to, EvaluationResult, Grade, MetricTags, SummaryReport, Tag};

const DEFAULT_CHARACTERIZATION: &str = "consistent performance across metrics";

/// Highest grade whose threshold the score meets.
pub fn grade_from_score(score: f64, t: &GradeThresholds) -> Grade {
    if score >= t.a {
        Grade::A
    } else if score >= t.b {
        Grade::B
    } else if score >= t.c {
        Grade::C
    } else if score >= t.d {
        Grade::D
    } else {
        Grade::F
    }
}

pub fn tag(value: f64, t: &TagThresholds) -> Tag {
    if value >= t.strong {
        Tag::Strong
    } else if value >= t.moderate {
        Tag::Moderate
    } else {
        Tag::Weak
    }
}

/// Build the summary for a finished evaluation.
pub fn generate_summary(result: &EvaluationResult, heuristics: &Heuristics) -> SummaryReport {
    let fuzzy = &result.fuzzy_result.fuzzy;
    let metrics = &result.core_metrics;
    let score = fuzzy.score;
    let grade = grade_from_score(score, &heuristics.grades);

    let tags = MetricTags {
        reasoning: tag(metrics.reasoning_score, &heuristics.tags),
        debugging: tag(metrics.debugging_efficiency, &heuristics.tags),
        adaptability: tag(metrics.adaptability, &heuristics.tags),
        ethical_ai: tag(metrics.ethical_ai_usage, &heuristics.tags),
    };

    let mut narrative = vec![
        format!("Overall performance grade: {grade} ({score:.1}/100)."),
        format!(
            "The candidate demonstrated {} debugging ability and {} reasoning clarity.",
            tags.debugging, tags.reasoning
        ),
        format!(
            "Adaptability was {}, with {} AI usage behavior.",
            tags.adaptability, tags.ethical_ai
        ),
    ];
    if !result.recommendations.is_empty() {
        narrative.push(format!(
            "Recommended improvements: {}",
            result.recommendations.join(" ")
        ));
    }

    let characterization = if fuzzy.summary.is_empty() {
        DEFAULT_CHARACTERIZATION
    } else {
        fuzzy.summary.as_str()
    };

    SummaryReport {
        grade,
        score: round_to(score, 1),
        short_summary: format!("{grade}-grade candidate: {characterization}."),
        long_summary: narrative.join(" "),
        tags,
        recommendations: result.recommendations.clone(),
    }
}
