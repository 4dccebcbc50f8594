//! Raw feature extraction.
//!
//! One pass over normalized events, accumulating counts. Order does not
//! matter here; time-windowed patterns belong to [`crate::usage`].

use std::collections::HashSet;

use serde_json::Value;

use crate::model::{is_truthy, Event, EventType, FeatureVector};

/// Run results that count as a success (compared case-insensitively).
const SUCCESS_WORDS: [&str; 3] = ["pass", "ok", "success"];

/// Payload fields signalling that an AI answer was relevant or used.
pub const RELEVANCE_FIELDS: [&str; 3] = ["relevant", "used", "response_snippet_used"];

/// Accumulate the feature vector for a session.
pub fn extract_features(events: &[Event]) -> FeatureVector {
    let mut features = FeatureVector::default();
    let mut versions: HashSet<String> = HashSet::new();

    for event in events {
        match event.kind {
            EventType::Run => {
                features.runs += 1;
                if run_succeeded(event) {
                    features.successful_runs += 1;
                }
            }
            EventType::Edit => {
                features.edits += 1;
                if let Some(hash) = event.field("code_hash").filter(|v| is_truthy(v)) {
                    versions.insert(version_key(hash));
                }
                features.keystrokes += keystrokes(event);
            }
            EventType::AiQuery => {
                features.ai_queries += 1;
                if event.any_truthy(&RELEVANCE_FIELDS) {
                    features.relevant_ai += 1;
                }
            }
            EventType::Paste => features.paste_events += 1,
            EventType::SelfExplanation => features.self_explanations += 1,
        }
    }

    features.unique_versions = versions.len() as u64;
    features.duration_s = session_duration(events);
    features
}

/// A run succeeded when the first truthy of `result`/`status` is a success
/// word or boolean `true`.
fn run_succeeded(event: &Event) -> bool {
    let outcome = ["result", "status"]
        .iter()
        .filter_map(|k| event.payload.get(*k))
        .find(|v| is_truthy(v));
    match outcome {
        Some(Value::String(s)) => SUCCESS_WORDS.iter().any(|w| s.eq_ignore_ascii_case(w)),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

fn version_key(hash: &Value) -> String {
    match hash {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn keystrokes(event: &Event) -> u64 {
    event
        .field("keystrokes")
        .and_then(Value::as_f64)
        .filter(|k| k.is_finite() && *k > 0.0)
        .map(|k| k.trunc() as u64)
        .unwrap_or(0)
}

/// Span between the earliest and latest parsed timestamps, floored at zero.
/// Events whose timestamp was missing or unreadable are left out.
pub fn session_duration(events: &[Event]) -> f64 {
    let mut timestamps = events
        .iter()
        .filter(|e| e.timestamp_parsed)
        .map(|e| e.timestamp);
    let Some(first) = timestamps.next() else {
        return 0.0;
    };
    let (min, max) = timestamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
    (max - min).max(0.0)
}
