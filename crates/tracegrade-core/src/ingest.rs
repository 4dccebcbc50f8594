//! Session event ingestion.
//!
//! Loads raw events from the shapes frontends send (encoded JSON, a document
//! wrapping an `events` array, or an already-parsed sequence), normalizes
//! vocabulary and timestamps, drops anything unusable, deduplicates, and
//! orders the result by time. Ingestion never fails: bad input shrinks the
//! output instead.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{Event, EventType};

/// Fields checked, in order, for the event type name.
const TYPE_FIELDS: [&str; 3] = ["event_type", "type", "event"];

/// Vocabulary variants emitted by different frontends.
const TYPE_ALIASES: [(&str, &str); 6] = [
    ("run_code", "run"),
    ("code_run", "run"),
    ("query_ai", "ai_query"),
    ("chatgpt_call", "ai_query"),
    ("paste_action", "paste"),
    ("text_edit", "edit"),
];

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A raw session in one of the accepted input shapes.
#[derive(Debug, Clone, Copy)]
pub enum SessionSource<'a> {
    /// JSON text holding either an array of events or `{"events": [...]}`.
    Encoded(&'a str),
    /// A parsed document: an array of events or an object with `events`.
    Document(&'a Value),
    /// Event mappings that are already split out.
    Events(&'a [Value]),
}

impl<'a> From<&'a str> for SessionSource<'a> {
    fn from(s: &'a str) -> Self {
        SessionSource::Encoded(s)
    }
}

impl<'a> From<&'a Value> for SessionSource<'a> {
    fn from(v: &'a Value) -> Self {
        SessionSource::Document(v)
    }
}

impl<'a> From<&'a [Value]> for SessionSource<'a> {
    fn from(v: &'a [Value]) -> Self {
        SessionSource::Events(v)
    }
}

/// Counts describing what ingestion kept and threw away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Entries found in the source.
    pub raw: usize,
    /// Entries dropped as non-mappings, typeless, or of an unknown type.
    pub invalid: usize,
    /// Entries dropped because an earlier event had the same type and time.
    pub duplicates: usize,
    /// Events handed to the pipeline.
    pub retained: usize,
}

/// Extract the raw event entries from a session source.
///
/// Undecodable text and documents without an event array yield an empty list.
pub fn load_raw_session(source: SessionSource<'_>) -> Vec<Value> {
    match source {
        SessionSource::Events(events) => events.to_vec(),
        SessionSource::Document(doc) => events_of(doc),
        SessionSource::Encoded(text) => match serde_json::from_str::<Value>(text) {
            Ok(doc) => events_of(&doc),
            Err(e) => {
                tracing::warn!("session JSON parse failed: {e}");
                Vec::new()
            }
        },
    }
}

fn events_of(doc: &Value) -> Vec<Value> {
    match doc {
        Value::Array(items) => items.clone(),
        Value::Object(obj) => match obj.get("events") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Map a frontend-specific type name onto the canonical vocabulary.
/// Unlisted names pass through unchanged.
pub fn normalize_type(name: &str) -> &str {
    TYPE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Convert a raw timestamp to seconds. Numbers pass through; date/time
/// strings become epoch seconds; anything else is `0.0`.
pub fn parse_timestamp(value: Option<&Value>) -> f64 {
    try_parse_timestamp(value).unwrap_or(0.0)
}

/// Like [`parse_timestamp`], but `None` when the value is missing or unreadable.
pub fn try_parse_timestamp(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()),
        Some(Value::String(s)) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<f64> {
    if let Ok(n) = s.parse::<f64>() {
        return n.is_finite().then_some(n);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(epoch_seconds(&dt.with_timezone(&Utc)));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(epoch_seconds(&Utc.from_utc_datetime(&naive)));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| epoch_seconds(&Utc.from_utc_datetime(&naive)))
}

fn epoch_seconds(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp_micros() as f64 / 1_000_000.0
}

/// Materialize a payload as a mapping. Encoded strings are decoded; anything
/// that does not end up as a mapping is wrapped as `{"raw": original}`.
pub fn normalize_payload(value: Option<&Value>) -> Map<String, Value> {
    match value {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(obj)) => obj.clone(),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(obj)) => obj,
            _ => raw_payload(Value::String(s.clone())),
        },
        Some(other) => raw_payload(other.clone()),
    }
}

fn raw_payload(value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("raw".to_string(), value);
    map
}

/// Normalize one raw entry, or `None` if it cannot become a known event.
pub fn normalize_event(raw: &Value) -> Option<Event> {
    let obj = raw.as_object()?;
    let type_name = TYPE_FIELDS
        .iter()
        .filter_map(|field| obj.get(*field).and_then(Value::as_str))
        .find(|s| !s.is_empty())?;
    let kind: EventType = normalize_type(type_name).parse().ok()?;

    let timestamp = try_parse_timestamp(obj.get("timestamp"));

    Some(Event {
        kind,
        payload: normalize_payload(obj.get("payload")),
        timestamp: timestamp.unwrap_or(0.0),
        timestamp_parsed: timestamp.is_some(),
    })
}

/// Normalize, deduplicate, and order the raw entries of a session.
pub fn ingest(source: SessionSource<'_>) -> Vec<Event> {
    ingest_with_stats(source).0
}

/// Like [`ingest`], also reporting what was dropped.
pub fn ingest_with_stats(source: SessionSource<'_>) -> (Vec<Event>, IngestStats) {
    let raw = load_raw_session(source);
    let mut stats = IngestStats {
        raw: raw.len(),
        ..Default::default()
    };

    let mut seen: HashSet<(EventType, u64)> = HashSet::new();
    let mut events = Vec::with_capacity(raw.len());

    for entry in &raw {
        let Some(event) = normalize_event(entry) else {
            stats.invalid += 1;
            continue;
        };
        // -0.0 and 0.0 must collide
        let key = (event.kind, (event.timestamp + 0.0).to_bits());
        if !seen.insert(key) {
            stats.duplicates += 1;
            continue;
        }
        events.push(event);
    }

    // stable: ties keep input order
    events.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    stats.retained = events.len();

    tracing::debug!(
        raw = stats.raw,
        invalid = stats.invalid,
        duplicates = stats.duplicates,
        retained = stats.retained,
        "ingested session"
    );

    (events, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_all_three_shapes() {
        let array = json!([{"type": "run", "timestamp": 1}]);
        let wrapped = json!({"events": [{"type": "run", "timestamp": 1}, {"type": "edit"}]});
        assert_eq!(load_raw_session(SessionSource::Document(&array)).len(), 1);
        assert_eq!(load_raw_session(SessionSource::Document(&wrapped)).len(), 2);
        assert_eq!(
            load_raw_session(SessionSource::Encoded(r#"{"events": [{"type": "run"}]}"#)).len(),
            1
        );
        let items = vec![json!({"type": "paste"})];
        assert_eq!(load_raw_session(SessionSource::Events(&items)).len(), 1);
    }

    #[test]
    fn bad_sources_load_nothing() {
        assert!(load_raw_session(SessionSource::Encoded("not json")).is_empty());
        assert!(load_raw_session(SessionSource::Encoded("42")).is_empty());
        assert!(load_raw_session(SessionSource::Document(&json!({"events": "x"}))).is_empty());
    }

    #[test]
    fn type_aliases_are_exact() {
        assert_eq!(normalize_type("run_code"), "run");
        assert_eq!(normalize_type("code_run"), "run");
        assert_eq!(normalize_type("query_ai"), "ai_query");
        assert_eq!(normalize_type("chatgpt_call"), "ai_query");
        assert_eq!(normalize_type("paste_action"), "paste");
        assert_eq!(normalize_type("text_edit"), "edit");
        assert_eq!(normalize_type("Run_Code"), "Run_Code");
        assert_eq!(normalize_type("custom"), "custom");
    }

    #[test]
    fn type_field_fallbacks() {
        let a = normalize_event(&json!({"event_type": "run"})).unwrap();
        let b = normalize_event(&json!({"type": "text_edit"})).unwrap();
        let c = normalize_event(&json!({"event": "paste_action"})).unwrap();
        assert_eq!(a.kind, EventType::Run);
        assert_eq!(b.kind, EventType::Edit);
        assert_eq!(c.kind, EventType::Paste);
        assert!(normalize_event(&json!({"payload": {}})).is_none());
        assert!(normalize_event(&json!("run")).is_none());
        assert!(normalize_event(&json!({"type": "code_change"})).is_none());
    }

    #[test]
    fn timestamps_normalize() {
        assert_eq!(parse_timestamp(Some(&json!(12.5))), 12.5);
        assert_eq!(parse_timestamp(Some(&json!("1970-01-01T00:01:00Z"))), 60.0);
        assert_eq!(parse_timestamp(Some(&json!("1970-01-01T00:00:30"))), 30.0);
        assert_eq!(parse_timestamp(Some(&json!("1970-01-02"))), 86_400.0);
        assert_eq!(
            parse_timestamp(Some(&json!("2025-10-30T12:00:00+02:00"))),
            parse_timestamp(Some(&json!("2025-10-30T10:00:00Z")))
        );
        assert_eq!(parse_timestamp(Some(&json!("7"))), 7.0);
        assert_eq!(parse_timestamp(Some(&json!("yesterday"))), 0.0);
        assert_eq!(parse_timestamp(Some(&json!(true))), 0.0);
        assert_eq!(parse_timestamp(None), 0.0);
    }

    #[test]
    fn payload_normalization() {
        assert!(normalize_payload(None).is_empty());
        assert!(normalize_payload(Some(&json!(null))).is_empty());
        let decoded = normalize_payload(Some(&json!(r#"{"result": "ok"}"#)));
        assert_eq!(decoded["result"], "ok");
        let raw = normalize_payload(Some(&json!("{broken")));
        assert_eq!(raw["raw"], "{broken");
        let list = normalize_payload(Some(&json!([1, 2])));
        assert_eq!(list["raw"], json!([1, 2]));
    }

    #[test]
    fn dedups_on_type_and_timestamp_first_wins() {
        let doc = json!([
            {"type": "run", "timestamp": 5, "payload": {"result": "fail"}},
            {"type": "run_code", "timestamp": 5, "payload": {"result": "ok"}},
            {"type": "edit", "timestamp": 5},
        ]);
        let (events, stats) = ingest_with_stats(SessionSource::Document(&doc));
        assert_eq!(events.len(), 2);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(events[0].kind, EventType::Run);
        assert_eq!(events[0].payload["result"], "fail");
    }

    #[test]
    fn sorts_stably_by_timestamp() {
        let doc = json!([
            {"type": "edit", "timestamp": 30},
            {"type": "run", "timestamp": 10},
            {"type": "paste", "timestamp": 10},
            {"type": "ai_query", "timestamp": 20},
        ]);
        let events = ingest(SessionSource::Document(&doc));
        let order: Vec<EventType> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            order,
            vec![
                EventType::Run,
                EventType::Paste,
                EventType::AiQuery,
                EventType::Edit
            ]
        );
        assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn invalid_entries_are_counted_not_raised() {
        let doc = json!([
            1,
            "edit",
            {"type": "unknown"},
            {"type": "self_explanation", "timestamp": "garbage"},
        ]);
        let (events, stats) = ingest_with_stats(SessionSource::Document(&doc));
        assert_eq!(stats.raw, 4);
        assert_eq!(stats.invalid, 3);
        assert_eq!(stats.retained, 1);
        assert_eq!(events[0].timestamp, 0.0);
        assert!(!events[0].timestamp_parsed);
    }

    #[test]
    fn readable_timestamps_are_marked_parsed() {
        let doc = json!([{"type": "run", "timestamp": 0}, {"type": "edit"}]);
        let events = ingest(SessionSource::Document(&doc));
        assert_eq!(events.len(), 2);
        assert!(events[0].timestamp_parsed);
        assert!(!events[1].timestamp_parsed);
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(ingest(SessionSource::Encoded("[]")).is_empty());
        assert!(ingest(SessionSource::Events(&[])).is_empty());
    }
}
