//! The `tracegrade init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create tracegrade.toml
    if std::path::Path::new("tracegrade.toml").exists() {
        println!("tracegrade.toml already exists, skipping.");
    } else {
        std::fs::write("tracegrade.toml", SAMPLE_CONFIG)?;
        println!("Created tracegrade.toml");
    }

    // Create example session
    std::fs::create_dir_all("sessions")?;
    let example_path = std::path::Path::new("sessions/example.json");
    if example_path.exists() {
        println!("sessions/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SESSION)?;
        println!("Created sessions/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Tune the heuristics in tracegrade.toml if needed");
    println!("  2. Run: tracegrade validate --session sessions/example.json");
    println!("  3. Run: tracegrade evaluate --session sessions/example.json --format text");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# tracegrade configuration

parallelism = 4
store_dir = "./tracegrade-results"

# Optional external scorer. Without it the built-in fuzzy scorer is used.
# [scorer]
# type = "http"
# url = "http://localhost:8080"
# timeout_ms = 5000
# api_key = "${TRACEGRADE_SCORER_KEY}"

[heuristics.usage]
paste_window_s = 20.0
edit_window_s = 30.0

[heuristics.grades]
a = 85.0
b = 70.0
c = 55.0
d = 40.0

[heuristics.recommendations]
debugging = 0.4
ethical_ai = 0.5
adaptability = 0.4
"#;

const EXAMPLE_SESSION: &str = r#"{
  "events": [
    {"type": "edit", "timestamp": 0, "payload": {"keystrokes": 120, "code_hash": "v1"}},
    {"type": "run", "timestamp": 15, "payload": {"result": "fail"}},
    {"type": "self_explanation", "timestamp": 25, "payload": {"text": "off by one in the loop bound"}},
    {"type": "edit", "timestamp": 35, "payload": {"keystrokes": 20, "code_hash": "v2"}},
    {"type": "run", "timestamp": 45, "payload": {"result": "pass"}},
    {"type": "ai_query", "timestamp": 60, "payload": {"prompt": "edge cases for empty input?", "relevant": true}},
    {"type": "edit", "timestamp": 75, "payload": {"keystrokes": 35, "code_hash": "v3"}},
    {"type": "self_explanation", "timestamp": 85, "payload": {"text": "added a guard for the empty slice"}},
    {"type": "run", "timestamp": 95, "payload": {"result": "pass"}}
  ]
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tracegrade_core::ingest::{ingest, SessionSource};

    #[test]
    fn sample_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracegrade.toml");
        std::fs::write(&path, SAMPLE_CONFIG).unwrap();

        let config = tracegrade_backends::load_config_from(Some(&path)).unwrap();
        assert_eq!(config.parallelism, 4);
        assert!(config.scorer.is_none());
        assert_eq!(config.heuristics.grades.a, 85.0);
    }

    #[test]
    fn example_session_ingests_fully() {
        let events = ingest(SessionSource::Encoded(EXAMPLE_SESSION));
        assert_eq!(events.len(), 9);
    }
}
