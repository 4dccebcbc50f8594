//! The `tracegrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use tracegrade_core::features::session_duration;
use tracegrade_core::ingest::{ingest_with_stats, SessionSource};
use tracegrade_core::model::EventType;

use super::read_session;

pub fn execute(session_path: PathBuf) -> Result<()> {
    let raw = read_session(&session_path)?;
    let (events, stats) = ingest_with_stats(SessionSource::Encoded(&raw));

    println!("Session: {}", session_path.display());
    println!("  Entries:    {}", stats.raw);
    println!("  Invalid:    {}", stats.invalid);
    println!("  Duplicates: {}", stats.duplicates);
    println!("  Retained:   {}", stats.retained);

    if events.is_empty() {
        anyhow::bail!("no valid events in {}", session_path.display());
    }

    for kind in [
        EventType::Run,
        EventType::Edit,
        EventType::AiQuery,
        EventType::Paste,
        EventType::SelfExplanation,
    ] {
        let count = events.iter().filter(|e| e.kind == kind).count();
        if count > 0 {
            println!("  {kind}: {count}");
        }
    }
    println!("  Duration:   {:.1}s", session_duration(&events));
    println!("Session valid.");

    Ok(())
}
