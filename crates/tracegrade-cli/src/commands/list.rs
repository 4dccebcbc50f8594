//! The `tracegrade list` command.

use std::path::PathBuf;

use anyhow::Result;

use tracegrade_backends::config::load_config_from;
use tracegrade_backends::JsonDirStore;
use tracegrade_core::traits::EvaluationStore;

pub async fn execute(store_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    use comfy_table::{Cell, Table};

    let dir = match store_dir {
        Some(dir) => dir,
        None => load_config_from(config_path.as_deref())?.store_dir,
    };
    let store = JsonDirStore::new(&dir);
    let records = store.list_all_evaluations().await?;

    if records.is_empty() {
        println!("No evaluations stored in {}.", dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Candidate", "Task", "Grade", "Score", "Created"]);
    for record in &records {
        table.add_row(vec![
            Cell::new(&record.candidate_id),
            Cell::new(&record.task_id),
            Cell::new(record.summary.grade),
            Cell::new(format!("{:.1}", record.summary.score)),
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }

    println!("{table}");
    println!("{} evaluation(s)", records.len());
    Ok(())
}
