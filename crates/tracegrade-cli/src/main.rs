//! tracegrade CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "tracegrade",
    version,
    about = "Behavioral scoring for recorded coding sessions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one session
    Evaluate {
        /// Session JSON file (event array or {"events": [...]})
        #[arg(long)]
        session: PathBuf,

        /// Output format: json, text, html, markdown
        #[arg(long, default_value = "json")]
        format: String,

        /// Print the recruiter summary instead of the full result
        #[arg(long)]
        summary: bool,

        /// Candidate id; with --task, saves the evaluation to the store
        #[arg(long, requires = "task")]
        candidate: Option<String>,

        /// Task id
        #[arg(long, requires = "candidate")]
        task: Option<String>,

        /// Write html/markdown output to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Evaluate every session in a directory
    Batch {
        /// Directory of session JSON files
        #[arg(long)]
        dir: PathBuf,

        /// Max concurrent evaluations (defaults to the config value)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Directory for per-session result JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show what ingestion keeps and drops from a session
    Validate {
        /// Session JSON file
        #[arg(long)]
        session: PathBuf,
    },

    /// Regenerate the summary for a saved evaluation result
    Summarize {
        /// Evaluation result JSON
        #[arg(long)]
        result: PathBuf,

        /// Output format: json, text
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two stored evaluation records
    Compare {
        /// Baseline record JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current record JSON
        #[arg(long)]
        current: PathBuf,

        /// Minimum metric change that counts (score threshold is 100x)
        #[arg(long, default_value = "0.05")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List stored evaluations
    List {
        /// Store directory (defaults to the config value)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example session
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tracegrade=info".parse().unwrap())
                .add_directive("tracegrade_core=info".parse().unwrap())
                .add_directive("tracegrade_backends=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate {
            session,
            format,
            summary,
            candidate,
            task,
            output,
            config,
        } => {
            commands::evaluate::execute(
                session, format, summary, candidate, task, output, config,
            )
            .await
        }
        Commands::Batch {
            dir,
            parallelism,
            output,
            config,
        } => commands::batch::execute(dir, parallelism, output, config).await,
        Commands::Validate { session } => commands::validate::execute(session),
        Commands::Summarize {
            result,
            format,
            config,
        } => commands::summarize::execute(result, format, config),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::List { store, config } => commands::list::execute(store, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
