//! tracegrade-core — Core evaluation pipeline, traits, and scoring.
//!
//! This crate turns a raw stream of coding-session events into behavioral
//! metrics, a fuzzy-inferred score, and a recruiter-facing summary. Every
//! stage is a pure function; the only I/O seams are the traits in [`traits`].

pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod fuzzy;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod recommend;
pub mod record;
pub mod summary;
pub mod traits;
pub mod usage;

pub use config::Heuristics;
pub use engine::{evaluate_events, Evaluator};
pub use error::EvaluationError;
