//! tracegrade-backends — Implementations of the core collaborator traits.
//!
//! Provides configuration loading, an HTTP client for an external scoring
//! service, mock collaborators for tests, and in-memory and JSON-directory
//! evaluation stores.

pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod store;

pub use config::{create_scorer, load_config, load_config_from, ScorerConfig, TracegradeConfig};
pub use error::BackendError;
pub use store::{InMemoryStore, JsonDirStore};
