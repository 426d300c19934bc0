//! Error types for fatal failures
//!
//! Only configuration and root-level failures abort a run. Everything finer
//! grained is recovered and recorded in [`crate::scan::Diagnostics`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid output format '{0}' (expected one of: json, markdown, text)")]
    InvalidFormat(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("projects directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("projects directory unreadable: {}: {source}", .path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("multiple sessions match '{query}':\n{}", format_candidates(.candidates))]
    AmbiguousSession {
        query: String,
        candidates: Vec<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn format_candidates(candidates: &[String]) -> String {
    candidates
        .iter()
        .map(|c| format!("  {}", c))
        .collect::<Vec<_>>()
        .join("\n")
}
