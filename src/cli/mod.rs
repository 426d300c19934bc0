//! Command implementations
//!
//! Glue between the CLI and the core: run a command, write its output to
//! stdout or a file, and surface what was skipped on stderr.

pub mod list;
pub mod view;

use anyhow::{Context, Result};
use std::path::Path;

use crate::scan::Diagnostics;

/// Write rendered output to `save` if given, otherwise to stdout
pub fn emit(text: &str, save: Option<&Path>) -> Result<()> {
    let mut text = text.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }

    match save {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Saved to {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Print the skipped-items summary, if anything was skipped
pub fn report_diagnostics(diagnostics: &Diagnostics) {
    if let Some(summary) = diagnostics.summary() {
        eprintln!("warning: {} (run with --verbose for details)", summary);
    }
}
