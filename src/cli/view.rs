//! View command implementation

use anyhow::Result;
use chrono::Local;
use std::path::Path;

use super::{emit, report_diagnostics};
use crate::render::OutputFormat;
use crate::scan::{Diagnostics, ScanOptions};
use crate::view::TranscriptViewer;

pub fn run(
    root: &Path,
    options: ScanOptions,
    format: OutputFormat,
    save: Option<&Path>,
    session_id: &str,
    max_messages: usize,
) -> Result<()> {
    let viewer = TranscriptViewer::new(root, options);

    let mut diagnostics = Diagnostics::new();
    let result = viewer.view(session_id, max_messages, &Local, &mut diagnostics);
    report_diagnostics(&diagnostics);
    let transcript = result?;

    let output = format.renderer().render_transcript(&transcript)?;
    emit(&output, save)
}
