//! List command implementation

use anyhow::Result;
use chrono::Local;
use std::path::Path;

use super::{emit, report_diagnostics};
use crate::aggregate::Aggregator;
use crate::render::OutputFormat;
use crate::scan::ScanOptions;

pub fn run(
    root: &Path,
    options: ScanOptions,
    format: OutputFormat,
    save: Option<&Path>,
) -> Result<()> {
    let aggregation = Aggregator::new(root, options).aggregate(&Local)?;

    let output = format.renderer().render_report(&aggregation.report)?;
    emit(&output, save)?;

    report_diagnostics(&aggregation.diagnostics);
    Ok(())
}
