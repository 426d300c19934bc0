//! Output encodings
//!
//! Each encoding carries the same information; only the layout differs.
//! JSON can be read back with [`parse_report_json`].

mod json;
mod markdown;
mod text;

pub use json::{parse_report_json, JsonRenderer};
pub use markdown::MarkdownRenderer;
pub use text::TextRenderer;

use chrono::{DateTime, FixedOffset, NaiveDate};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::{Report, Transcript};

/// Renders listings and transcripts into one encoding
pub trait Render {
    fn render_report(&self, report: &Report) -> Result<String>;

    fn render_transcript(&self, transcript: &Transcript) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    /// Headings plus tables
    Markdown,
    Text,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Text => "text",
        }
    }

    pub fn renderer(&self) -> Box<dyn Render> {
        match self {
            OutputFormat::Json => Box::new(JsonRenderer),
            OutputFormat::Markdown => Box::new(MarkdownRenderer),
            OutputFormat::Text => Box::new(TextRenderer),
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Markdown
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" | "table" => Ok(OutputFormat::Markdown),
            "text" | "txt" | "plain" => Ok(OutputFormat::Text),
            _ => Err(Error::InvalidFormat(s.to_string())),
        }
    }
}

/// "January 24, 2026 (Saturday)"
pub(crate) fn date_heading(date: NaiveDate) -> String {
    date.format("%B %d, %Y (%A)").to_string()
}

pub(crate) fn message_time(timestamp: Option<&DateTime<FixedOffset>>) -> String {
    timestamp
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// "showing last 20 of 50 messages, 63 events" style count line
pub(crate) fn transcript_counts(transcript: &Transcript) -> String {
    let counts = if transcript.is_truncated() {
        format!(
            "showing last {} of {} messages, {} events",
            transcript.messages.len(),
            transcript.dialogue_turns,
            transcript.total_events
        )
    } else {
        format!(
            "{} messages, {} events",
            transcript.dialogue_turns, transcript.total_events
        )
    };
    match transcript.malformed_lines {
        0 => counts,
        1 => format!("{}, 1 malformed line skipped", counts),
        n => format!("{}, {} malformed lines skipped", counts, n),
    }
}

/// Project path with the home directory collapsed to `~`
pub(crate) fn display_path(path: &str) -> String {
    collapse_home(path, dirs::home_dir().as_deref())
}

fn collapse_home(path: &str, home: Option<&Path>) -> String {
    let Some(home) = home.and_then(|h| h.to_str()).filter(|h| h.len() > 1) else {
        return path.to_string();
    };
    match path.strip_prefix(home) {
        Some("") => "~".to_string(),
        Some(rest) if rest.starts_with('/') => format!("~{}", rest),
        _ => path.to_string(),
    }
}
