use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Render;
use crate::error::Result;
use crate::model::{DateGroup, GroupedSession, Message, Report, Totals, Transcript};

/// Pretty-printed JSON with stable field names
pub struct JsonRenderer;

#[derive(Debug, Serialize, Deserialize)]
struct ReportDocument {
    total_sessions: usize,
    total_messages: u64,
    total_orphans: usize,
    total_projects: usize,
    dates: Vec<DateDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DateDocument {
    date: NaiveDate,
    weekday: String,
    sessions: Vec<GroupedSession>,
}

#[derive(Debug, Serialize)]
struct TranscriptDocument<'a> {
    session_id: &'a str,
    path: &'a PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_path: Option<&'a str>,
    total_events: usize,
    dialogue_turns: usize,
    shown: usize,
    malformed_lines: usize,
    messages: &'a [Message],
}

impl Render for JsonRenderer {
    fn render_report(&self, report: &Report) -> Result<String> {
        let document = ReportDocument {
            total_sessions: report.totals.sessions,
            total_messages: report.totals.messages,
            total_orphans: report.totals.orphans,
            total_projects: report.totals.projects,
            dates: report
                .groups
                .iter()
                .map(|group| DateDocument {
                    date: group.date,
                    weekday: group.weekday(),
                    sessions: group.sessions.clone(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    fn render_transcript(&self, transcript: &Transcript) -> Result<String> {
        let document = TranscriptDocument {
            session_id: &transcript.session_id,
            path: &transcript.path,
            project_path: transcript.project_path.as_deref(),
            total_events: transcript.total_events,
            dialogue_turns: transcript.dialogue_turns,
            shown: transcript.messages.len(),
            malformed_lines: transcript.malformed_lines,
            messages: &transcript.messages,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

/// Read a JSON listing back into a report
pub fn parse_report_json(text: &str) -> Result<Report> {
    let document: ReportDocument = serde_json::from_str(text)?;
    Ok(Report {
        groups: document
            .dates
            .into_iter()
            .map(|d| DateGroup {
                date: d.date,
                sessions: d.sessions,
            })
            .collect(),
        totals: Totals {
            sessions: document.total_sessions,
            messages: document.total_messages,
            orphans: document.total_orphans,
            projects: document.total_projects,
        },
    })
}
