//! Orphan scanner
//!
//! Finds transcripts that no index entry references and synthesises a
//! minimal session for each by reading the transcript itself.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use tracing::debug;

use super::{
    parse_event, session_id_from_path, transcript_files, truncate_chars, truncate_line,
    Diagnostics, IssueKind, ProjectDir, ScanOptions,
};
use crate::model::{Role, Session, NO_SUMMARY};

/// Shortest prompt worth using as a summary
const MIN_SUMMARY_CHARS: usize = 3;

const MAX_FIRST_PROMPT_CHARS: usize = 200;

/// What a single pass over a transcript found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptScan {
    /// Lines that parsed as events, of any kind
    pub events: u64,
    pub malformed_lines: usize,
    /// First human-authored prompt, if any
    pub first_prompt: Option<String>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub cwd: Option<String>,
}

/// Read a transcript top to bottom, skipping malformed lines
pub fn scan_transcript(path: &Path, options: &ScanOptions) -> std::io::Result<TranscriptScan> {
    let reader = BufReader::new(File::open(path)?);
    let mut scan = TranscriptScan::default();

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                scan.malformed_lines += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let event = match parse_event(&line, options) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(_) => {
                scan.malformed_lines += 1;
                continue;
            }
        };

        scan.events += 1;
        if event.timestamp.is_some() {
            scan.last_timestamp = event.timestamp;
        }
        if scan.cwd.is_none() {
            scan.cwd = event.cwd.clone();
        }
        if scan.first_prompt.is_none() && !event.is_meta {
            scan.first_prompt = event
                .message()
                .filter(|m| m.role == Role::User)
                .and_then(|m| m.first_text())
                .map(str::trim)
                .filter(|t| is_human_prompt(t))
                .map(String::from);
        }
    }

    Ok(scan)
}

/// Client-injected command markup starts with a tag
fn is_human_prompt(text: &str) -> bool {
    text.chars().count() >= MIN_SUMMARY_CHARS && !text.starts_with('<')
}

/// Build sessions for transcripts in `project` whose IDs are not in `known`
///
/// Project path precedence: the index's `original_path`, then the first
/// `cwd` in the transcript, then the decoded directory name.
pub fn scan_orphans(
    project: &ProjectDir,
    known: &HashSet<String>,
    original_path: Option<&str>,
    options: &ScanOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<Session> {
    let mut sessions = vec![];

    for path in transcript_files(project, options, diagnostics) {
        let Some(id) = session_id_from_path(&path) else {
            continue;
        };
        if known.contains(&id) {
            continue;
        }

        debug!("scanning unindexed transcript {}", path.display());
        let scan = match scan_transcript(&path, options) {
            Ok(scan) => scan,
            Err(e) => {
                diagnostics.record(&path, IssueKind::UnreadableTranscript(e.to_string()));
                continue;
            }
        };

        if scan.malformed_lines > 0 {
            diagnostics.record(
                &path,
                IssueKind::MalformedLines {
                    count: scan.malformed_lines,
                },
            );
        }

        let Some(timestamp) = scan.last_timestamp else {
            diagnostics.record(&path, IssueKind::EmptyTranscript);
            continue;
        };

        let summary = scan
            .first_prompt
            .as_deref()
            .map(|p| truncate_line(p, options.summary_max_chars))
            .unwrap_or_else(|| NO_SUMMARY.to_string());

        sessions.push(Session {
            id,
            project_path: original_path
                .map(String::from)
                .or(scan.cwd)
                .unwrap_or_else(|| project.decoded_path()),
            summary,
            timestamp,
            message_count: scan.events,
            is_orphan: true,
            first_prompt: scan
                .first_prompt
                .map(|p| truncate_chars(&p, MAX_FIRST_PROMPT_CHARS)),
            git_branch: None,
        });
    }

    sessions
}
