//! Transcript viewer
//!
//! Locates one session by ID substring and reduces its transcript to the
//! user/assistant dialogue. Matching is case-sensitive; an exact ID match
//! wins over substring matches.

use chrono::TimeZone;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Message, Transcript};
use crate::scan::{
    list_projects, parse_event, session_id_from_path, transcript_files, Diagnostics, IssueKind,
    ScanOptions,
};

pub struct TranscriptViewer {
    root: PathBuf,
    options: ScanOptions,
}

impl TranscriptViewer {
    pub fn new(root: impl Into<PathBuf>, options: ScanOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    /// Find the transcript whose ID contains `query`
    pub fn find_session(&self, query: &str, diagnostics: &mut Diagnostics) -> Result<PathBuf> {
        let mut exact = vec![];
        let mut partial = vec![];

        for project in list_projects(&self.root, diagnostics)? {
            for path in transcript_files(&project, &self.options, diagnostics) {
                let Some(id) = session_id_from_path(&path) else {
                    continue;
                };
                if id == query {
                    exact.push((id, path));
                } else if id.contains(query) {
                    partial.push((id, path));
                }
            }
        }

        let mut matches = if exact.is_empty() { partial } else { exact };
        matches.sort();

        match matches.len() {
            0 => Err(Error::SessionNotFound(query.to_string())),
            1 => Ok(matches.remove(0).1),
            _ => Err(Error::AmbiguousSession {
                query: query.to_string(),
                candidates: matches.into_iter().map(|(id, _)| id).collect(),
            }),
        }
    }

    /// Load the dialogue of the session matching `query`
    ///
    /// `max_messages > 0` keeps only the last N turns.
    pub fn view<Tz: TimeZone>(
        &self,
        query: &str,
        max_messages: usize,
        tz: &Tz,
        diagnostics: &mut Diagnostics,
    ) -> Result<Transcript> {
        let path = self.find_session(query, diagnostics)?;
        debug!("viewing {}", path.display());

        match load_transcript(&path, max_messages, &self.options, tz) {
            Ok(transcript) => {
                if transcript.malformed_lines > 0 {
                    diagnostics.record(
                        &path,
                        IssueKind::MalformedLines {
                            count: transcript.malformed_lines,
                        },
                    );
                }
                Ok(transcript)
            }
            Err(e) => {
                diagnostics.record(&path, IssueKind::UnreadableTranscript(e.to_string()));
                Err(Error::SessionNotFound(query.to_string()))
            }
        }
    }
}

/// Parse a transcript file into its dialogue, oldest first
pub fn load_transcript<Tz: TimeZone>(
    path: &Path,
    max_messages: usize,
    options: &ScanOptions,
    tz: &Tz,
) -> std::io::Result<Transcript> {
    let reader = BufReader::new(File::open(path)?);

    let mut total_events = 0;
    let mut malformed_lines = 0;
    let mut project_path = None;
    let mut messages: Vec<Message> = vec![];

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                malformed_lines += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let event = match parse_event(&line, options) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(_) => {
                malformed_lines += 1;
                continue;
            }
        };

        total_events += 1;
        if project_path.is_none() {
            project_path = event.cwd.clone();
        }
        if event.is_meta {
            continue;
        }

        if let Some(message) = event.message() {
            if message.role.is_dialogue() && !message.text().trim().is_empty() {
                let mut message = message.clone();
                message.timestamp = message
                    .timestamp
                    .map(|ts| ts.with_timezone(tz).fixed_offset());
                messages.push(message);
            }
        }
    }

    let dialogue_turns = messages.len();
    if max_messages > 0 && dialogue_turns > max_messages {
        messages.drain(..dialogue_turns - max_messages);
    }

    Ok(Transcript {
        session_id: session_id_from_path(path).unwrap_or_default(),
        path: path.to_path_buf(),
        project_path,
        total_events,
        dialogue_turns,
        malformed_lines,
        messages,
    })
}
