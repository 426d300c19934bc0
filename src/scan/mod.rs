//! Session storage scanning
//!
//! Data layout: ~/.claude/projects/<encoded_project_path>/
//!   sessions-index.json    pre-computed summaries (optional)
//!   <session_id>.jsonl     one transcript per session
//!
//! Everything here is read-only and best-effort: failures below the root
//! directory are recorded in [`Diagnostics`] and scanning continues.

pub mod event;
pub mod index;
pub mod orphan;

pub use event::{parse_event, Event, EventKind};
pub use index::{read_index, IndexScan, INDEX_FILE_NAME};
pub use orphan::{scan_orphans, scan_transcript, TranscriptScan};

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Transcript file extension
pub const TRANSCRIPT_EXTENSION: &str = "jsonl";

/// Prefix of subagent transcripts stored next to the main sessions
pub const AGENT_TRANSCRIPT_PREFIX: &str = "agent-";

/// Knobs for the scanners, resolved once from config at the CLI boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub summary_max_chars: usize,
    pub max_tool_result_chars: usize,
    pub include_agent_transcripts: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            summary_max_chars: 80,
            max_tool_result_chars: 200,
            include_agent_transcripts: false,
        }
    }
}

/// A project directory under the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDir {
    pub path: PathBuf,
    /// Encoded directory name, e.g. `-home-user-src-app`
    pub name: String,
}

impl ProjectDir {
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }

    /// Best-effort original path, used when nothing better is known
    pub fn decoded_path(&self) -> String {
        decode_project_dir_name(&self.name)
    }
}

/// What went wrong with a recovered failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    UnreadableProject(String),
    MalformedIndex(String),
    UnreadableTranscript(String),
    /// No parseable, timestamped events
    EmptyTranscript,
    MalformedLines { count: usize },
    DuplicateSession(String),
}

/// A recovered failure tied to the file or directory it happened in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: PathBuf,
    pub kind: IssueKind,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.kind {
            IssueKind::UnreadableProject(e) => write!(f, "{}: unreadable project: {}", path, e),
            IssueKind::MalformedIndex(e) => write!(f, "{}: index ignored: {}", path, e),
            IssueKind::UnreadableTranscript(e) => {
                write!(f, "{}: unreadable transcript: {}", path, e)
            }
            IssueKind::EmptyTranscript => write!(f, "{}: no timestamped events", path),
            IssueKind::MalformedLines { count } => {
                write!(f, "{}: {} malformed lines skipped", path, count)
            }
            IssueKind::DuplicateSession(id) => {
                write!(f, "{}: duplicate session {} dropped", path, id)
            }
        }
    }
}

/// Accumulator for recovered failures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: impl Into<PathBuf>, kind: IssueKind) {
        let issue = Issue {
            path: path.into(),
            kind,
        };
        warn!("{}", issue);
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// One-line summary, e.g. "2 transcripts skipped, 5 malformed lines skipped"
    pub fn summary(&self) -> Option<String> {
        let mut projects = 0;
        let mut indexes = 0;
        let mut transcripts = 0;
        let mut lines = 0;
        let mut duplicates = 0;

        for issue in &self.issues {
            match issue.kind {
                IssueKind::UnreadableProject(_) => projects += 1,
                IssueKind::MalformedIndex(_) => indexes += 1,
                IssueKind::UnreadableTranscript(_) | IssueKind::EmptyTranscript => {
                    transcripts += 1
                }
                IssueKind::MalformedLines { count } => lines += count,
                IssueKind::DuplicateSession(_) => duplicates += 1,
            }
        }

        let parts: Vec<String> = [
            (projects, "project", "skipped"),
            (indexes, "index file", "ignored"),
            (transcripts, "transcript", "skipped"),
            (lines, "malformed line", "skipped"),
            (duplicates, "duplicate session", "dropped"),
        ]
        .iter()
        .filter(|(n, _, _)| *n > 0)
        .map(|(n, noun, verb)| {
            let plural = if *n == 1 { "" } else { "s" };
            format!("{} {}{} {}", n, noun, plural, verb)
        })
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Decode `-home-user-app` back to `/home/user/app`
///
/// The encoding maps every `/` to `-`, so hyphens inside path components
/// cannot be told apart. Callers prefer paths recorded in the index or the
/// transcript when those exist.
pub fn decode_project_dir_name(encoded: &str) -> String {
    if encoded.starts_with('-') {
        encoded.replace('-', "/")
    } else {
        encoded.to_string()
    }
}

/// Inverse of [`decode_project_dir_name`]
pub fn encode_project_path(path: &str) -> String {
    path.replace('/', "-")
}

/// Check the root and list its project directories in name order
pub fn list_projects(root: &Path, diagnostics: &mut Diagnostics) -> Result<Vec<ProjectDir>> {
    if !root.exists() {
        return Err(Error::RootNotFound(root.to_path_buf()));
    }

    let entries = std::fs::read_dir(root).map_err(|source| Error::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut projects = vec![];
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                diagnostics.record(root, IssueKind::UnreadableProject(e.to_string()));
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            projects.push(ProjectDir::from_path(path));
        }
    }

    projects.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(projects)
}

/// Transcript files directly inside a project directory, sorted by name
pub fn transcript_files(
    project: &ProjectDir,
    options: &ScanOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<PathBuf> {
    let mut files = vec![];
    for entry in WalkDir::new(&project.path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if is_transcript(entry.path(), options) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => {
                diagnostics.record(&project.path, IssueKind::UnreadableProject(e.to_string()));
            }
        }
    }
    files
}

/// Whether `path` is a session transcript the scanners should read
fn is_transcript(path: &Path, options: &ScanOptions) -> bool {
    if !path.is_file() {
        return false;
    }
    if path.extension().map(|e| e != TRANSCRIPT_EXTENSION).unwrap_or(true) {
        return false;
    }
    if options.include_agent_transcripts {
        return true;
    }
    !path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(AGENT_TRANSCRIPT_PREFIX))
        .unwrap_or(false)
}

/// Session ID of a transcript file (its stem)
pub fn session_id_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(String::from)
}

/// First line of `text`, cut to `max_chars` characters with a `...` marker
pub fn truncate_line(text: &str, max_chars: usize) -> String {
    let first_line = text.trim().lines().next().unwrap_or("").trim_end();
    truncate_chars(first_line, max_chars)
}

/// Cut `text` to `max_chars` characters with a `...` marker
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
