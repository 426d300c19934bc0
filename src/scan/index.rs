//! Index reader
//!
//! Loads `sessions-index.json`, the pre-computed per-project summary file.
//! A missing index is the common case and yields nothing; a malformed one is
//! ignored as a whole so the orphan scanner picks up its transcripts instead.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::ErrorKind;
use tracing::debug;

use super::{truncate_chars, Diagnostics, IssueKind, ProjectDir};
use crate::model::{Session, NO_SUMMARY};

pub const INDEX_FILE_NAME: &str = "sessions-index.json";

const MAX_FIRST_PROMPT_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexFile {
    #[serde(default)]
    original_path: Option<String>,
    #[serde(default)]
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexEntry {
    session_id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    first_prompt: Option<String>,
    #[serde(default)]
    message_count: Option<u64>,
    #[serde(default)]
    created: Option<DateTime<Utc>>,
    #[serde(default)]
    modified: Option<DateTime<Utc>>,
    #[serde(default)]
    project_path: Option<String>,
    #[serde(default)]
    git_branch: Option<String>,
}

/// Result of reading one project's index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexScan {
    pub sessions: Vec<Session>,
    /// Project path recorded at the top of the index
    pub original_path: Option<String>,
}

/// Read a project's index into sessions (`is_orphan = false`)
pub fn read_index(project: &ProjectDir, diagnostics: &mut Diagnostics) -> IndexScan {
    let index_path = project.path.join(INDEX_FILE_NAME);

    let content = match std::fs::read_to_string(&index_path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return IndexScan::default(),
        // The transcript walk reports a directory it cannot list
        Err(e) if std::fs::read_dir(&project.path).is_err() => {
            debug!("{}: skipping index: {}", index_path.display(), e);
            return IndexScan::default();
        }
        Err(e) => {
            diagnostics.record(&index_path, IssueKind::MalformedIndex(e.to_string()));
            return IndexScan::default();
        }
    };

    match parse_index(&content, project) {
        Ok(scan) => {
            debug!(
                "{}: {} indexed sessions",
                index_path.display(),
                scan.sessions.len()
            );
            scan
        }
        Err(reason) => {
            diagnostics.record(&index_path, IssueKind::MalformedIndex(reason));
            IndexScan::default()
        }
    }
}

/// Parse index content; any invalid entry rejects the whole index
fn parse_index(content: &str, project: &ProjectDir) -> Result<IndexScan, String> {
    let index: IndexFile = serde_json::from_str(content).map_err(|e| e.to_string())?;

    let original_path = non_empty(index.original_path);
    let fallback_path = original_path
        .clone()
        .unwrap_or_else(|| project.decoded_path());

    let mut seen = HashSet::new();
    let mut sessions = vec![];

    for entry in index.entries {
        if entry.session_id.is_empty() {
            return Err("entry with empty sessionId".to_string());
        }
        let timestamp = entry.modified.or(entry.created).ok_or_else(|| {
            format!("entry {} has neither modified nor created", entry.session_id)
        })?;

        if !seen.insert(entry.session_id.clone()) {
            continue;
        }

        sessions.push(Session {
            id: entry.session_id,
            project_path: non_empty(entry.project_path).unwrap_or_else(|| fallback_path.clone()),
            summary: non_empty(entry.summary).unwrap_or_else(|| NO_SUMMARY.to_string()),
            timestamp,
            message_count: entry.message_count.unwrap_or(0),
            is_orphan: false,
            first_prompt: non_empty(entry.first_prompt)
                .map(|p| truncate_chars(&p, MAX_FIRST_PROMPT_CHARS)),
            git_branch: non_empty(entry.git_branch),
        });
    }

    Ok(IndexScan {
        sessions,
        original_path,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn project_with_index(tmp: &TempDir, index: &str) -> ProjectDir {
        let dir = tmp.path().join("-home-me-app");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join(INDEX_FILE_NAME), index).unwrap();
        ProjectDir::from_path(dir)
    }

    #[test]
    fn test_missing_index_is_empty_without_issue() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("-p");
        fs::create_dir(&dir).unwrap();

        let mut diagnostics = Diagnostics::new();
        let scan = read_index(&ProjectDir::from_path(dir), &mut diagnostics);
        assert!(scan.sessions.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_reads_entries() {
        let tmp = TempDir::new().unwrap();
        let index = json!({
            "originalPath": "/home/me/my-app",
            "entries": [
                {
                    "sessionId": "abc123",
                    "summary": "Fix login flow",
                    "firstPrompt": "the login page 500s",
                    "messageCount": 12,
                    "created": "2026-01-24T20:00:00Z",
                    "modified": "2026-01-24T21:42:00Z",
                    "gitBranch": "main"
                },
                {
                    "sessionId": "def456",
                    "created": "2026-01-23T10:00:00+02:00",
                    "projectPath": "/elsewhere"
                }
            ]
        });
        let project = project_with_index(&tmp, &index.to_string());

        let mut diagnostics = Diagnostics::new();
        let scan = read_index(&project, &mut diagnostics);
        assert!(diagnostics.is_empty());
        assert_eq!(scan.original_path.as_deref(), Some("/home/me/my-app"));
        assert_eq!(scan.sessions.len(), 2);

        let first = &scan.sessions[0];
        assert_eq!(first.id, "abc123");
        assert_eq!(first.summary, "Fix login flow");
        assert_eq!(first.message_count, 12);
        assert_eq!(first.timestamp, Utc.with_ymd_and_hms(2026, 1, 24, 21, 42, 0).unwrap());
        assert_eq!(first.project_path, "/home/me/my-app");
        assert_eq!(first.git_branch.as_deref(), Some("main"));
        assert!(!first.is_orphan);

        let second = &scan.sessions[1];
        assert_eq!(second.summary, NO_SUMMARY);
        assert_eq!(second.message_count, 0);
        assert_eq!(second.timestamp, Utc.with_ymd_and_hms(2026, 1, 23, 8, 0, 0).unwrap());
        assert_eq!(second.project_path, "/elsewhere");
    }

    #[test]
    fn test_falls_back_to_decoded_dir_name() {
        let tmp = TempDir::new().unwrap();
        let index = json!({"entries": [{"sessionId": "a", "created": "2026-01-24T20:00:00Z"}]});
        let project = project_with_index(&tmp, &index.to_string());

        let scan = read_index(&project, &mut Diagnostics::new());
        assert_eq!(scan.sessions[0].project_path, "/home/me/app");
    }

    #[test]
    fn test_invalid_json_ignored_with_issue() {
        let tmp = TempDir::new().unwrap();
        let project = project_with_index(&tmp, "{\"entries\": [");

        let mut diagnostics = Diagnostics::new();
        let scan = read_index(&project, &mut diagnostics);
        assert!(scan.sessions.is_empty());
        assert_eq!(diagnostics.issues().len(), 1);
        assert!(matches!(
            diagnostics.issues()[0].kind,
            IssueKind::MalformedIndex(_)
        ));
    }

    #[test]
    fn test_entry_without_timestamp_rejects_index() {
        let tmp = TempDir::new().unwrap();
        let index = json!({"entries": [
            {"sessionId": "a", "created": "2026-01-24T20:00:00Z"},
            {"sessionId": "b", "summary": "no time"}
        ]});
        let project = project_with_index(&tmp, &index.to_string());

        let mut diagnostics = Diagnostics::new();
        let scan = read_index(&project, &mut diagnostics);
        assert!(scan.sessions.is_empty());
        assert_eq!(diagnostics.issues().len(), 1);
    }

    #[test]
    fn test_duplicate_entries_keep_first() {
        let tmp = TempDir::new().unwrap();
        let index = json!({"entries": [
            {"sessionId": "a", "summary": "first", "created": "2026-01-24T20:00:00Z"},
            {"sessionId": "a", "summary": "second", "created": "2026-01-24T21:00:00Z"}
        ]});
        let project = project_with_index(&tmp, &index.to_string());

        let scan = read_index(&project, &mut Diagnostics::new());
        assert_eq!(scan.sessions.len(), 1);
        assert_eq!(scan.sessions[0].summary, "first");
    }

    #[test]
    fn test_unreadable_index_in_readable_dir_is_reported() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("-p");
        fs::create_dir_all(dir.join(INDEX_FILE_NAME)).unwrap();

        let mut diagnostics = Diagnostics::new();
        let scan = read_index(&ProjectDir::from_path(dir), &mut diagnostics);
        assert!(scan.sessions.is_empty());
        assert_eq!(diagnostics.summary().as_deref(), Some("1 index file ignored"));
    }

    #[test]
    fn test_unlistable_project_left_to_transcript_walk() {
        let tmp = TempDir::new().unwrap();
        let not_a_dir = tmp.path().join("-p");
        fs::write(&not_a_dir, "").unwrap();

        let mut diagnostics = Diagnostics::new();
        let scan = read_index(&ProjectDir::from_path(not_a_dir), &mut diagnostics);
        assert!(scan.sessions.is_empty());
        assert!(diagnostics.is_empty());
    }
}
