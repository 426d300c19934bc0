//! Record model shared by the scanners, the aggregator and the renderers
//!
//! All records are read-only snapshots built from the session files at
//! invocation time.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Summary used when neither the index nor the transcript supplies one
pub const NO_SUMMARY: &str = "(no summary)";

/// One recorded conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "session_id")]
    pub id: String,
    pub project_path: String,
    pub summary: String,
    /// Last activity; the grouping key
    pub timestamp: DateTime<Utc>,
    pub message_count: u64,
    pub is_orphan: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
}

/// Speaker of a transcript event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "System",
            Role::Tool => "Tool",
        }
    }

    /// Whether the role is shown in the transcript view
    pub fn is_dialogue(&self) -> bool {
        matches!(self, Role::User | Role::Assistant)
    }
}

/// One block of message content, already reduced to display text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum ContentPart {
    Text(String),
    ToolUse(String),
    ToolResult(String),
}

impl ContentPart {
    pub fn as_str(&self) -> &str {
        match self {
            ContentPart::Text(s) | ContentPart::ToolUse(s) | ContentPart::ToolResult(s) => s,
        }
    }
}

/// One dialogue turn in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentPart>,
    pub timestamp: Option<DateTime<FixedOffset>>,
}

impl Message {
    /// All content parts joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(ContentPart::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// First plain-text part, ignoring tool blocks
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|part| match part {
            ContentPart::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

/// A session placed in its date group, with its local time of day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedSession {
    #[serde(flatten)]
    pub session: Session,
    pub local_time: NaiveTime,
}

/// Sessions sharing a local calendar date, newest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub sessions: Vec<GroupedSession>,
}

impl DateGroup {
    pub fn weekday(&self) -> String {
        self.date.format("%A").to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub sessions: usize,
    pub messages: u64,
    pub orphans: usize,
    pub projects: usize,
}

impl Totals {
    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Self {
        let mut totals = Totals::default();
        let mut projects = HashSet::new();
        for session in sessions {
            totals.sessions += 1;
            totals.messages += session.message_count;
            if session.is_orphan {
                totals.orphans += 1;
            }
            projects.insert(session.project_path.as_str());
        }
        totals.projects = projects.len();
        totals
    }
}

/// Aggregated listing: dates newest first, plus totals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub groups: Vec<DateGroup>,
    pub totals: Totals,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every session in report order
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.groups
            .iter()
            .flat_map(|g| g.sessions.iter().map(|gs| &gs.session))
    }
}

/// Rendered view of one session's dialogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub session_id: String,
    pub path: PathBuf,
    pub project_path: Option<String>,
    /// Every parsed event, dialogue or not
    pub total_events: usize,
    /// Dialogue turns before any limit was applied
    pub dialogue_turns: usize,
    pub malformed_lines: usize,
    pub messages: Vec<Message>,
}

impl Transcript {
    pub fn is_truncated(&self) -> bool {
        self.messages.len() < self.dialogue_turns
    }
}
