//! Transcript line parsing
//!
//! Every line of a transcript is an independent JSON event. Lines vary in
//! shape across tool versions, so parsing goes through `serde_json::Value`
//! and anything unrecognised falls into [`EventKind::Other`] instead of
//! failing the line.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{truncate_chars, ScanOptions};
use crate::model::{ContentPart, Message, Role};

const MAX_COMMAND_CHARS: usize = 80;

/// One parsed transcript line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub timestamp: Option<DateTime<Utc>>,
    /// Working directory recorded by the client
    pub cwd: Option<String>,
    /// Client-injected messages (command caveats and the like)
    pub is_meta: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Message(Message),
    Summary(String),
    /// Any other event type, kept only so it can be counted
    Other(String),
}

impl Event {
    pub fn message(&self) -> Option<&Message> {
        match &self.kind {
            EventKind::Message(m) => Some(m),
            _ => None,
        }
    }
}

/// Parse one transcript line
///
/// Returns `Ok(None)` for blank lines and an error for anything that is not
/// a JSON object.
pub fn parse_event(line: &str, options: &ScanOptions) -> Result<Option<Event>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let json: Value = serde_json::from_str(line)?;
    if !json.is_object() {
        return Err(serde::de::Error::custom("event is not a JSON object"));
    }

    let raw_timestamp = json
        .get("timestamp")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok());

    let event_type = json.get("type").and_then(|v| v.as_str()).unwrap_or("");

    let kind = match event_type {
        "summary" => EventKind::Summary(
            json.get("summary")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        ),
        "user" | "assistant" | "system" => build_message(event_type, &json, options)
            .map(|mut m| {
                m.timestamp = raw_timestamp;
                EventKind::Message(m)
            })
            .unwrap_or_else(|| EventKind::Other(event_type.to_string())),
        "" => {
            // Older transcripts carry only the nested message
            let role = json
                .get("message")
                .and_then(|m| m.get("role"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            build_message(role, &json, options)
                .map(|mut m| {
                    m.timestamp = raw_timestamp;
                    EventKind::Message(m)
                })
                .unwrap_or_else(|| EventKind::Other(role.to_string()))
        }
        other => EventKind::Other(other.to_string()),
    };

    Ok(Some(Event {
        kind,
        timestamp: raw_timestamp.map(|dt| dt.with_timezone(&Utc)),
        cwd: json.get("cwd").and_then(|v| v.as_str()).map(String::from),
        is_meta: json.get("isMeta").and_then(|v| v.as_bool()).unwrap_or(false),
    }))
}

fn build_message(tag: &str, json: &Value, options: &ScanOptions) -> Option<Message> {
    let content = json
        .get("message")
        .and_then(|m| m.get("content"))
        .or_else(|| json.get("content"));

    let content = content
        .map(|c| content_parts(c, options))
        .unwrap_or_default();

    let role = match tag {
        "user" if is_tool_result_only(&content) => Role::Tool,
        "user" => Role::User,
        "assistant" => Role::Assistant,
        "system" => Role::System,
        "tool" => Role::Tool,
        _ => return None,
    };

    Some(Message {
        role,
        content,
        timestamp: None,
    })
}

fn is_tool_result_only(parts: &[ContentPart]) -> bool {
    !parts.is_empty() && parts.iter().all(|p| matches!(p, ContentPart::ToolResult(_)))
}

/// Reduce message content (a string or an array of blocks) to display parts
fn content_parts(content: &Value, options: &ScanOptions) -> Vec<ContentPart> {
    match content {
        Value::String(s) => vec![ContentPart::Text(s.clone())],
        Value::Array(blocks) => blocks
            .iter()
            .filter_map(|block| content_block(block, options))
            .collect(),
        _ => vec![],
    }
}

fn content_block(block: &Value, options: &ScanOptions) -> Option<ContentPart> {
    if let Some(s) = block.as_str() {
        return Some(ContentPart::Text(s.to_string()));
    }

    match block.get("type").and_then(|t| t.as_str())? {
        "text" => block
            .get("text")
            .and_then(|t| t.as_str())
            .map(|t| ContentPart::Text(t.to_string())),
        "tool_use" => {
            let name = block
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or("unknown");
            let input = block.get("input").unwrap_or(&Value::Null);
            Some(ContentPart::ToolUse(describe_tool_use(name, input)))
        }
        "tool_result" => {
            let text = block
                .get("content")
                .map(result_text)
                .unwrap_or_default();
            Some(ContentPart::ToolResult(format!(
                "[Result: {}]",
                truncate_chars(&text, options.max_tool_result_chars)
            )))
        }
        _ => None,
    }
}

fn result_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn describe_tool_use(name: &str, input: &Value) -> String {
    let field = |key: &str| input.get(key).and_then(|v| v.as_str()).unwrap_or("?");
    match name {
        "Read" => format!("[Reading: {}]", field("file_path")),
        "Edit" => format!("[Editing: {}]", field("file_path")),
        "Write" => format!("[Writing: {}]", field("file_path")),
        "Bash" => {
            let command = input.get("command").and_then(|v| v.as_str()).unwrap_or("");
            format!("[Running: {}]", truncate_chars(command, MAX_COMMAND_CHARS))
        }
        "Grep" => format!("[Searching: {}]", field("pattern")),
        "Glob" => format!("[Finding: {}]", field("pattern")),
        _ => format!("[Tool: {}]", name),
    }
}
