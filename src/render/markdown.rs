use super::{date_heading, display_path, message_time, transcript_counts, Render};
use crate::error::Result;
use crate::model::{Report, Transcript};

/// Markdown headings per date with a session table under each
pub struct MarkdownRenderer;

impl Render for MarkdownRenderer {
    fn render_report(&self, report: &Report) -> Result<String> {
        let mut lines = vec!["# Claude Code Session History".to_string(), String::new()];

        if report.is_empty() {
            lines.push("No sessions found.".to_string());
            return Ok(finish(lines));
        }

        lines.push(format!("**Total Sessions:** {}  ", report.totals.sessions));
        lines.push(format!("**Total Messages:** {}  ", report.totals.messages));
        lines.push(format!("**Unindexed Sessions:** {}  ", report.totals.orphans));
        lines.push(format!("**Projects:** {}", report.totals.projects));
        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(String::new());

        for group in &report.groups {
            lines.push(format!("## {}", date_heading(group.date)));
            lines.push(String::new());
            lines.push("| Time | Project | Branch | Summary | Messages | Session |".to_string());
            lines.push("|------|---------|--------|---------|----------|---------|".to_string());

            for entry in &group.sessions {
                let session = &entry.session;
                let marker = if session.is_orphan { " (unindexed)" } else { "" };
                let branch = session
                    .git_branch
                    .as_deref()
                    .map(code_cell)
                    .unwrap_or_default();
                let mut summary = escape_cell(&session.summary);
                if let Some(prompt) = session.first_prompt.as_deref() {
                    if prompt != session.summary {
                        summary.push_str(&format!("<br>*Prompt:* {}", escape_cell(prompt)));
                    }
                }
                lines.push(format!(
                    "| {} | {} | {} | {} | {} | {}{} |",
                    entry.local_time.format("%H:%M"),
                    code_cell(&display_path(&session.project_path)),
                    branch,
                    summary,
                    session.message_count,
                    code_cell(&session.id),
                    marker,
                ));
            }
            lines.push(String::new());
        }

        Ok(finish(lines))
    }

    fn render_transcript(&self, transcript: &Transcript) -> Result<String> {
        let mut lines = vec![
            format!("# Session: {}", transcript.session_id),
            String::new(),
            format!(
                "**File:** {}  ",
                code_cell(&transcript.path.display().to_string())
            ),
        ];
        if let Some(project) = &transcript.project_path {
            lines.push(format!("**Project:** {}  ", code_cell(&display_path(project))));
        }
        lines.push(format!("**Messages:** {}", transcript_counts(transcript)));
        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(String::new());

        if transcript.messages.is_empty() {
            lines.push("No messages found in session.".to_string());
            return Ok(finish(lines));
        }

        for message in &transcript.messages {
            lines.push(format!(
                "## {} ({})",
                message.role.label(),
                message_time(message.timestamp.as_ref())
            ));
            lines.push(String::new());
            lines.push(message.text());
            lines.push(String::new());
        }

        Ok(finish(lines))
    }
}

fn finish(mut lines: Vec<String>) -> String {
    while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
        lines.pop();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Keep a value inside one table cell
fn escape_cell(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace(['\r', '\n'], " ")
}

/// Inline code span that survives backticks and pipes in `text`
fn code_cell(text: &str) -> String {
    let text = text.replace('|', "\\|").replace(['\r', '\n'], " ");

    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        run = if c == '`' { run + 1 } else { 0 };
        longest = longest.max(run);
    }

    let fence = "`".repeat(longest + 1);
    let pad = if text.starts_with('`') || text.ends_with('`') { " " } else { "" };
    format!("{}{}{}{}{}", fence, pad, text, pad, fence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_report;
    use crate::model::{ContentPart, Message, Role, Session};
    use chrono::Utc;
    use std::path::PathBuf;

    fn session(id: &str, ts: &str, summary: &str, orphan: bool) -> Session {
        Session {
            id: id.to_string(),
            project_path: "/work/app".to_string(),
            summary: summary.to_string(),
            timestamp: ts.parse().unwrap(),
            message_count: 5,
            is_orphan: orphan,
            first_prompt: None,
            git_branch: None,
        }
    }

    #[test]
    fn test_report_layout() {
        let report = build_report(
            vec![
                session("abc123", "2026-01-24T21:42:00Z", "Fix a|b\nparsing", false),
                session("def456", "2026-01-24T21:00:00Z", "Retry logic", true),
            ],
            &Utc,
        );
        let out = MarkdownRenderer.render_report(&report).unwrap();

        assert!(out.contains("**Total Sessions:** 2"));
        assert!(out.contains("**Total Messages:** 10"));
        assert!(out.contains("**Projects:** 1"));
        assert!(out.contains("## January 24, 2026 (Saturday)"));
        assert!(out.contains("| 21:42 | `/work/app` |  | Fix a\\|b parsing | 5 | `abc123` |"));
        assert!(out.contains("| 21:00 | `/work/app` |  | Retry logic | 5 | `def456` (unindexed) |"));
        assert!(out.find("abc123").unwrap() < out.find("def456").unwrap());
    }

    #[test]
    fn test_branch_and_first_prompt_columns() {
        let mut indexed = session("abc123", "2026-01-24T21:42:00Z", "Login 500s", false);
        indexed.git_branch = Some("feature-x".to_string());
        indexed.first_prompt = Some("the login page returns 500".to_string());
        let mut same = session("def456", "2026-01-24T21:00:00Z", "Retry logic", true);
        same.first_prompt = Some("Retry logic".to_string());

        let out = MarkdownRenderer
            .render_report(&build_report(vec![indexed, same], &Utc))
            .unwrap();

        assert!(out.contains(
            "| `feature-x` | Login 500s<br>*Prompt:* the login page returns 500 | 5 |"
        ));
        assert!(out.contains("|  | Retry logic | 5 | `def456` (unindexed) |"));
    }

    #[test]
    fn test_code_cell_delimiters() {
        assert_eq!(code_cell("/work/app"), "`/work/app`");
        assert_eq!(code_cell("/work/we`ird|dir"), "``/work/we`ird\\|dir``");
        assert_eq!(code_cell("`tick"), "`` `tick ``");
    }

    #[test]
    fn test_empty_report() {
        let out = MarkdownRenderer.render_report(&Default::default()).unwrap();
        assert_eq!(out, "# Claude Code Session History\n\nNo sessions found.\n");
    }

    #[test]
    fn test_transcript_layout() {
        let transcript = Transcript {
            session_id: "abc".to_string(),
            path: PathBuf::from("/data/-work-app/abc.jsonl"),
            project_path: Some("/work/app".to_string()),
            total_events: 9,
            dialogue_turns: 3,
            malformed_lines: 0,
            messages: vec![
                Message {
                    role: Role::User,
                    content: vec![ContentPart::Text("hi".to_string())],
                    timestamp: Some("2026-01-24T21:42:00+00:00".parse().unwrap()),
                },
                Message {
                    role: Role::Assistant,
                    content: vec![ContentPart::ToolUse("[Reading: a.rs]".to_string())],
                    timestamp: None,
                },
            ],
        };
        let out = MarkdownRenderer.render_transcript(&transcript).unwrap();

        assert!(out.starts_with("# Session: abc\n"));
        assert!(out.contains("**Messages:** showing last 2 of 3 messages, 9 events"));
        assert!(out.contains("## User (2026-01-24 21:42:00)\n\nhi\n"));
        assert!(out.contains("## Assistant (?)\n\n[Reading: a.rs]\n"));
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript {
            session_id: "abc".to_string(),
            path: PathBuf::from("/data/abc.jsonl"),
            project_path: None,
            total_events: 1,
            dialogue_turns: 0,
            malformed_lines: 0,
            messages: vec![],
        };
        let out = MarkdownRenderer.render_transcript(&transcript).unwrap();
        assert!(out.ends_with("No messages found in session.\n"));
    }
}
