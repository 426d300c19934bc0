use super::{date_heading, display_path, message_time, transcript_counts, Render};
use crate::error::Result;
use crate::model::{Report, Transcript};

/// Plain indented text, friendly to grep and pagers
pub struct TextRenderer;

impl Render for TextRenderer {
    fn render_report(&self, report: &Report) -> Result<String> {
        let mut out = String::new();
        out.push_str("CLAUDE CODE SESSION HISTORY\n");
        out.push_str(&"=".repeat(40));
        out.push('\n');

        if report.is_empty() {
            out.push_str("No sessions found.\n");
            return Ok(out);
        }

        out.push_str(&format!("Total sessions: {}\n", report.totals.sessions));
        out.push_str(&format!("Total messages: {}\n", report.totals.messages));
        out.push_str(&format!("Unindexed sessions: {}\n", report.totals.orphans));
        out.push_str(&format!("Projects: {}\n", report.totals.projects));

        for group in &report.groups {
            let heading = date_heading(group.date);
            out.push('\n');
            out.push_str(&heading);
            out.push('\n');
            out.push_str(&"-".repeat(heading.chars().count()));
            out.push('\n');

            for entry in &group.sessions {
                let session = &entry.session;
                let marker = if session.is_orphan { " (unindexed)" } else { "" };
                out.push_str(&format!(
                    "  {}  [{}]  {}{}\n",
                    entry.local_time.format("%H:%M"),
                    display_path(&session.project_path),
                    session.id,
                    marker
                ));
                for line in session.summary.lines() {
                    out.push_str(&format!("    {}\n", line));
                }
                if let Some(branch) = &session.git_branch {
                    out.push_str(&format!("    branch: {}\n", branch));
                }
                if let Some(prompt) = session.first_prompt.as_deref() {
                    if prompt != session.summary {
                        let mut lines = prompt.lines();
                        out.push_str(&format!("    prompt: {}\n", lines.next().unwrap_or("")));
                        for line in lines {
                            out.push_str(&format!("            {}\n", line));
                        }
                    }
                }
                out.push_str(&format!("    ({} messages)\n", session.message_count));
            }
        }

        Ok(out)
    }

    fn render_transcript(&self, transcript: &Transcript) -> Result<String> {
        let mut out = String::new();
        out.push_str(&format!("Session: {}\n", transcript.session_id));
        out.push_str(&format!("File: {}\n", transcript.path.display()));
        if let Some(project) = &transcript.project_path {
            out.push_str(&format!("Project: {}\n", display_path(project)));
        }
        out.push_str(&format!("Messages: {}\n", transcript_counts(transcript)));
        out.push_str(&"=".repeat(80));
        out.push('\n');

        if transcript.messages.is_empty() {
            out.push_str("\nNo messages found in session.\n");
            return Ok(out);
        }

        for message in &transcript.messages {
            out.push_str(&format!(
                "\n[{}] ({})\n",
                message.role.as_str().to_uppercase(),
                message_time(message.timestamp.as_ref())
            ));
            out.push_str(&message.text());
            out.push('\n');
            out.push_str(&"-".repeat(40));
            out.push('\n');
        }

        Ok(out)
    }
}
