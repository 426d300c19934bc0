//! Aggregator: merges indexed and orphan sessions across all projects and
//! groups them by local calendar date

use chrono::{NaiveDate, TimeZone};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use tracing::info;

use crate::error::Result;
use crate::model::{DateGroup, GroupedSession, Report, Session, Totals};
use crate::scan::{
    list_projects, read_index, scan_orphans, Diagnostics, IssueKind, ScanOptions,
    INDEX_FILE_NAME,
};

/// A report plus everything that was skipped while building it
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub report: Report,
    pub diagnostics: Diagnostics,
}

pub struct Aggregator {
    root: PathBuf,
    options: ScanOptions,
}

impl Aggregator {
    pub fn new(root: impl Into<PathBuf>, options: ScanOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    /// Scan every project and build the dated report
    ///
    /// Only a missing or unreadable root is an error.
    pub fn aggregate<Tz: TimeZone>(&self, tz: &Tz) -> Result<Aggregation> {
        let mut diagnostics = Diagnostics::new();
        let sessions = self.collect_sessions(&mut diagnostics)?;
        let report = build_report(sessions, tz);

        info!(
            "{} sessions ({} unindexed) across {} projects, {} messages",
            report.totals.sessions,
            report.totals.orphans,
            report.totals.projects,
            report.totals.messages
        );

        Ok(Aggregation {
            report,
            diagnostics,
        })
    }

    /// All sessions, unique by ID
    ///
    /// Every index is read before any transcript is scanned, so an index
    /// entry in any project takes priority over a raw transcript anywhere.
    pub fn collect_sessions(&self, diagnostics: &mut Diagnostics) -> Result<Vec<Session>> {
        let projects = list_projects(&self.root, diagnostics)?;

        let mut known: HashSet<String> = HashSet::new();
        let mut sessions = vec![];
        let mut original_paths = Vec::with_capacity(projects.len());

        for project in &projects {
            let scan = read_index(project, diagnostics);
            for session in scan.sessions {
                if known.insert(session.id.clone()) {
                    sessions.push(session);
                } else {
                    diagnostics.record(
                        project.path.join(INDEX_FILE_NAME),
                        IssueKind::DuplicateSession(session.id),
                    );
                }
            }
            original_paths.push(scan.original_path);
        }

        for (project, original_path) in projects.iter().zip(&original_paths) {
            let orphans = scan_orphans(
                project,
                &known,
                original_path.as_deref(),
                &self.options,
                diagnostics,
            );
            for orphan in orphans {
                known.insert(orphan.id.clone());
                sessions.push(orphan);
            }
        }

        Ok(sessions)
    }
}

/// Group sessions into a report, dates and times descending
pub fn build_report<Tz: TimeZone>(sessions: Vec<Session>, tz: &Tz) -> Report {
    let totals = Totals::from_sessions(&sessions);
    Report {
        groups: group_by_date(sessions, tz),
        totals,
    }
}

/// Group by the calendar date of each timestamp in `tz`
///
/// Ties on timestamp are broken by session ID so the output is stable.
pub fn group_by_date<Tz: TimeZone>(sessions: Vec<Session>, tz: &Tz) -> Vec<DateGroup> {
    let mut by_date: BTreeMap<NaiveDate, Vec<GroupedSession>> = BTreeMap::new();

    for session in sessions {
        let local = session.timestamp.with_timezone(tz);
        by_date
            .entry(local.date_naive())
            .or_default()
            .push(GroupedSession {
                local_time: local.time(),
                session,
            });
    }

    by_date
        .into_iter()
        .rev()
        .map(|(date, mut sessions)| {
            sessions.sort_by(|a, b| {
                b.session
                    .timestamp
                    .cmp(&a.session.timestamp)
                    .then_with(|| a.session.id.cmp(&b.session.id))
            });
            DateGroup { date, sessions }
        })
        .collect()
}
