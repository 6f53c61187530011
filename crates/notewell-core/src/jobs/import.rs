//! Per-run import session: file outcomes, counts and the run log note.
//!
//! Owned by a single run and never shared.

use serde::Serialize;

use super::types::ImportProgress;

/// Tag marking run log notes in the store.
pub const LOG_TAG: &str = "notewelllog";

/// Detail attached to a successful note whose source produced no text.
pub const NO_TEXT_DETAIL: &str = "no text extracted";

/// What happened to one discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Created { detail: Option<String> },
    WouldCreate { detail: Option<String> },
    /// Destination note already existed.
    Skipped,
    /// Larger than the size ceiling; never opened.
    Blocked { limit_mb: u64, dry_run: bool },
    Failed { reason: String, dry_run: bool },
}

impl FileOutcome {
    /// Log status line, with any detail appended in parentheses.
    pub fn status(&self) -> String {
        let (base, detail) = match self {
            Self::Created { detail } => ("Created note".to_string(), detail.as_deref()),
            Self::WouldCreate { detail } => ("Would create note".to_string(), detail.as_deref()),
            Self::Skipped => ("Skipped as note already exists".to_string(), None),
            Self::Blocked { limit_mb, dry_run } => {
                let verb = if *dry_run { "Would block" } else { "Blocked" };
                (format!("{verb} importing as exceeds {limit_mb}MB"), None)
            }
            Self::Failed { reason, dry_run } => {
                let base = if *dry_run { "Dry run failed" } else { "Failed to create note" };
                (base.to_string(), Some(reason.as_str()))
            }
        };
        match detail {
            Some(detail) if !detail.is_empty() => format!("{base} ({detail})"),
            _ => base,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Blocked { .. } | Self::Failed { .. })
    }
}

/// One row of the run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub path: String,
    pub status: String,
}

/// Runtime state of one import run.
#[derive(Debug, Default)]
pub struct ImportSession {
    total: usize,
    processed: usize,
    failed: usize,
    created: usize,
    skipped: usize,
    cancelled: bool,
    entries: Vec<LogEntry>,
}

impl ImportSession {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Record a file's outcome, in discovery order.
    pub fn record(&mut self, path: impl Into<String>, outcome: &FileOutcome) {
        self.processed += 1;
        match outcome {
            FileOutcome::Created { .. } | FileOutcome::WouldCreate { .. } => self.created += 1,
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Blocked { .. } | FileOutcome::Failed { .. } => self.failed += 1,
        }
        self.entries.push(LogEntry {
            path: path.into(),
            status: outcome.status(),
        });
    }

    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn progress(&self) -> ImportProgress {
        ImportProgress {
            total_files: self.total,
            files_processed: self.processed,
            files_failed: self.failed,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Markdown body of the run log note.
    pub fn render_log(&self, run_id: &str) -> String {
        let mut log = format!("# Import Log - {run_id}\n\n| File Path | Status |\n| --- | --- |\n");
        for entry in &self.entries {
            log.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&entry.path),
                escape_cell(&entry.status)
            ));
        }
        if self.cancelled {
            log.push_str(&format!(
                "\nImport cancelled after {} of {} files.\n",
                self.processed, self.total
            ));
        }
        log
    }
}

/// Escape `|` so a value stays inside its table cell.
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
