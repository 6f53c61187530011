//! Run identity, progress reporting and summary types for the import pipeline.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Format of a run id: local time, second resolution.
pub const RUN_ID_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Timestamp token naming a run's destination folder and log note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunIdentity {
    pub started_at: DateTime<Local>,
    pub id: String,
}

impl RunIdentity {
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    pub fn at(started_at: DateTime<Local>) -> Self {
        Self {
            id: started_at.format(RUN_ID_FORMAT).to_string(),
            started_at,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for RunIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Counts pushed to the progress sink after each file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProgress {
    pub total_files: usize,
    pub files_processed: usize,
    pub files_failed: usize,
}

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase")]
pub enum ImportPhase {
    Scanning { source_root: String },
    /// Files discovered; per-file processing starts.
    Processing { total_files: usize },
    WritingLog { path: String },
    Cancelled { files_processed: usize },
    Done,
}

/// Receives progress from a running import and can ask it to stop.
///
/// Implement this to drive a progress display. Cancellation is polled once
/// per file, before the file's size check.
pub trait ProgressEmitter: Send + Sync {
    fn emit_progress(&self, progress: ImportProgress);

    fn emit_phase(&self, _phase: ImportPhase) {}

    /// Whether the user asked to stop the run.
    fn cancel_requested(&self) -> bool {
        false
    }
}

/// No-op implementation for testing
pub struct NoOpEmitter;

impl ProgressEmitter for NoOpEmitter {
    fn emit_progress(&self, _progress: ImportProgress) {}
}

/// What a finished run reports back to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub run_id: String,
    pub dry_run: bool,
    pub total_discovered: usize,
    pub files_processed: usize,
    /// Notes created, or that would be created in a dry run.
    pub notes_created: usize,
    pub notes_skipped: usize,
    pub failures: usize,
    pub cancelled: bool,
    /// Store path of the run log note, when it was written.
    pub log_path: Option<String>,
    /// Run-level problems that did not stop the import.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cancelled {
            writeln!(f, "Import cancelled.")?;
        } else if self.dry_run {
            writeln!(f, "Dry run complete.")?;
        } else {
            writeln!(f, "Import complete.")?;
        }
        writeln!(f, "Total files discovered: {}", self.total_discovered)?;
        if self.dry_run {
            writeln!(f, "Total notes that would be created: {}", self.notes_created)?;
        } else {
            writeln!(f, "Total notes created: {}", self.notes_created)?;
        }
        if self.notes_skipped > 0 {
            writeln!(f, "Total notes skipped: {}", self.notes_skipped)?;
        }
        writeln!(f, "Total failures: {}", self.failures)?;
        for warning in &self.warnings {
            writeln!(f, "Warning: {warning}")?;
        }
        match &self.log_path {
            Some(path) => write!(f, "Import log created at: {path}"),
            None => write!(f, "Import log could not be written"),
        }
    }
}
