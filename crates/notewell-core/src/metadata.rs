//! Per-file descriptive attributes written into a note's front matter.

use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Owner name used whenever the file owner cannot be resolved.
pub const UNKNOWN_OWNER: &str = "unknown";

/// Whether every requested attribute could be collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Complete,
    Incomplete,
}

/// Front matter for one note.
///
/// Field order is the order keys appear in the serialized header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteMetadata {
    pub file_path: String,
    pub import_date: DateTime<Local>,
    pub original_extension: String,
    pub import_status: ImportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_uid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NoteMetadata {
    /// Minimal metadata: path, import time, extension, status complete.
    pub fn new(file_path: impl Into<String>, original_extension: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            import_date: Local::now(),
            original_extension: original_extension.into(),
            import_status: ImportStatus::Complete,
            created_at: None,
            modified_at: None,
            size: None,
            machine_name: None,
            owner_uid: None,
            owner: None,
            tags: Vec::new(),
        }
    }
}

/// Extension of `path` including the leading dot, or empty.
fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Name of this machine, if the platform reports one.
pub fn machine_name() -> Option<String> {
    sysinfo::System::host_name()
}

/// Collect metadata for a source file.
///
/// Never fails: a stat error marks the metadata incomplete and leaves the
/// basic attributes unset, and owner resolution falls back to
/// [`UNKNOWN_OWNER`].
pub async fn collect(path: &Path, include_basic: bool, include_extended: bool) -> NoteMetadata {
    let mut metadata = NoteMetadata::new(path.display().to_string(), dotted_extension(path));

    if !include_basic && !include_extended {
        return metadata;
    }

    let stats = match tokio::fs::metadata(path).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Error extracting metadata");
            metadata.import_status = ImportStatus::Incomplete;
            if include_extended {
                metadata.owner = Some(UNKNOWN_OWNER.to_string());
            }
            return metadata;
        }
    };

    if include_basic {
        metadata.created_at = stats.created().ok().map(DateTime::<Local>::from);
        metadata.modified_at = stats.modified().ok().map(DateTime::<Local>::from);
        metadata.size = Some(stats.len());
        metadata.machine_name = machine_name();
    }

    if include_extended {
        let (uid, owner) = owner::resolve(&stats);
        metadata.owner_uid = uid;
        metadata.owner = Some(owner);
    }

    metadata
}

#[cfg(unix)]
mod owner {
    use std::os::unix::fs::MetadataExt;

    use super::UNKNOWN_OWNER;

    /// Resolve the owner's uid and name. Only the current user's name can be
    /// resolved; any other owner is reported as unknown.
    pub(super) fn resolve(stats: &std::fs::Metadata) -> (Option<u32>, String) {
        let uid = stats.uid();
        let current = rustix::process::getuid().as_raw();

        let name = if uid == current {
            std::env::var("USER")
                .or_else(|_| std::env::var("LOGNAME"))
                .ok()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_OWNER.to_string())
        } else {
            UNKNOWN_OWNER.to_string()
        };

        (Some(uid), name)
    }
}

#[cfg(not(unix))]
mod owner {
    use super::UNKNOWN_OWNER;

    pub(super) fn resolve(_stats: &std::fs::Metadata) -> (Option<u32>, String) {
        (None, UNKNOWN_OWNER.to_string())
    }
}
