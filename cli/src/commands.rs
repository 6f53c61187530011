//! CLI commands.
//!
//! Each command returns a serializable result; `lib.rs` decides whether to
//! print it as text or JSON.

use std::path::Path;
use std::sync::Arc;

use notewell_core::{
    list_import_logs, DocumentStore, FsVault, ImportConfig, ImportPhase, ImportProgress,
    ImportSettings, ImportSummary, Importer, ProgressEmitter,
};
use serde::Serialize;

use crate::error::{CommandError, CommandResult};

/// Reports progress through tracing, on stderr.
pub struct ConsoleProgress;

impl ProgressEmitter for ConsoleProgress {
    fn emit_progress(&self, progress: ImportProgress) {
        if progress.files_processed == 0 {
            return;
        }
        tracing::info!(
            "Processed {}/{} files ({} failed)",
            progress.files_processed,
            progress.total_files,
            progress.files_failed
        );
    }

    fn emit_phase(&self, phase: ImportPhase) {
        tracing::debug!(?phase, "Import phase");
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub summary: ImportSummary,
    /// Content of the run log note, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

/// Run an import into the vault at `vault`. Ctrl+C stops the run after the
/// file in flight; the log note is still written.
pub async fn import(
    settings: &ImportSettings,
    vault: &Path,
    show_log: bool,
) -> CommandResult<ImportReport> {
    // Validate before touching the vault
    settings.validate()?;

    let store: Arc<dyn DocumentStore> = Arc::new(FsVault::open(vault).await?);
    let importer = Arc::new(Importer::new(store.clone()));

    let cancel_on_signal = {
        let importer = importer.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing current file");
                importer.cancel_import();
            }
        })
    };

    let result = importer.run(settings, &ConsoleProgress).await;
    cancel_on_signal.abort();
    let summary = result?;

    let log = if show_log {
        let path = summary
            .log_path
            .as_deref()
            .ok_or_else(CommandError::log_not_found)?;
        Some(store.open_document(path).await?)
    } else {
        None
    };

    Ok(ImportReport { summary, log })
}

/// Validate settings into the configuration a run would use.
pub fn check(settings: &ImportSettings) -> CommandResult<ImportConfig> {
    Ok(settings.validate()?)
}

#[derive(Debug, Serialize)]
pub struct LogList {
    pub logs: Vec<String>,
}

/// Run log notes in the vault, newest first.
pub async fn logs(vault: &Path, destination_root: &str) -> CommandResult<LogList> {
    if !vault.is_dir() {
        return Err(CommandError::storage(format!(
            "Vault not found: {}",
            vault.display()
        )));
    }
    let store = FsVault::open(vault).await?;
    let logs = list_import_logs(&store, destination_root).await?;
    Ok(LogList { logs })
}
