//! Import pipeline.
//!
//! ```text
//! validate ──► scan (blocking pool) ──► collect titles
//!                                            │
//!        ┌───────────────────────────────────┘
//!        ▼
//!   for each file, in discovery order:
//!     cancelled? ──yes──► stop
//!     too large? ──yes──► Blocked
//!     metadata ─► content ─► URLs ─► tags ─► title links ─► write / dry-run
//!        │
//!        ▼
//!   run log note ──► ImportSummary
//! ```
//!
//! Files are processed strictly one after another. Every step returns a
//! tagged outcome, so one bad file never ends the batch.

mod import;
mod types;

pub use import::{FileOutcome, ImportSession, LogEntry, LOG_TAG, NO_TEXT_DETAIL};
pub use types::{
    ImportPhase, ImportProgress, ImportSummary, NoOpEmitter, ProgressEmitter, RunIdentity,
    RUN_ID_FORMAT,
};

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::{ConfigError, ImportConfig, ImportSettings};
use crate::content;
use crate::links::{annotate_urls, LinkAnnotator};
use crate::metadata::{self, NoteMetadata};
use crate::nlp::TagExtractor;
use crate::notes::{NotePlacement, NoteWriter, WriteOutcome, NOTE_EXTENSION};
use crate::scanner::{self, DiscoveredFile};
use crate::storage::{join_path, DocumentStore, StoreError};

/// Run-level errors. Per-file problems never surface here.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("An import is already in progress")]
    AlreadyRunning,

    #[error("Directory scan failed: {0}")]
    Scan(#[from] tokio::task::JoinError),
}

/// Runs imports into a document store.
///
/// One run at a time: a second `run` while one is active is refused with
/// [`ImportError::AlreadyRunning`].
pub struct Importer {
    store: Arc<dyn DocumentStore>,
    tagger: TagExtractor,
    active: Mutex<Option<CancellationToken>>,
}

/// Clears the active-run slot when a run ends, however it ends.
struct ActiveRun<'a> {
    slot: &'a Mutex<Option<CancellationToken>>,
    token: CancellationToken,
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}

/// Per-run state shared by every file of the batch.
struct RunContext<'a> {
    config: &'a ImportConfig,
    writer: NoteWriter<'a>,
    links: Option<LinkAnnotator>,
}

impl Importer {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            tagger: TagExtractor::new(),
            active: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Ask the active run to stop after the file in flight. Returns false
    /// when nothing is running.
    pub fn cancel_import(&self) -> bool {
        let slot = self.active.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(token) => {
                tracing::info!("Cancelling import");
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn begin_run(&self) -> Result<ActiveRun<'_>, ImportError> {
        let mut slot = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return Err(ImportError::AlreadyRunning);
        }
        let token = CancellationToken::new();
        *slot = Some(token.clone());
        Ok(ActiveRun {
            slot: &self.active,
            token,
        })
    }

    /// Validate `settings` and import with a fresh run identity.
    ///
    /// Configuration errors return before anything is read or written.
    pub async fn run<E: ProgressEmitter + ?Sized>(
        &self,
        settings: &ImportSettings,
        emitter: &E,
    ) -> Result<ImportSummary, ImportError> {
        let config = settings.validate()?;
        self.run_as(&config, RunIdentity::now(), emitter).await
    }

    /// Import with an explicit run identity.
    pub async fn run_as<E: ProgressEmitter + ?Sized>(
        &self,
        config: &ImportConfig,
        run: RunIdentity,
        emitter: &E,
    ) -> Result<ImportSummary, ImportError> {
        let active = self.begin_run()?;
        let source_root =
            std::path::absolute(&config.source_root).unwrap_or_else(|_| config.source_root.clone());

        tracing::info!(
            run_id = %run,
            source = %source_root.display(),
            extensions = ?config.extensions,
            dry_run = config.dry_run,
            "Starting import"
        );
        emitter.emit_phase(ImportPhase::Scanning {
            source_root: source_root.display().to_string(),
        });

        let files = {
            let root = source_root.clone();
            let extensions = config.extensions.clone();
            let depth = config.max_depth;
            tokio::task::spawn_blocking(move || scanner::scan(&root, &extensions, depth)).await?
        };

        let mut warnings = Vec::new();
        let links = if config.features.internal_links {
            match LinkAnnotator::new(files.iter().map(DiscoveredFile::title)) {
                Ok(links) => Some(links),
                Err(e) => {
                    tracing::warn!(run_id = %run, error = %e, "Internal links disabled for this run");
                    warnings.push(format!("Internal links disabled: {e}"));
                    None
                }
            }
        } else {
            None
        };
        let run_folder = join_path([config.destination_root.as_str(), run.as_str()]);
        let placement = NotePlacement {
            source_root,
            run_folder,
            replicate_folder_structure: config.replicate_folder_structure,
            file_prefix: config.file_prefix.clone(),
        };
        let ctx = RunContext {
            config,
            writer: NoteWriter::new(self.store.as_ref(), placement, config.global_tags.clone()),
            links,
        };

        let mut session = ImportSession::new(files.len());
        let mut planned = HashSet::new();
        emitter.emit_phase(ImportPhase::Processing {
            total_files: files.len(),
        });
        emitter.emit_progress(session.progress());

        for file in &files {
            if active.token.is_cancelled() || emitter.cancel_requested() {
                active.token.cancel();
                session.mark_cancelled();
                tracing::info!(
                    run_id = %run,
                    processed = session.processed(),
                    total = session.total(),
                    "Import cancelled"
                );
                emitter.emit_phase(ImportPhase::Cancelled {
                    files_processed: session.processed(),
                });
                break;
            }

            let outcome = self.process_file(file, &ctx, &mut planned).await;
            let path = file.path.display().to_string();
            if outcome.is_failure() {
                tracing::warn!(path = %path, status = %outcome.status(), "File not imported");
            } else {
                tracing::info!(path = %path, status = %outcome.status(), "File processed");
            }
            session.record(path, &outcome);
            emitter.emit_progress(session.progress());
        }

        let log_path = self.write_log(&ctx, &run, &session, emitter).await;

        let summary = ImportSummary {
            run_id: run.id.clone(),
            dry_run: config.dry_run,
            total_discovered: session.total(),
            files_processed: session.processed(),
            notes_created: session.created(),
            notes_skipped: session.skipped(),
            failures: session.failed(),
            cancelled: session.is_cancelled(),
            log_path,
            warnings,
        };
        tracing::info!(
            run_id = %run,
            discovered = summary.total_discovered,
            created = summary.notes_created,
            skipped = summary.notes_skipped,
            failed = summary.failures,
            "Import finished"
        );
        emitter.emit_phase(ImportPhase::Done);

        Ok(summary)
    }

    /// Run one file through the pipeline.
    ///
    /// `planned` collects the note paths a dry run would have created so far.
    async fn process_file(
        &self,
        file: &DiscoveredFile,
        ctx: &RunContext<'_>,
        planned: &mut HashSet<String>,
    ) -> FileOutcome {
        let config = ctx.config;
        let dry_run = config.dry_run;

        if file.size_bytes > config.max_file_size_bytes() {
            return FileOutcome::Blocked {
                limit_mb: config.max_file_size_mb,
                dry_run,
            };
        }

        let mut metadata = metadata::collect(
            &file.path,
            config.features.file_metadata,
            config.features.extended_metadata,
        )
        .await;

        let mut text = content::extract(&file.path, file.kind).await;
        let detail = (file.size_bytes > 0 && text.trim().is_empty())
            .then(|| NO_TEXT_DETAIL.to_string());

        if config.features.detect_urls {
            text = annotate_urls(&text);
        }
        if config.features.tag_notes {
            metadata.tags = self.tagger.extract_tags(&text, config.max_tags);
        }
        if let Some(links) = &ctx.links {
            text = links.link_titles(&text);
        }
        ctx.writer.apply_global_tags(&mut metadata);

        let note_path = ctx.writer.placement().note_path(&file.path);

        if dry_run {
            // Notes a real run would have written earlier in this batch
            if planned.contains(&note_path) {
                tracing::info!(path = %note_path, "Dry run: note already planned, would skip");
                return FileOutcome::Skipped;
            }
            return match ctx.writer.preflight(&note_path).await {
                WriteOutcome::Created => {
                    tracing::debug!(path = %note_path, tags = ?metadata.tags, "Dry run: would create note");
                    planned.insert(note_path);
                    FileOutcome::WouldCreate { detail }
                }
                WriteOutcome::Skipped => FileOutcome::Skipped,
                WriteOutcome::Failed(reason) => FileOutcome::Failed { reason, dry_run },
            };
        }

        match ctx.writer.write(&note_path, &metadata, &text).await {
            WriteOutcome::Created => FileOutcome::Created { detail },
            WriteOutcome::Skipped => FileOutcome::Skipped,
            WriteOutcome::Failed(reason) => FileOutcome::Failed { reason, dry_run },
        }
    }

    /// Write the run log note. Always written, dry run included; a failure
    /// is logged and reported as `None`.
    async fn write_log<E: ProgressEmitter + ?Sized>(
        &self,
        ctx: &RunContext<'_>,
        run: &RunIdentity,
        session: &ImportSession,
        emitter: &E,
    ) -> Option<String> {
        let title = format!("import_log_{run}");
        let path = ctx.writer.placement().flat_path(&title);
        emitter.emit_phase(ImportPhase::WritingLog { path: path.clone() });

        let file_name = format!("{}{}.{}", ctx.config.file_prefix, title, NOTE_EXTENSION);
        let mut metadata = NoteMetadata::new(file_name, format!(".{NOTE_EXTENSION}"));
        metadata.import_date = run.started_at;
        metadata.tags = vec![LOG_TAG.to_string()];

        match ctx
            .writer
            .write(&path, &metadata, &session.render_log(run.as_str()))
            .await
        {
            WriteOutcome::Created => {
                tracing::info!(path = %path, "Import log created");
                Some(path)
            }
            WriteOutcome::Skipped => {
                tracing::error!(path = %path, "Import log already exists");
                None
            }
            WriteOutcome::Failed(reason) => {
                tracing::error!(path = %path, error = %reason, "Error creating import log");
                None
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FrontMatterTags {
    #[serde(default)]
    tags: Vec<String>,
}

/// Tags listed in a note's front matter, if it has any.
fn front_matter_tags(note: &str) -> Vec<String> {
    let Some(rest) = note.strip_prefix("---\n") else {
        return Vec::new();
    };
    let Some(end) = rest.find("\n---") else {
        return Vec::new();
    };
    serde_yaml::from_str::<FrontMatterTags>(&rest[..end])
        .map(|fm| fm.tags)
        .unwrap_or_default()
}

/// Run log notes under `destination_root`, newest run first.
pub async fn list_import_logs(
    store: &dyn DocumentStore,
    destination_root: &str,
) -> Result<Vec<String>, StoreError> {
    let suffix = format!(".{NOTE_EXTENSION}");
    let mut logs = Vec::new();

    for path in store.list_documents(destination_root).await? {
        if !path.ends_with(&suffix) {
            continue;
        }
        let note = match store.open_document(&path).await {
            Ok(note) => note,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Failed to read note");
                continue;
            }
        };
        if front_matter_tags(&note).iter().any(|tag| tag == LOG_TAG) {
            logs.push(path);
        }
    }

    // run folders are timestamps, so path order is run order
    logs.sort_by(|a, b| b.cmp(a));
    Ok(logs)
}
