//! Note placement, front matter rendering and conflict-safe writes.

use std::path::{Component, Path, PathBuf};

use crate::metadata::NoteMetadata;
use crate::scanner::note_title;
use crate::storage::{join_path, parent_path, DocumentStore, EntryKind, StoreError};

/// Extension of every note written into the store.
pub const NOTE_EXTENSION: &str = "md";

/// Result of writing one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    /// Destination already existed and was left untouched.
    Skipped,
    Failed(String),
}

/// Where notes of one run go.
#[derive(Debug, Clone)]
pub struct NotePlacement {
    pub source_root: PathBuf,
    /// Store folder for this run, e.g. `notewell/2024-05-01_09-30-00`.
    pub run_folder: String,
    pub replicate_folder_structure: bool,
    pub file_prefix: String,
}

impl NotePlacement {
    /// Destination of the note for `source`.
    ///
    /// With folder replication the source's directory relative to the
    /// source root is mirrored under the run folder; otherwise notes land
    /// flat in the run folder.
    pub fn note_path(&self, source: &Path) -> String {
        let relative_dir = if self.replicate_folder_structure {
            source
                .parent()
                .and_then(|parent| parent.strip_prefix(&self.source_root).ok())
                .map(|rel| {
                    rel.components()
                        .filter_map(|c| match c {
                            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                        .join("/")
                })
                .unwrap_or_default()
        } else {
            String::new()
        };

        let file_name = self.file_name(&note_title(source));
        join_path([self.run_folder.as_str(), relative_dir.as_str(), file_name.as_str()])
    }

    /// Destination of a note placed directly in the run folder.
    pub fn flat_path(&self, title: &str) -> String {
        let file_name = self.file_name(title);
        join_path([self.run_folder.as_str(), file_name.as_str()])
    }

    fn file_name(&self, title: &str) -> String {
        format!("{}{}.{}", self.file_prefix, title, NOTE_EXTENSION)
    }
}

/// Render a tag as a taggable token: leading `#` removed and inner
/// whitespace replaced by `-`. Blank tags yield `None`.
pub fn format_tag(tag: &str) -> Option<String> {
    let tag = tag.trim().trim_start_matches('#');
    let formatted = tag.split_whitespace().collect::<Vec<_>>().join("-");
    (!formatted.is_empty()).then_some(formatted)
}

/// Per-file tags followed by global tags, formatted, first occurrence kept.
pub fn merge_tags(tags: &[String], global_tags: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(tags.len() + global_tags.len());
    for tag in tags.iter().chain(global_tags).filter_map(|t| format_tag(t)) {
        if !merged.contains(&tag) {
            merged.push(tag);
        }
    }
    merged
}

/// YAML front matter between `---` fences, a blank line, then the body.
pub fn render_note(metadata: &NoteMetadata, body: &str) -> Result<String, serde_yaml::Error> {
    let header = serde_yaml::to_string(metadata)?;
    Ok(format!("---\n{header}---\n\n{body}"))
}

/// Writes notes into a [`DocumentStore`], never overwriting.
pub struct NoteWriter<'a> {
    store: &'a dyn DocumentStore,
    placement: NotePlacement,
    global_tags: Vec<String>,
}

impl<'a> NoteWriter<'a> {
    pub fn new(store: &'a dyn DocumentStore, placement: NotePlacement, global_tags: Vec<String>) -> Self {
        Self {
            store,
            placement,
            global_tags,
        }
    }

    pub fn placement(&self) -> &NotePlacement {
        &self.placement
    }

    /// Merge the run's global tags into `metadata` and format the list.
    pub fn apply_global_tags(&self, metadata: &mut NoteMetadata) {
        metadata.tags = merge_tags(&metadata.tags, &self.global_tags);
    }

    /// Read-only version of [`write`](Self::write): what writing `path`
    /// would do, with no folder or document created.
    pub async fn preflight(&self, path: &str) -> WriteOutcome {
        let mut current = String::new();
        for segment in parent_path(path).split('/').filter(|s| !s.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);

            match self.store.resolve_path(&current).await {
                Ok(Some(EntryKind::Folder)) => continue,
                Ok(Some(EntryKind::Document)) => {
                    return WriteOutcome::Failed(StoreError::NotAFolder(current).to_string())
                }
                // Nothing below a missing folder can exist yet
                Ok(None) => return WriteOutcome::Created,
                Err(e) => return WriteOutcome::Failed(e.to_string()),
            }
        }

        match self.store.resolve_path(path).await {
            Ok(Some(_)) => WriteOutcome::Skipped,
            Ok(None) => WriteOutcome::Created,
            Err(e) => WriteOutcome::Failed(e.to_string()),
        }
    }

    /// Write a note at `path`.
    ///
    /// The parent folder is created when missing. An existing destination
    /// is a skip. A path segment occupied by a document fails this note only.
    pub async fn write(&self, path: &str, metadata: &NoteMetadata, body: &str) -> WriteOutcome {
        let folder = parent_path(path);
        if !folder.is_empty() {
            match self.store.resolve_path(folder).await {
                Ok(Some(EntryKind::Folder)) => {}
                Ok(Some(EntryKind::Document)) => {
                    tracing::error!(path, folder, "Cannot create folder: a document with the same name exists");
                    return WriteOutcome::Failed(StoreError::NotAFolder(folder.to_string()).to_string());
                }
                Ok(None) => {
                    if let Err(e) = self.store.create_folder(folder).await {
                        tracing::error!(path, error = %e, "Failed to create note folder");
                        return WriteOutcome::Failed(e.to_string());
                    }
                }
                Err(e) => return WriteOutcome::Failed(e.to_string()),
            }
        }

        match self.store.resolve_path(path).await {
            Ok(Some(_)) => {
                tracing::info!(path, "Note already exists, skipping");
                return WriteOutcome::Skipped;
            }
            Ok(None) => {}
            Err(e) => return WriteOutcome::Failed(e.to_string()),
        }

        let content = match render_note(metadata, body) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(path, error = %e, "Failed to render front matter");
                return WriteOutcome::Failed(format!("front matter: {e}"));
            }
        };

        match self.store.create_document(path, &content).await {
            Ok(()) => {
                tracing::debug!(path, "Created note");
                WriteOutcome::Created
            }
            Err(StoreError::AlreadyExists(_)) => {
                tracing::info!(path, "Note already exists, skipping");
                WriteOutcome::Skipped
            }
            Err(e) => {
                tracing::error!(path, error = %e, "Failed to create note");
                WriteOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsVault;
    use tempfile::TempDir;

    fn placement(replicate: bool, prefix: &str) -> NotePlacement {
        NotePlacement {
            source_root: PathBuf::from("/src"),
            run_folder: "notewell/2024-05-01_09-30-00".to_string(),
            replicate_folder_structure: replicate,
            file_prefix: prefix.to_string(),
        }
    }

    #[test]
    fn test_note_path_replicates_folders() {
        let placement = placement(true, "imp_");

        assert_eq!(
            placement.note_path(Path::new("/src/projects/rust/plan.txt")),
            "notewell/2024-05-01_09-30-00/projects/rust/imp_plan.md"
        );
        assert_eq!(
            placement.note_path(Path::new("/src/top.pdf")),
            "notewell/2024-05-01_09-30-00/imp_top.md"
        );
    }

    #[test]
    fn test_note_path_flat() {
        let placement = placement(false, "");

        assert_eq!(
            placement.note_path(Path::new("/src/projects/rust/plan.txt")),
            "notewell/2024-05-01_09-30-00/plan.md"
        );
        assert_eq!(
            placement.flat_path("import_log_2024-05-01_09-30-00"),
            "notewell/2024-05-01_09-30-00/import_log_2024-05-01_09-30-00.md"
        );
    }

    #[test]
    fn test_merge_tags() {
        let tags = vec!["rust".to_string(), "#release notes".to_string()];
        let global = vec!["imported".to_string(), "rust".to_string(), "  ".to_string()];

        assert_eq!(
            merge_tags(&tags, &global),
            vec!["rust", "release-notes", "imported"]
        );
    }

    #[test]
    fn test_render_note() {
        let mut metadata = NoteMetadata::new("/src/a.txt", ".txt");
        metadata.tags = vec!["alpha".to_string(), "beta".to_string()];

        let note = render_note(&metadata, "Body text").unwrap();

        assert!(note.starts_with("---\nfilePath: /src/a.txt\n"));
        assert!(note.contains("originalExtension: .txt\n"));
        assert!(note.contains("importStatus: complete\n"));
        assert!(note.contains("tags:\n- alpha\n- beta\n"));
        assert!(note.ends_with("---\n\nBody text"));
    }

    #[tokio::test]
    async fn test_write_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let vault = FsVault::open(dir.path()).await.unwrap();
        let writer = NoteWriter::new(&vault, placement(true, ""), Vec::new());
        let metadata = NoteMetadata::new("/src/a.txt", ".txt");
        let path = writer.placement().note_path(Path::new("/src/a.txt"));

        assert_eq!(writer.preflight(&path).await, WriteOutcome::Created);
        assert_eq!(writer.write(&path, &metadata, "first").await, WriteOutcome::Created);
        assert_eq!(writer.preflight(&path).await, WriteOutcome::Skipped);
        assert_eq!(writer.write(&path, &metadata, "second").await, WriteOutcome::Skipped);

        let content = vault.open_document(&path).await.unwrap();
        assert!(content.ends_with("first"));
    }

    #[tokio::test]
    async fn test_write_fails_when_folder_is_a_document() {
        let dir = TempDir::new().unwrap();
        let vault = FsVault::open(dir.path()).await.unwrap();
        vault.create_folder("notewell/2024-05-01_09-30-00").await.unwrap();
        vault
            .create_document("notewell/2024-05-01_09-30-00/docs", "")
            .await
            .unwrap();
        let writer = NoteWriter::new(&vault, placement(true, ""), Vec::new());
        let metadata = NoteMetadata::new("/src/docs/a.txt", ".txt");
        let path = writer.placement().note_path(Path::new("/src/docs/a.txt"));

        let outcome = writer.write(&path, &metadata, "body").await;

        assert!(matches!(outcome, WriteOutcome::Failed(reason) if reason.contains("not a folder")));
        assert!(matches!(writer.preflight(&path).await, WriteOutcome::Failed(_)));
        assert_eq!(vault.resolve_path(&path).await.unwrap(), None);
    }

    #[test]
    fn test_apply_global_tags() {
        let store = NullStore;
        let writer = NoteWriter::new(&store, placement(false, ""), vec!["inbox".to_string()]);
        let mut metadata = NoteMetadata::new("/src/a.txt", ".txt");
        metadata.tags = vec!["inbox".to_string(), "rust".to_string()];

        writer.apply_global_tags(&mut metadata);

        assert_eq!(metadata.tags, vec!["inbox", "rust"]);
    }

    struct NullStore;

    #[async_trait::async_trait]
    impl DocumentStore for NullStore {
        async fn resolve_path(&self, _path: &str) -> Result<Option<EntryKind>, StoreError> {
            Ok(None)
        }
        async fn create_folder(&self, _path: &str) -> Result<(), StoreError> {
            Ok(())
        }
        async fn create_document(&self, _path: &str, _content: &str) -> Result<(), StoreError> {
            Ok(())
        }
        async fn open_document(&self, path: &str) -> Result<String, StoreError> {
            Err(StoreError::NotFound(path.to_string()))
        }
        async fn list_documents(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }
}
