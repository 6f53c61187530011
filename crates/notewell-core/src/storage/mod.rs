//! Document store the importer writes notes into.
//!
//! Store paths are `/`-separated and relative to the store root. They are
//! normalized before use: empty and `.` segments are dropped, `\` is treated
//! as a separator, and `..` is rejected.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    Document,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("'{0}' already exists")]
    AlreadyExists(String),

    #[error("'{0}' exists and is not a folder")]
    NotAFolder(String),

    #[error("'{0}' not found")]
    NotFound(String),

    #[error("invalid store path '{0}'")]
    InvalidPath(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    fn io(path: &str, source: std::io::Error) -> Self {
        match source.kind() {
            ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_string()),
            ErrorKind::NotFound => Self::NotFound(path.to_string()),
            _ => Self::Io {
                path: path.to_string(),
                source,
            },
        }
    }
}

/// Host document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// What lives at `path`, if anything.
    async fn resolve_path(&self, path: &str) -> Result<Option<EntryKind>, StoreError>;

    /// Create `path` and any missing parents. Existing folders are fine; an
    /// existing document anywhere on the way is `NotAFolder`.
    async fn create_folder(&self, path: &str) -> Result<(), StoreError>;

    /// Create a new document. Never overwrites: an existing entry is
    /// `AlreadyExists`.
    async fn create_document(&self, path: &str, content: &str) -> Result<(), StoreError>;

    async fn open_document(&self, path: &str) -> Result<String, StoreError>;

    /// Every document below `prefix`, sorted by path.
    async fn list_documents(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// Normalize a store path to `a/b/c` form.
pub fn normalize_path(path: &str) -> Result<String, StoreError> {
    let mut segments = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(StoreError::InvalidPath(path.to_string())),
            s => segments.push(s),
        }
    }
    Ok(segments.join("/"))
}

/// Join store path segments, skipping empty ones.
pub fn join_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .flat_map(|s| s.split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parent folder of a normalized store path (`""` for top-level entries).
pub fn parent_path(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Document store backed by a directory on disk (a "vault").
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    /// Open a vault at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io(&root.display().to_string(), e))?;
        tracing::debug!(root = %root.display(), "Opened vault");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of a store path.
    pub fn full_path(&self, path: &str) -> Result<PathBuf, StoreError> {
        let normalized = normalize_path(path)?;
        Ok(normalized
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment)))
    }

    async fn kind_of(full: &Path, path: &str) -> Result<Option<EntryKind>, StoreError> {
        match tokio::fs::metadata(full).await {
            Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Folder)),
            Ok(_) => Ok(Some(EntryKind::Document)),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                Ok(None)
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

#[async_trait]
impl DocumentStore for FsVault {
    async fn resolve_path(&self, path: &str) -> Result<Option<EntryKind>, StoreError> {
        let full = self.full_path(path)?;
        Self::kind_of(&full, path).await
    }

    async fn create_folder(&self, path: &str) -> Result<(), StoreError> {
        let normalized = normalize_path(path)?;
        let mut current = String::new();

        for segment in normalized.split('/').filter(|s| !s.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);

            let full = self.full_path(&current)?;
            match Self::kind_of(&full, &current).await? {
                Some(EntryKind::Folder) => continue,
                Some(EntryKind::Document) => return Err(StoreError::NotAFolder(current)),
                None => match tokio::fs::create_dir(&full).await {
                    Ok(()) => {}
                    // Lost a race with another creator; fine if it made a folder.
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                        if Self::kind_of(&full, &current).await? != Some(EntryKind::Folder) {
                            return Err(StoreError::NotAFolder(current));
                        }
                    }
                    Err(e) => return Err(StoreError::io(&current, e)),
                },
            }
        }

        Ok(())
    }

    async fn create_document(&self, path: &str, content: &str) -> Result<(), StoreError> {
        use tokio::io::AsyncWriteExt;

        let normalized = normalize_path(path)?;
        if normalized.is_empty() {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        let full = self.full_path(&normalized)?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .await
            .map_err(|e| StoreError::io(&normalized, e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| StoreError::io(&normalized, e))?;
        file.flush()
            .await
            .map_err(|e| StoreError::io(&normalized, e))?;

        tracing::trace!(path = %normalized, bytes = content.len(), "Created document");
        Ok(())
    }

    async fn open_document(&self, path: &str) -> Result<String, StoreError> {
        let normalized = normalize_path(path)?;
        let full = self.full_path(&normalized)?;
        match Self::kind_of(&full, &normalized).await? {
            Some(EntryKind::Document) => tokio::fs::read_to_string(&full)
                .await
                .map_err(|e| StoreError::io(&normalized, e)),
            _ => Err(StoreError::NotFound(normalized)),
        }
    }

    async fn list_documents(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let prefix = normalize_path(prefix)?;
        let full = self.full_path(&prefix)?;
        if Self::kind_of(&full, &prefix).await? != Some(EntryKind::Folder) {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        let mut pending = vec![(full, prefix)];

        while let Some((dir, store_dir)) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| StoreError::io(&store_dir, e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StoreError::io(&store_dir, e))?
            {
                let name = entry.file_name().to_string_lossy().into_owned();
                let store_path = join_path([store_dir.as_str(), name.as_str()]);
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StoreError::io(&store_path, e))?;
                if file_type.is_dir() {
                    pending.push((entry.path(), store_path));
                } else if file_type.is_file() {
                    documents.push(store_path);
                }
            }
        }

        documents.sort();
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn vault() -> (TempDir, FsVault) {
        let dir = TempDir::new().unwrap();
        let vault = FsVault::open(dir.path()).await.unwrap();
        (dir, vault)
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/a//b/./c/").unwrap(), "a/b/c");
        assert_eq!(normalize_path("a\\b").unwrap(), "a/b");
        assert_eq!(normalize_path("").unwrap(), "");
        assert!(matches!(
            normalize_path("a/../../etc"),
            Err(StoreError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_join_and_parent() {
        assert_eq!(join_path(["notewell", "", "run/sub", "x.md"]), "notewell/run/sub/x.md");
        assert_eq!(parent_path("notewell/run/x.md"), "notewell/run");
        assert_eq!(parent_path("x.md"), "");
    }

    #[tokio::test]
    async fn test_create_and_open_document() {
        let (_dir, vault) = vault().await;

        vault.create_folder("notes/2024").await.unwrap();
        vault
            .create_document("notes/2024/a.md", "hello")
            .await
            .unwrap();

        assert_eq!(
            vault.resolve_path("notes/2024").await.unwrap(),
            Some(EntryKind::Folder)
        );
        assert_eq!(
            vault.resolve_path("/notes/2024/a.md").await.unwrap(),
            Some(EntryKind::Document)
        );
        assert_eq!(vault.resolve_path("missing.md").await.unwrap(), None);
        assert_eq!(vault.open_document("notes/2024/a.md").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_create_document_never_overwrites() {
        let (_dir, vault) = vault().await;

        vault.create_document("a.md", "first").await.unwrap();
        let err = vault.create_document("a.md", "second").await.unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(vault.open_document("a.md").await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_create_folder_through_document_fails() {
        let (_dir, vault) = vault().await;
        vault.create_document("notes", "not a folder").await.unwrap();

        let err = vault.create_folder("notes/sub").await.unwrap_err();

        match err {
            StoreError::NotAFolder(path) => assert_eq!(path, "notes"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_folder_is_idempotent() {
        let (_dir, vault) = vault().await;

        vault.create_folder("a/b/c").await.unwrap();
        vault.create_folder("a/b/c").await.unwrap();
        vault.create_folder("a/b").await.unwrap();

        assert_eq!(vault.resolve_path("a/b/c").await.unwrap(), Some(EntryKind::Folder));
    }

    #[tokio::test]
    async fn test_open_missing_document() {
        let (_dir, vault) = vault().await;
        vault.create_folder("folder").await.unwrap();

        assert!(matches!(
            vault.open_document("nope.md").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            vault.open_document("folder").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_documents() {
        let (_dir, vault) = vault().await;
        vault.create_folder("root/x/y").await.unwrap();
        vault.create_folder("other").await.unwrap();
        vault.create_document("root/b.md", "").await.unwrap();
        vault.create_document("root/x/y/a.md", "").await.unwrap();
        vault.create_document("other/c.md", "").await.unwrap();

        assert_eq!(
            vault.list_documents("root").await.unwrap(),
            vec!["root/b.md", "root/x/y/a.md"]
        );
        assert!(vault.list_documents("missing").await.unwrap().is_empty());
        assert_eq!(vault.list_documents("").await.unwrap().len(), 3);
    }
}
