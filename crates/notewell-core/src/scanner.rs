//! Source directory discovery.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use crate::config::{FileKind, RecursionDepth};

/// A candidate file found under the source root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredFile {
    /// Absolute path to the file
    pub path: PathBuf,
    pub kind: FileKind,
    pub size_bytes: u64,
}

impl DiscoveredFile {
    /// File name without its extension; used as the note title.
    pub fn title(&self) -> String {
        note_title(&self.path)
    }
}

/// Base name of a path without its extension.
pub fn note_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Recursively list files under `root` whose extension is in `extensions`.
///
/// Traversal is depth-first with entries sorted by name, so the result order
/// is stable across runs. Hidden entries are skipped. Unreadable directories
/// are logged and treated as empty. `max_depth` counts child folder levels:
/// `Levels(0)` lists only files directly in `root`.
pub fn scan(root: &Path, extensions: &[FileKind], max_depth: RecursionDepth) -> Vec<DiscoveredFile> {
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());

    let mut walker = WalkDir::new(&root).follow_links(false).sort_by_file_name();
    if let RecursionDepth::Levels(levels) = max_depth {
        // walkdir depth 1 is a file directly inside the root
        walker = walker.max_depth(levels.saturating_add(1));
    }

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                tracing::error!(path = %path, error = %e, "Error reading directory");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(kind) = FileKind::from_path(entry.path()) else {
            continue;
        };
        if !extensions.contains(&kind) {
            continue;
        }

        let size_bytes = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "Failed to stat file");
                0
            }
        };

        files.push(DiscoveredFile {
            path: entry.into_path(),
            kind,
            size_bytes,
        });
    }

    tracing::debug!(root = %root.display(), count = files.len(), "Scan complete");
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const ALL: [FileKind; 3] = [FileKind::Text, FileKind::Markdown, FileKind::Pdf];

    /// root/{a.txt, b.md, c.doc, .hidden.txt, sub/{d.txt, deeper/e.md}, .git/f.txt}
    fn create_tree() -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::write(root.join("b.md"), "beta").unwrap();
        fs::write(root.join("c.doc"), "ignored").unwrap();
        fs::write(root.join(".hidden.txt"), "hidden").unwrap();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("sub/d.txt"), "delta").unwrap();
        fs::write(root.join("sub/deeper/e.md"), "epsilon").unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".git/f.txt"), "git").unwrap();
        temp_dir
    }

    fn names(files: &[DiscoveredFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_root_only() {
        let temp_dir = create_tree();
        let files = scan(temp_dir.path(), &ALL, RecursionDepth::Levels(0));
        assert_eq!(names(&files), vec!["a.txt", "b.md"]);
    }

    #[test]
    fn test_scan_one_level() {
        let temp_dir = create_tree();
        let files = scan(temp_dir.path(), &ALL, RecursionDepth::Levels(1));
        assert_eq!(names(&files), vec!["a.txt", "b.md", "d.txt"]);
    }

    #[test]
    fn test_scan_unlimited_is_depth_first() {
        let temp_dir = create_tree();
        let files = scan(temp_dir.path(), &ALL, RecursionDepth::Unlimited);
        assert_eq!(names(&files), vec!["a.txt", "b.md", "d.txt", "e.md"]);
    }

    #[test]
    fn test_scan_filters_extensions_case_insensitively() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("upper.TXT"), "x").unwrap();
        fs::write(temp_dir.path().join("notes.md"), "y").unwrap();

        let files = scan(temp_dir.path(), &[FileKind::Text], RecursionDepth::Unlimited);
        assert_eq!(names(&files), vec!["upper.TXT"]);
        assert_eq!(files[0].kind, FileKind::Text);
        assert_eq!(files[0].size_bytes, 1);
        assert!(files[0].path.is_absolute());
        assert_eq!(files[0].title(), "upper");
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let files = scan(
            Path::new("/nonexistent/notewell/root"),
            &ALL,
            RecursionDepth::Unlimited,
        );
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_unreadable_subdirectory_is_empty() {
        use std::os::unix::fs::PermissionsExt;

        // root can read the directory anyway
        if rustix::process::getuid().is_root() {
            return;
        }

        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::create_dir(root.join("locked")).unwrap();
        fs::write(root.join("locked/secret.txt"), "hidden").unwrap();
        fs::write(root.join("z.md"), "zeta").unwrap();
        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o000)).unwrap();

        let files = scan(root, &ALL, RecursionDepth::Unlimited);

        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(names(&files), vec!["a.txt", "z.md"]);
    }
}
