//! Source file to plain text conversion, dispatched by file kind.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::FileKind;
use crate::pdf;

/// Convert a source file to text, propagating read and decode errors.
pub async fn try_extract(path: &Path, kind: FileKind) -> Result<String> {
    match kind {
        FileKind::Text | FileKind::Markdown => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        FileKind::Pdf => {
            // PDF parsing is CPU-bound
            let path: PathBuf = path.to_path_buf();
            let extracted = tokio::task::spawn_blocking(move || pdf::extract_text(&path))
                .await
                .context("PDF extraction task panicked")??;
            Ok(extracted.text)
        }
    }
}

/// Convert a source file to text.
///
/// Read and conversion failures are logged and yield empty text; they never
/// abort the caller.
pub async fn extract(path: &Path, kind: FileKind) -> String {
    match try_extract(path, kind).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %format!("{:#}", e), "Error converting file");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extract_text_verbatim() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plain.txt");
        std::fs::write(&path, "line one\n\n  line two\t\n").unwrap();

        let text = extract(&path, FileKind::Text).await;

        assert_eq!(text, "line one\n\n  line two\t\n");
    }

    #[tokio::test]
    async fn test_extract_markdown_verbatim() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("note.md");
        std::fs::write(&path, "# Title\n\n- item\n").unwrap();

        assert_eq!(extract(&path, FileKind::Markdown).await, "# Title\n\n- item\n");
    }

    #[tokio::test]
    async fn test_extract_pdf() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("doc.pdf");
        std::fs::write(&path, pdf::create_pdf(&[&["Quarterly report"]])).unwrap();

        let text = extract(&path, FileKind::Pdf).await;

        assert!(text.contains("Quarterly"), "got: {:?}", text);
    }

    #[tokio::test]
    async fn test_extract_corrupt_pdf_yields_empty_text() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4 garbage").unwrap();

        assert!(try_extract(&path, FileKind::Pdf).await.is_err());
        assert_eq!(extract(&path, FileKind::Pdf).await, "");
    }

    #[tokio::test]
    async fn test_extract_missing_or_invalid_utf8_yields_empty_text() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.txt");
        assert_eq!(extract(&missing, FileKind::Text).await, "");

        let binary = temp_dir.path().join("binary.txt");
        std::fs::write(&binary, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let err = try_extract(&binary, FileKind::Text).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
        assert_eq!(extract(&binary, FileKind::Text).await, "");
    }
}
