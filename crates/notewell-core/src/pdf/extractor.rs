use std::path::Path;

use anyhow::{Context, Result};

/// Result of extracting text from a PDF
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Extracted text, pages separated by a blank line
    pub text: String,
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Pages whose content stream could not be decoded
    pub failed_pages: Vec<u32>,
}

/// Extract text from a PDF file
pub fn extract_text(path: &Path) -> Result<ExtractedDocument> {
    let pdf_bytes = std::fs::read(path).context("Failed to read PDF file")?;
    extract_text_from_bytes(&pdf_bytes)
}

/// Extract text from PDF bytes.
///
/// Each page's text runs are joined with single spaces; pages are joined with
/// a blank line, in document order.
pub fn extract_text_from_bytes(pdf_bytes: &[u8]) -> Result<ExtractedDocument> {
    let doc = lopdf::Document::load_mem(pdf_bytes).context("Failed to parse PDF")?;

    let mut pages: Vec<u32> = doc.get_pages().keys().cloned().collect();
    pages.sort(); // Ensure pages are in order
    let page_count = pages.len();

    let mut page_texts = Vec::with_capacity(page_count);
    let mut failed_pages = Vec::new();

    for page_num in &pages {
        let page_text = match doc.extract_text(&[*page_num]) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(page = page_num, error = %e, "Failed to extract page text");
                failed_pages.push(*page_num);
                String::new()
            }
        };
        page_texts.push(join_runs(&page_text));
    }

    let text = page_texts.join("\n\n");

    tracing::debug!(
        "Extracted {} chars from {} pages ({} failed)",
        text.len(),
        page_count,
        failed_pages.len()
    );

    Ok(ExtractedDocument {
        text,
        page_count,
        failed_pages,
    })
}

/// Collapse a page's positioned runs into one line of single-spaced words.
fn join_runs(page_text: &str) -> String {
    page_text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object, Stream};

    /// Create a PDF with one page per entry; each entry is a list of text
    /// runs drawn on separate lines.
    pub(crate) fn create_pdf(pages: &[&[&str]]) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");

        // Add a font resource
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut page_ids = Vec::new();

        for runs in pages {
            let mut content = String::from("BT /F1 12 Tf 100 700 Td");
            for run in runs.iter() {
                let escaped = run
                    .replace('\\', "\\\\")
                    .replace('(', "\\(")
                    .replace(')', "\\)");
                content.push_str(&format!(" ({}) Tj 0 -14 Td", escaped));
            }
            content.push_str(" ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        // Create pages tree
        let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(pages.len() as i64),
        });

        // Update page parent references
        for page_id in &page_ids {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(*page_id) {
                dict.set("Parent", pages_id);
            }
        }

        // Create catalog
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });

        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_extract_text_simple() {
        let temp_dir = tempfile::tempdir().unwrap();
        let pdf_path = temp_dir.path().join("test.pdf");

        std::fs::write(&pdf_path, create_pdf(&[&["Hello World"]])).unwrap();

        let result = extract_text(&pdf_path).unwrap();

        assert_eq!(result.page_count, 1);
        assert!(result.failed_pages.is_empty());
        assert!(
            result.text.contains("Hello") && result.text.contains("World"),
            "Expected text to contain 'Hello World', got: '{}'",
            result.text
        );
    }

    #[test]
    fn test_extract_text_joins_runs_with_single_spaces() {
        let pdf_bytes = create_pdf(&[&["first   run", "second run"]]);

        let result = extract_text_from_bytes(&pdf_bytes).unwrap();

        assert!(!result.text.contains('\n'), "got: {:?}", result.text);
        assert!(!result.text.contains("  "), "got: {:?}", result.text);
        assert!(result.text.contains("first"));
        assert!(result.text.contains("second"));
    }

    #[test]
    fn test_extract_text_multipage_blank_line_between_pages() {
        let pdf_bytes = create_pdf(&[&["Page One"], &["Page Two"], &["Page Three"]]);

        let result = extract_text_from_bytes(&pdf_bytes).unwrap();

        assert_eq!(result.page_count, 3);
        let pages: Vec<&str> = result.text.split("\n\n").collect();
        assert_eq!(pages.len(), 3, "got: {:?}", result.text);
        assert!(pages[0].contains("One"));
        assert!(pages[2].contains("Three"));
    }

    #[test]
    fn test_extract_text_file_not_found() {
        let result = extract_text(Path::new("/nonexistent/path/to/file.pdf"));

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(
            err.to_string().contains("Failed to read PDF file"),
            "Expected 'Failed to read PDF file' error, got: {}",
            err
        );
    }

    #[test]
    fn test_extract_text_invalid_pdf() {
        let result = extract_text_from_bytes(b"this is not a valid pdf file");

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(
            err.to_string().contains("Failed to parse PDF"),
            "Expected 'Failed to parse PDF' error, got: {}",
            err
        );
    }

    #[test]
    fn test_extract_text_empty_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let pdf_path = temp_dir.path().join("empty.pdf");

        std::fs::File::create(&pdf_path).unwrap();

        let result = extract_text(&pdf_path);

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse PDF"));
    }
}
