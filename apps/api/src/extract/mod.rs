//! Text extraction from uploaded CV documents.
//!
//! Extraction is total: unsupported formats and corrupt files degrade to an
//! empty string so a single bad document never aborts a batch.

use bytes::Bytes;
use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};
use tokio::task::JoinSet;
use tracing::warn;

/// A raw uploaded document. `Bytes` makes clones cheap when fanning out
/// extraction across blocking tasks.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub filename: String,
    pub bytes: Bytes,
}

/// Document kind inferred from the filename extension (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Word,
    Unsupported,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => DocumentKind::Pdf,
            "doc" | "docx" => DocumentKind::Word,
            _ => DocumentKind::Unsupported,
        }
    }
}

/// Extracts cleaned plain text from one document.
///
/// Returns the empty string for unsupported formats and on any extraction
/// error. On success, whitespace runs (including newlines) collapse to
/// single spaces and the result is trimmed.
pub fn extract_text(doc: &SourceDocument) -> String {
    let raw = match DocumentKind::from_filename(&doc.filename) {
        DocumentKind::Pdf => match pdf_extract::extract_text_from_mem(&doc.bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(filename = %doc.filename, "PDF extraction failed: {e}");
                return String::new();
            }
        },
        DocumentKind::Word => match extract_docx_text(&doc.bytes) {
            Ok(text) => text,
            Err(message) => {
                warn!(filename = %doc.filename, "Word extraction failed: {message}");
                return String::new();
            }
        },
        DocumentKind::Unsupported => {
            warn!(filename = %doc.filename, "unsupported document format, skipping extraction");
            return String::new();
        }
    };

    collapse_whitespace(&raw)
}

/// Extracts text from every document, index-aligned with the input.
///
/// PDF and DOCX parsing are CPU-bound, so each document runs on the blocking
/// pool. Extraction is a pure function of its input, which makes the fan-out
/// safe without any shared state.
pub async fn extract_all(documents: &[SourceDocument]) -> Vec<String> {
    let mut tasks = JoinSet::new();
    for (index, doc) in documents.iter().enumerate() {
        let doc = doc.clone();
        tasks.spawn_blocking(move || (index, extract_text(&doc)));
    }

    let mut texts = vec![String::new(); documents.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, text)) => texts[index] = text,
            // Slot keeps its empty default; the batch continues.
            Err(e) => warn!("extraction task failed: {e}"),
        }
    }
    texts
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_docx_text(bytes: &[u8]) -> Result<String, String> {
    let package = read_docx(bytes).map_err(|e| format!("unreadable DOCX package: {e}"))?;

    let mut segments = Vec::new();
    for child in &package.document.children {
        collect_document_child(child, &mut segments);
    }
    Ok(segments.join("\n"))
}

fn collect_document_child(child: &DocumentChild, segments: &mut Vec<String>) {
    match child {
        DocumentChild::Paragraph(paragraph) => collect_paragraph(paragraph, segments),
        DocumentChild::Table(table) => collect_table(table, segments),
        _ => {}
    }
}

fn collect_paragraph(paragraph: &Paragraph, segments: &mut Vec<String>) {
    let mut buffer = String::new();
    collect_paragraph_children(&paragraph.children, &mut buffer);
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed.to_string());
    }
}

fn collect_paragraph_children(children: &[ParagraphChild], buffer: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(text) => buffer.push_str(&text.text),
                        RunChild::Tab(_) | RunChild::Break(_) => buffer.push(' '),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => {
                collect_paragraph_children(&link.children, buffer);
            }
            _ => {}
        }
    }
}

fn collect_table(table: &Table, segments: &mut Vec<String>) {
    for child in &table.rows {
        let TableChild::TableRow(row) = child;
        for cell_child in &row.cells {
            let TableRowChild::TableCell(cell) = cell_child;
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(paragraph) => {
                        collect_paragraph(paragraph, segments)
                    }
                    TableCellContent::Table(nested) => collect_table(nested, segments),
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(filename: &str, bytes: &[u8]) -> SourceDocument {
        SourceDocument {
            filename: filename.to_string(),
            bytes: Bytes::copy_from_slice(bytes),
        }
    }

    #[test]
    fn test_kind_from_extension_case_insensitive() {
        assert_eq!(DocumentKind::from_filename("cv.PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("cv.docx"), DocumentKind::Word);
        assert_eq!(DocumentKind::from_filename("cv.DOC"), DocumentKind::Word);
        assert_eq!(
            DocumentKind::from_filename("resume.txt"),
            DocumentKind::Unsupported
        );
        assert_eq!(
            DocumentKind::from_filename("no_extension"),
            DocumentKind::Unsupported
        );
    }

    #[test]
    fn test_unsupported_type_yields_empty_text() {
        let text = extract_text(&doc("resume.txt", b"plain text resume"));
        assert!(text.is_empty());
    }

    #[test]
    fn test_corrupt_pdf_yields_empty_text() {
        let text = extract_text(&doc("resume.pdf", b"definitely not a pdf"));
        assert!(text.is_empty());
    }

    #[test]
    fn test_corrupt_docx_yields_empty_text() {
        let text = extract_text(&doc("resume.docx", b"\x00\x01\x02"));
        assert!(text.is_empty());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("  Jane\r\nDoe \t Software\n\nEngineer  "),
            "Jane Doe Software Engineer"
        );
    }

    #[tokio::test]
    async fn test_extract_all_is_index_aligned() {
        let docs = vec![
            doc("a.txt", b"unsupported"),
            doc("b.pdf", b"broken"),
            doc("c.xyz", b"also unsupported"),
        ];
        let texts = extract_all(&docs).await;
        assert_eq!(texts.len(), 3);
        assert!(texts.iter().all(String::is_empty));
    }
}
