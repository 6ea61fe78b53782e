//! The bulk résumé ingestion pipeline: bounded-concurrency parsing fan-out,
//! record normalization, the remote-fetch analysis variant, and tabular
//! export.

pub mod batch;
pub mod collaborators;
pub mod export;
pub mod fetch;
pub mod handlers;
pub mod normalize;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::extract::{extract_all, SourceDocument};
    use crate::models::resume::ParsedResume;
    use crate::parser_client::ResumeParser;
    use crate::parsing::batch::parse_all;
    use crate::parsing::export::{to_csv, EMPTY_CELL_PLACEHOLDER};
    use crate::parsing::normalize::normalize_all;

    /// Stands in for the extraction service: populated record for any
    /// non-empty text, default record otherwise (mirroring the production
    /// client's empty-text short-circuit).
    struct StubParser;

    #[async_trait]
    impl ResumeParser for StubParser {
        async fn parse_one(&self, text: &str) -> ParsedResume {
            if text.trim().is_empty() {
                return ParsedResume::default();
            }
            ParsedResume {
                name: "  Jane Doe ".to_string(),
                email: "Jane.Doe@Example.com ".to_string(),
                phone: "(415) 555-2671".to_string(),
                skills: vec!["Go".to_string(), "go".to_string(), "Rust".to_string()],
                ..ParsedResume::default()
            }
        }
    }

    /// Full pipeline over a mixed batch: one document with extractable text,
    /// one unsupported `.txt`, one corrupt PDF. The batch keeps its length
    /// and order; the failed documents come through as default records and
    /// placeholder-filled export rows.
    #[tokio::test]
    async fn test_pipeline_degrades_failed_documents_to_empty_rows() {
        let failing_docs = vec![
            SourceDocument {
                filename: "resume.txt".to_string(),
                bytes: Bytes::from_static(b"unsupported format"),
            },
            SourceDocument {
                filename: "broken.pdf".to_string(),
                bytes: Bytes::from_static(b"not really a pdf"),
            },
        ];
        let failed_texts = extract_all(&failing_docs).await;
        assert!(failed_texts.iter().all(|t| t.is_empty()));

        let mut texts = vec!["Jane Doe, Software Engineer, 5 years Go".to_string()];
        texts.extend(failed_texts);

        let records = normalize_all(parse_all(Arc::new(StubParser), texts).await);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Jane Doe");
        assert_eq!(records[0].email, "jane.doe@example.com");
        assert_eq!(records[0].phone, "415-555-2671");
        assert_eq!(records[0].skills, vec!["Go", "Rust"]);
        assert_eq!(records[1], ParsedResume::default());
        assert_eq!(records[2], ParsedResume::default());

        let csv = String::from_utf8(to_csv(&records).unwrap()).unwrap();
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 4); // header + 3 data rows
        assert!(lines[1].starts_with("Jane Doe,"));
        assert!(lines[2].split(',').all(|cell| cell == EMPTY_CELL_PLACEHOLDER));
        assert!(lines[3].split(',').all(|cell| cell == EMPTY_CELL_PLACEHOLDER));
    }
}
