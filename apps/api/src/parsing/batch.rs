//! Bounded-concurrency fan-out of parser calls across a batch.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::models::resume::ParsedResume;
use crate::parser_client::ResumeParser;

/// At most this many parser calls are in flight at once, regardless of batch
/// size. Upstream caps batches at 10 documents, but the controller does not
/// assume that.
pub const MAX_CONCURRENT_PARSES: usize = 5;

/// Parses every text in the batch, returning records index-aligned with the
/// input: `result[i]` is always the record for `texts[i]`.
///
/// All tasks are scheduled up front against a 5-permit semaphore; completion
/// order is unconstrained because each task writes only its own slot. The
/// parser never fails (its contract degrades errors to the default record),
/// so the controller does no error handling of its own beyond surviving a
/// panicked task, whose slot keeps the default record.
pub async fn parse_all(parser: Arc<dyn ResumeParser>, texts: Vec<String>) -> Vec<ParsedResume> {
    let total = texts.len();
    if total == 0 {
        return Vec::new();
    }

    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_PARSES));
    let mut tasks = JoinSet::new();

    for (index, text) in texts.into_iter().enumerate() {
        let parser = Arc::clone(&parser);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            // The semaphore is never closed, so acquisition cannot fail.
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("parse semaphore closed");
            (index, parser.parse_one(&text).await)
        });
    }

    let mut records = vec![ParsedResume::default(); total];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, record)) => records[index] = record,
            Err(e) => warn!("parse task panicked: {e}"),
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    /// Records the peak number of simultaneously in-flight calls.
    struct CountingParser {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl CountingParser {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ResumeParser for CountingParser {
        async fn parse_one(&self, text: &str) -> ParsedResume {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            ParsedResume {
                name: text.to_string(),
                ..ParsedResume::default()
            }
        }
    }

    /// Fails (returns the default record) for texts containing "bad".
    struct FlakyParser;

    #[async_trait]
    impl ResumeParser for FlakyParser {
        async fn parse_one(&self, text: &str) -> ParsedResume {
            if text.contains("bad") {
                return ParsedResume::default();
            }
            ParsedResume {
                name: text.to_string(),
                ..ParsedResume::default()
            }
        }
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let parser = Arc::new(CountingParser::new());
        let records = parse_all(parser, Vec::new()).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_results_are_index_aligned() {
        let parser = Arc::new(CountingParser::new());
        let texts: Vec<String> = (0..12).map(|i| format!("candidate {i}")).collect();
        let records = parse_all(parser, texts.clone()).await;

        assert_eq!(records.len(), 12);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.name, texts[i]);
        }
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_cap() {
        let parser = Arc::new(CountingParser::new());
        let texts: Vec<String> = (0..20).map(|i| format!("candidate {i}")).collect();
        parse_all(Arc::clone(&parser) as Arc<dyn ResumeParser>, texts).await;

        let peak = parser.peak.load(Ordering::SeqCst);
        assert!(peak <= MAX_CONCURRENT_PARSES, "peak in-flight was {peak}");
        assert!(peak > 1, "fan-out never actually ran concurrently");
    }

    #[tokio::test]
    async fn test_failed_documents_keep_their_slots() {
        let parser = Arc::new(FlakyParser);
        let texts = vec![
            "good one".to_string(),
            "bad one".to_string(),
            "good two".to_string(),
        ];
        let records = parse_all(parser, texts).await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "good one");
        assert_eq!(records[1], ParsedResume::default());
        assert_eq!(records[2].name, "good two");
    }
}
