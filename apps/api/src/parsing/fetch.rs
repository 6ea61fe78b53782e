//! The "analyze existing applications" variant of the pipeline.
//!
//! Downloads each applicant's stored CV, then runs the same extraction,
//! parsing, and normalization stages as the direct-upload path, ending in a
//! spreadsheet artifact. Per-document download failures are dropped; only
//! the three batch-fatal conditions surface errors to the caller.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::{extract_all, SourceDocument};
use crate::models::resume::ParsedResume;
use crate::parser_client::ResumeParser;
use crate::parsing::batch::parse_all;
use crate::parsing::collaborators::ApplicationDirectory;
use crate::parsing::export::to_xlsx;
use crate::parsing::normalize::normalize_all;

/// Download fan-out cap. Independent of the parse-side limiter.
pub const MAX_CONCURRENT_DOWNLOADS: usize = 5;

/// Resolves, downloads, and analyzes every CV attached to a job's
/// applications, returning the exported spreadsheet bytes.
pub async fn analyze_applications(
    directory: &dyn ApplicationDirectory,
    http: &reqwest::Client,
    parser: Arc<dyn ResumeParser>,
    job_id: &str,
) -> Result<Vec<u8>, AppError> {
    let urls = directory.cv_urls(job_id).await?;
    info!(job_id, url_count = urls.len(), "analyzing application set");

    let downloads = download_all(http, urls).await;
    let documents: Vec<SourceDocument> = downloads.into_iter().flatten().collect();
    if documents.is_empty() {
        return Err(AppError::NoRetrievableDocuments);
    }

    let texts = extract_all(&documents).await;
    if texts.iter().all(|text| text.trim().is_empty()) {
        return Err(AppError::NoExtractableContent);
    }

    let records = normalize_all(parse_all(parser, texts).await);
    if !records.iter().any(ParsedResume::has_name) {
        return Err(AppError::NoValidData);
    }

    info!(
        job_id,
        document_count = documents.len(),
        named_records = records.iter().filter(|r| r.has_name()).count(),
        "application analysis complete"
    );
    Ok(to_xlsx(&records)?)
}

/// Downloads every URL under the bounded-concurrency limiter. The result is
/// index-aligned with the input; a failed download yields `None` in its slot
/// and never aborts the rest.
async fn download_all(http: &reqwest::Client, urls: Vec<String>) -> Vec<Option<SourceDocument>> {
    let total = urls.len();
    if total == 0 {
        return Vec::new();
    }

    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_DOWNLOADS));
    let mut tasks = JoinSet::new();

    for (index, url) in urls.into_iter().enumerate() {
        let http = http.clone();
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("download semaphore closed");
            (index, download_one(&http, &url).await)
        });
    }

    let mut documents: Vec<Option<SourceDocument>> = vec![None; total];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, document)) => documents[index] = document,
            Err(e) => warn!("download task panicked: {e}"),
        }
    }
    documents
}

async fn download_one(http: &reqwest::Client, url: &str) -> Option<SourceDocument> {
    let bytes = fetch_bytes(http, url).await.map_err(|e| {
        warn!(url, "CV download failed: {e}");
    });

    Some(SourceDocument {
        filename: filename_from_url(url),
        bytes: bytes.ok()?,
    })
}

async fn fetch_bytes(http: &reqwest::Client, url: &str) -> Result<Bytes, reqwest::Error> {
    http.get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await
}

/// Derives a filename (used for extension-based type dispatch) from the URL
/// path, ignoring any query string.
fn filename_from_url(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let after_scheme = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);

    let segment = after_scheme
        .split_once('/')
        .map(|(_, path)| path.trim_end_matches('/').rsplit('/').next().unwrap_or(""))
        .unwrap_or("");
    if segment.is_empty() {
        "document".to_string()
    } else {
        segment.to_string()
    }
}
