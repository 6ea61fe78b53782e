//! HTTP client for the external résumé extraction service.
//!
//! The public contract is total: `parse_one` always produces a record. Every
//! network or decoding failure degrades to the all-empty `ParsedResume` after
//! the retry budget is spent, so a single bad document cannot abort a batch.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::resume::ParsedResume;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_ATTEMPTS: u32 = 3;
/// Fixed backoff for timeouts and connection failures.
const TRANSIENT_BACKOFF: Duration = Duration::from_secs(1);
/// Used when a 429 response carries no usable retry hint.
const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
enum ParserError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// How one failed attempt should be handled by the retry loop.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AttemptFailure {
    /// HTTP 429; the service told us how long to wait.
    RateLimited { retry_after: Duration },
    /// Timeout or connection failure.
    Transient,
    /// Anything else; retrying will not help.
    Fatal,
}

/// Retry policy: at most [`MAX_ATTEMPTS`] attempts per document, honoring the
/// rate-limit hint on 429 and a fixed 1 s backoff on transient failures.
/// Returns the delay before the next attempt, or `None` to give up.
pub(crate) fn backoff_for(failure: &AttemptFailure, attempt: u32) -> Option<Duration> {
    if attempt >= MAX_ATTEMPTS {
        return None;
    }
    match failure {
        AttemptFailure::RateLimited { retry_after } => Some(*retry_after),
        AttemptFailure::Transient => Some(TRANSIENT_BACKOFF),
        AttemptFailure::Fatal => None,
    }
}

#[derive(Debug, Serialize)]
struct ParseRequest<'a> {
    cv: &'a str,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    #[serde(default)]
    data: ParsedResume,
    #[serde(default)]
    method: String,
}

#[derive(Debug, Deserialize)]
struct RateLimitBody {
    #[serde(default)]
    retry_delay: Option<f64>,
}

/// Parses the `retry_delay` (seconds) hint out of a 429 response body.
pub(crate) fn retry_after_from_body(body: &str) -> Duration {
    serde_json::from_str::<RateLimitBody>(body)
        .ok()
        .and_then(|b| b.retry_delay)
        // Hints outside a sane window fall back to the default delay.
        .filter(|secs| (0.0..=3600.0).contains(secs))
        .map(Duration::from_secs_f64)
        .unwrap_or(DEFAULT_RATE_LIMIT_DELAY)
}

/// Abstraction over the per-document parse call so the batch controller can
/// be exercised with fakes in tests.
#[async_trait]
pub trait ResumeParser: Send + Sync {
    /// Parses one cleaned CV text into a structured record. Never fails;
    /// unusable input or an unreachable service yields the default record.
    async fn parse_one(&self, text: &str) -> ParsedResume;
}

/// The production parser backed by the extraction service's HTTP endpoint.
#[derive(Clone)]
pub struct ParserClient {
    client: Client,
    endpoint: String,
}

impl ParserClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
        }
    }

    /// One request/response cycle. Classifies every failure for the retry
    /// loop instead of returning it.
    async fn attempt(&self, text: &str) -> Result<ParsedResume, AttemptFailure> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ParseRequest { cv: text })
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                let failure = if e.is_timeout() || e.is_connect() {
                    AttemptFailure::Transient
                } else {
                    AttemptFailure::Fatal
                };
                warn!("parser request failed: {}", ParserError::Http(e));
                return Err(failure);
            }
        };

        let status = response.status();
        if status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            let retry_after = retry_after_from_body(&body);
            return Err(AttemptFailure::RateLimited { retry_after });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(
                "parser service rejected request: {}",
                ParserError::Api {
                    status: status.as_u16(),
                    message,
                }
            );
            return Err(AttemptFailure::Fatal);
        }

        match response.json::<ParseResponse>().await {
            Ok(parsed) => {
                debug!(method = %parsed.method, "parser response decoded");
                Ok(parsed.data)
            }
            Err(e) => {
                warn!("parser response body was not decodable: {e}");
                Err(AttemptFailure::Fatal)
            }
        }
    }
}

#[async_trait]
impl ResumeParser for ParserClient {
    async fn parse_one(&self, text: &str) -> ParsedResume {
        // No network call for documents that produced no text.
        if text.trim().is_empty() {
            return ParsedResume::default();
        }

        for attempt in 1..=MAX_ATTEMPTS {
            let started = Instant::now();
            let outcome = self.attempt(text).await;
            let latency_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(record) => {
                    debug!(attempt, latency_ms, outcome = "success", "parser call");
                    return record;
                }
                Err(failure) => match backoff_for(&failure, attempt) {
                    Some(delay) => {
                        warn!(
                            attempt,
                            latency_ms,
                            outcome = ?failure,
                            delay_ms = delay.as_millis() as u64,
                            "parser call failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        warn!(
                            attempt,
                            latency_ms,
                            outcome = ?failure,
                            "parser call failed, falling back to empty record"
                        );
                        return ParsedResume::default();
                    }
                },
            }
        }

        ParsedResume::default()
    }
}
