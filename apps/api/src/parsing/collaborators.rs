//! Seams to the core recruiting platform.
//!
//! Application records and saved-list persistence are owned by the main
//! platform API; this service only needs two narrow operations from it, so
//! they are trait objects on `AppState` with HTTP-backed defaults.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::models::resume::{SaveCvListRequest, SavedListReceipt};

/// Resolves an application set (all applications for one job) to the stored
/// CV URLs of its applicants.
#[async_trait]
pub trait ApplicationDirectory: Send + Sync {
    async fn cv_urls(&self, job_id: &str) -> Result<Vec<String>>;
}

/// Persists a parsed CV list on behalf of its owner.
#[async_trait]
pub trait SavedListStore: Send + Sync {
    async fn save(&self, request: &SaveCvListRequest) -> Result<SavedListReceipt>;
}

#[derive(Debug, Deserialize)]
struct CvUrlsResponse {
    #[serde(default)]
    data: Vec<String>,
}

/// Platform-API-backed implementation of both collaborator seams.
#[derive(Clone)]
pub struct PlatformClient {
    client: reqwest::Client,
    base_url: String,
}

impl PlatformClient {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ApplicationDirectory for PlatformClient {
    async fn cv_urls(&self, job_id: &str) -> Result<Vec<String>> {
        let url = format!("{}/jobs/{}/applications/cv-urls", self.base_url, job_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to reach the platform API at {url}"))?
            .error_for_status()
            .context("platform API rejected the cv-urls request")?;

        let body: CvUrlsResponse = response
            .json()
            .await
            .context("cv-urls response was not decodable")?;
        Ok(body.data)
    }
}

#[async_trait]
impl SavedListStore for PlatformClient {
    async fn save(&self, request: &SaveCvListRequest) -> Result<SavedListReceipt> {
        let url = format!("{}/cv-lists", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("failed to reach the platform API at {url}"))?
            .error_for_status()
            .context("platform API rejected the save-list request")?;

        response
            .json()
            .await
            .context("save-list response was not decodable")
    }
}
