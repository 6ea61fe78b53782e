use std::sync::Arc;

use crate::parser_client::ResumeParser;
use crate::parsing::collaborators::{ApplicationDirectory, SavedListStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The structured-data parser. A trait object so tests and the batch
    /// controller can swap in fakes.
    pub parser: Arc<dyn ResumeParser>,
    /// Client for downloading stored CV documents. Built without an overall
    /// request timeout: stored CVs can be large and the download must not
    /// impose its own body-size ceiling.
    pub downloads: reqwest::Client,
    pub applications: Arc<dyn ApplicationDirectory>,
    pub saved_lists: Arc<dyn SavedListStore>,
}
