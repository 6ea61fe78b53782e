use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::extract::{extract_all, DocumentKind, SourceDocument};
use crate::models::resume::{
    ExportFormat, ParseListResponse, ParsedResume, SaveCvListRequest, SavedListReceipt,
};
use crate::parsing::batch::parse_all;
use crate::parsing::export::{to_csv, to_xlsx};
use crate::parsing::fetch::analyze_applications;
use crate::parsing::normalize::normalize_all;
use crate::state::AppState;

pub const MAX_FILES_PER_BATCH: usize = 10;
pub const MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const CSV_CONTENT_TYPE: &str = "text/csv";

/// POST /api/v1/parsing-resumes/upload-and-parse
///
/// Accepts up to 10 CV files (multipart field `cvs`, each ≤10 MB, extensions
/// pdf|doc|docx) and returns one normalized record per file, in upload
/// order. Files that fail extraction or parsing come back as empty records;
/// the batch itself only fails on invalid input.
pub async fn handle_upload_and_parse(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseListResponse>, AppError> {
    let documents = collect_uploads(&mut multipart).await?;
    if documents.is_empty() {
        return Ok(Json(ParseListResponse {
            success: false,
            data: Vec::new(),
            message: "No files were uploaded".to_string(),
        }));
    }

    info!(file_count = documents.len(), "processing CV upload batch");

    let texts = extract_all(&documents).await;
    let records = normalize_all(parse_all(state.parser.clone(), texts).await);

    Ok(Json(ParseListResponse {
        success: true,
        message: format!("Successfully processed {} CV(s)", records.len()),
        data: records,
    }))
}

/// POST /api/v1/parsing-resumes/analyze-applications/:job_id
///
/// Downloads every stored CV attached to the job's applications, runs the
/// pipeline, and responds with a date-stamped `.xlsx` attachment.
pub async fn handle_analyze_applications(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response, AppError> {
    let artifact = analyze_applications(
        state.applications.as_ref(),
        &state.downloads,
        state.parser.clone(),
        &job_id,
    )
    .await?;

    let filename = format!(
        "analyzed_cvs_{}_{}.xlsx",
        job_id,
        Utc::now().format("%Y-%m-%d")
    );
    Ok(attachment_response(XLSX_CONTENT_TYPE, &filename, artifact))
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub cvs: Vec<ParsedResume>,
}

/// POST /api/v1/parsing-resumes/export
///
/// Renders an already-parsed record set as a downloadable artifact in the
/// requested format without re-running the pipeline.
pub async fn handle_export(Json(req): Json<ExportRequest>) -> Result<Response, AppError> {
    if req.cvs.is_empty() {
        return Err(AppError::Validation(
            "At least one CV is required for export".to_string(),
        ));
    }

    let records = normalize_all(req.cvs);
    let date = Utc::now().format("%Y-%m-%d");
    let (content_type, filename, artifact) = match req.format {
        ExportFormat::Excel => (
            XLSX_CONTENT_TYPE,
            format!("cv_list_{date}.xlsx"),
            to_xlsx(&records)?,
        ),
        ExportFormat::Csv => (
            CSV_CONTENT_TYPE,
            format!("cv_list_{date}.csv"),
            to_csv(&records)?,
        ),
    };

    Ok(attachment_response(content_type, &filename, artifact))
}

#[derive(Debug, Serialize)]
pub struct SaveListResponse {
    pub success: bool,
    pub data: SavedListReceipt,
    pub message: String,
}

/// POST /api/v1/parsing-resumes/save-list
///
/// Validates the handoff shape and forwards it to the platform's saved-list
/// store. This service never persists lists itself.
pub async fn handle_save_list(
    State(state): State<AppState>,
    Json(req): Json<SaveCvListRequest>,
) -> Result<Json<SaveListResponse>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("List name is required".to_string()));
    }
    if req.cvs.is_empty() {
        return Err(AppError::Validation(
            "A saved list must contain at least one CV".to_string(),
        ));
    }

    let receipt = state.saved_lists.save(&req).await?;
    info!(list_id = %receipt.id, cv_count = req.cvs.len(), "CV list saved");

    Ok(Json(SaveListResponse {
        success: true,
        data: receipt,
        message: "CV list saved successfully".to_string(),
    }))
}

/// Reads and validates the `cvs` multipart fields, rejecting oversized
/// batches, oversized files, and unsupported extensions before any pipeline
/// work starts.
async fn collect_uploads(multipart: &mut Multipart) -> Result<Vec<SourceDocument>, AppError> {
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart request: {e}")))?
    {
        if field.name() != Some("cvs") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if DocumentKind::from_filename(&filename) == DocumentKind::Unsupported {
            return Err(AppError::Validation(format!(
                "'{filename}' is not allowed: only PDF, DOC and DOCX files are accepted"
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read '{filename}': {e}")))?;
        if bytes.len() > MAX_FILE_SIZE_BYTES {
            return Err(AppError::Validation(format!(
                "'{filename}' exceeds the 10MB file size limit"
            )));
        }

        documents.push(SourceDocument { filename, bytes });
        if documents.len() > MAX_FILES_PER_BATCH {
            return Err(AppError::Validation(format!(
                "A batch may contain at most {MAX_FILES_PER_BATCH} files"
            )));
        }
    }

    Ok(documents)
}

fn attachment_response(content_type: &str, filename: &str, artifact: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        artifact,
    )
        .into_response()
}
