use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::{error::ApiError, state::AppState};
use crate::application::AnalysisRequest;
use crate::domain::{AnalysisRecord, Document, DomainError};
use crate::infrastructure::document_from_upload;

const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

fn bad_multipart(e: impl std::fmt::Display) -> ApiError {
    DomainError::validation(format!("invalid multipart body: {e}")).into()
}

async fn decode_upload(
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
) -> Result<Document, DomainError> {
    tokio::task::spawn_blocking(move || {
        document_from_upload(&filename, content_type.as_deref(), &bytes)
    })
    .await
    .map_err(|e| {
        if e.is_panic() {
            DomainError::validation("could not read uploaded file")
        } else {
            DomainError::internal(e.to_string())
        }
    })?
}

/// Fields: `file` (PDF or UTF-8 text), `job_description`, and optionally
/// `job_role` and `company_name`.
pub async fn create_analysis(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisRecord>, ApiError> {
    let mut document = None;
    let mut job_description = None;
    let mut job_role = None;
    let mut company_name = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("resume.txt").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                document = Some(decode_upload(filename, content_type, bytes.to_vec()).await?);
            }
            "job_description" => {
                job_description = Some(field.text().await.map_err(bad_multipart)?);
            }
            "job_role" => job_role = Some(field.text().await.map_err(bad_multipart)?),
            "company_name" => {
                company_name = Some(field.text().await.map_err(bad_multipart)?);
            }
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let document = document.ok_or_else(|| DomainError::validation("missing field: file"))?;
    let job_description =
        job_description.ok_or_else(|| DomainError::validation("missing field: job_description"))?;

    let mut request = AnalysisRequest::new(document, job_description);
    if let Some(role) = job_role.filter(|r| !r.trim().is_empty()) {
        request = request.with_job_role(role);
    }
    if let Some(company) = company_name.filter(|c| !c.trim().is_empty()) {
        request = request.with_company_name(company);
    }

    let record = state.analysis_service.analyze(request).await?;
    Ok(Json(record))
}

pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<AnalysisRecord>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let records = state.analysis_service.history(limit).await?;
    Ok(Json(records))
}
