use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{error::ApiError, state::AppState};
use crate::application::IngestOutcome;
use crate::domain::{CollectionId, DomainError};

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub content: String,
    pub collection_id: Option<CollectionId>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub collection_id: CollectionId,
    pub chunks: usize,
    pub empty: bool,
}

impl From<IngestOutcome> for IngestResponse {
    fn from(outcome: IngestOutcome) -> Self {
        Self {
            empty: matches!(outcome, IngestOutcome::Empty { .. }),
            chunks: outcome.chunk_count(),
            collection_id: outcome.collection_id().clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub collection_id: Option<CollectionId>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub collection_id: CollectionId,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<usize>,
    pub collection_id: Option<CollectionId>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultResponse {
    pub chunk_id: Uuid,
    pub ordinal: usize,
    pub content: String,
    pub score: f32,
}

pub async fn ingest_document(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    let collection = request.collection_id.unwrap_or_else(CollectionId::generate);
    let outcome = state.session.ingest(&collection, &request.content).await?;
    Ok(Json(outcome.into()))
}

pub async fn reset_session(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<ResetResponse>, ApiError> {
    let collection = request.collection_id.unwrap_or_else(CollectionId::generate);
    state.session.reset(&collection).await?;
    Ok(Json(ResetResponse {
        collection_id: collection,
    }))
}

pub async fn search_session(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<SearchResultResponse>>, ApiError> {
    let collection = match request.collection_id {
        Some(c) => c,
        None => state
            .session
            .active_collection()
            .await
            .ok_or(DomainError::NoActiveSession)?,
    };

    let top_k = request
        .limit
        .unwrap_or_else(|| state.rag_service.default_top_k());
    if top_k == 0 {
        return Err(DomainError::validation("limit must be greater than zero").into());
    }
    let results = state
        .rag_service
        .retrieve_top_k(&collection, &request.query, top_k)
        .await?;

    Ok(Json(
        results
            .into_iter()
            .map(|r| SearchResultResponse {
                chunk_id: r.chunk.id,
                ordinal: r.chunk.ordinal,
                content: r.chunk.text,
                score: r.score,
            })
            .collect(),
    ))
}
