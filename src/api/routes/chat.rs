use axum::{extract::State, Json};
use serde::Deserialize;

use crate::api::{error::ApiError, state::AppState};
use crate::application::ChatAnswer;
use crate::domain::{CollectionId, Message, Query};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<Message>,
    pub collection_id: Option<CollectionId>,
}

pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatAnswer>, ApiError> {
    let query = Query::new(request.message).with_history(request.history);
    let answer = state
        .chat_service
        .ask(&query, request.collection_id)
        .await?;
    Ok(Json(answer))
}
