use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::DomainError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

/// Maps a `DomainError` onto an HTTP status and a JSON body.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::EmptyInput => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::UnknownCollection(_) => StatusCode::NOT_FOUND,
            DomainError::NoActiveSession => StatusCode::CONFLICT,
            DomainError::EmbeddingUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::GenerationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DomainError::GenerationUnavailable(_)
            | DomainError::ExternalService(_)
            | DomainError::MalformedGeneratorOutput(_) => StatusCode::BAD_GATEWAY,
            DomainError::DuplicateChunkId(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, kind = self.0.kind(), "request failed");
        } else {
            tracing::debug!(error = %self.0, kind = self.0.kind(), "request rejected");
        }

        let body = ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}
