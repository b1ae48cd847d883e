pub mod itinerary;
pub mod monthly;
pub mod schedule;
pub mod staff;
pub mod tours;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tourops_common::TourOpsError;
use tracing::warn;
use uuid::Uuid;

// --- Helpers ---

pub(crate) fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

pub(crate) fn error_json(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

pub(crate) fn not_found(what: &str) -> Response {
    error_json(StatusCode::NOT_FOUND, format!("{what} not found"))
}

pub(crate) fn success() -> Response {
    Json(serde_json::json!({ "success": true })).into_response()
}

/// Log a storage failure and answer 500.
pub(crate) fn internal_error(error: &anyhow::Error, context: &str) -> Response {
    warn!(error = %error, "{context}");
    error_json(StatusCode::INTERNAL_SERVER_ERROR, context)
}

/// Status codes for domain errors.
pub(crate) fn error_response(error: TourOpsError) -> Response {
    let status = match &error {
        TourOpsError::NotFound(_) => StatusCode::NOT_FOUND,
        TourOpsError::Validation(_) => StatusCode::BAD_REQUEST,
        TourOpsError::ScheduleLocked => StatusCode::CONFLICT,
        TourOpsError::Persistence(_)
        | TourOpsError::Database(_)
        | TourOpsError::Config(_)
        | TourOpsError::Http(_)
        | TourOpsError::Anyhow(_) => {
            warn!(error = %error, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_json(status, error.to_string())
}
