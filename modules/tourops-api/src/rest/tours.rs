use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tourops_common::{TourQuery, TourRecord};
use tracing::{info, warn};
use uuid::Uuid;

use super::{error_json, error_response, internal_error, not_found, parse_id, success};
use crate::notify::{dispatch, ChangeNotification, RecordType};
use crate::AppState;

#[derive(Deserialize)]
pub struct ToursQuery {
    #[serde(rename = "dateFrom")]
    date_from: Option<String>,
    #[serde(rename = "dateTo")]
    date_to: Option<String>,
    invoice: Option<String>,
    name: Option<String>,
}

impl ToursQuery {
    fn into_query(self) -> Result<TourQuery, String> {
        Ok(TourQuery {
            date_from: parse_date_param("dateFrom", self.date_from)?,
            date_to: parse_date_param("dateTo", self.date_to)?,
            invoice: non_empty(self.invoice),
            name: non_empty(self.name),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub(crate) fn parse_date_param(name: &str, value: Option<String>) -> Result<Option<NaiveDate>, String> {
    match non_empty(value) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(&v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("{name} must be a YYYY-MM-DD date")),
    }
}

pub(crate) async fn find_tour(state: &AppState, id: &str) -> Result<TourRecord, Response> {
    let Some(uuid) = parse_id(id) else {
        return Err(StatusCode::BAD_REQUEST.into_response());
    };
    match state.tours.get(uuid).await {
        Ok(Some(tour)) => Ok(tour),
        Ok(None) => Err(not_found("Tour")),
        Err(e) => Err(internal_error(&e, "Failed to load tour")),
    }
}

// --- Handlers ---

pub async fn api_tours(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ToursQuery>,
) -> impl IntoResponse {
    let query = match params.into_query() {
        Ok(q) => q,
        Err(message) => return error_json(StatusCode::BAD_REQUEST, message),
    };

    match state.tours.search(&query).await {
        Ok(tours) => Json(tours).into_response(),
        Err(e) => internal_error(&e, "Failed to search tours"),
    }
}

pub async fn api_create_tour(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let tour = match TourRecord::from_json(Uuid::new_v4(), body) {
        Ok(t) => t,
        Err(e) => return error_response(e),
    };

    if let Err(e) = state.tours.create(&tour).await {
        return internal_error(&e, "Failed to create tour");
    }
    info!(tour_id = %tour.id, name = %tour.name, "Tour created");

    dispatch(
        state.notifier.as_ref(),
        ChangeNotification::created(RecordType::Tour, tour.id, &tour.name, &tour),
    )
    .await;

    (StatusCode::CREATED, Json(tour)).into_response()
}

pub async fn api_tour_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match find_tour(&state, &id).await {
        Ok(tour) => Json(tour).into_response(),
        Err(response) => response,
    }
}

/// Merge the body's fields over the stored tour. The tour's cached schedule
/// is dropped, since its dates may have moved.
pub async fn api_update_tour(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> impl IntoResponse {
    let existing = match find_tour(&state, &id).await {
        Ok(tour) => tour,
        Err(response) => return response,
    };

    let updated = match existing.merge_patch(&patch) {
        Ok(t) => t,
        Err(e) => return error_response(e),
    };

    match state.tours.update(&updated).await {
        Ok(true) => {}
        Ok(false) => return not_found("Tour"),
        Err(e) => return internal_error(&e, "Failed to update tour"),
    }
    state.schedules.evict(updated.id);

    dispatch(
        state.notifier.as_ref(),
        ChangeNotification::updated(RecordType::Tour, updated.id, &updated.name, &existing, &updated),
    )
    .await;

    Json(updated).into_response()
}

pub async fn api_delete_tour(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let existing = match find_tour(&state, &id).await {
        Ok(tour) => tour,
        Err(response) => return response,
    };

    match state.tours.delete(existing.id).await {
        Ok(true) => {}
        Ok(false) => return not_found("Tour"),
        Err(e) => return internal_error(&e, "Failed to delete tour"),
    }
    if let Err(e) = state.schedules.delete(existing.id).await {
        warn!(tour_id = %existing.id, error = %e, "Failed to delete tour schedule");
    }
    info!(tour_id = %existing.id, "Tour deleted");

    dispatch(
        state.notifier.as_ref(),
        ChangeNotification::deleted(RecordType::Tour, existing.id, &existing.name, &existing),
    )
    .await;

    success()
}
