use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use tourops_itinerary::ScheduleOverlay;
use tracing::warn;

use super::tours::find_tour;
use super::{error_response, internal_error, not_found, success};
use crate::notify::{dispatch, ChangeNotification, RecordType};
use crate::AppState;

/// The saved overlay, not the working copy.
pub async fn api_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let tour = match find_tour(&state, &id).await {
        Ok(tour) => tour,
        Err(response) => return response,
    };

    match state.schedules.load(tour.id).await {
        Ok(Some(schedule)) => Json(serde_json::json!({ "schedule": schedule })).into_response(),
        Ok(None) => not_found("Schedule"),
        Err(e) => internal_error(&e, "Failed to load schedule"),
    }
}

/// Replace the tour's saved overlay with the request body in one write.
pub async fn api_save_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(overlay): Json<ScheduleOverlay>,
) -> impl IntoResponse {
    let tour = match find_tour(&state, &id).await {
        Ok(tour) => tour,
        Err(response) => return response,
    };

    let previous = match state.schedules.load(tour.id).await {
        Ok(saved) => saved.unwrap_or_default(),
        Err(e) => {
            warn!(tour_id = %tour.id, error = %e, "Failed to read previous schedule");
            ScheduleOverlay::default()
        }
    };

    if let Err(e) = state.schedules.save(tour.id, &overlay).await {
        return error_response(e);
    }

    dispatch(
        state.notifier.as_ref(),
        ChangeNotification::updated(RecordType::Arrival, tour.id, &tour.name, &previous, &overlay),
    )
    .await;

    success()
}
