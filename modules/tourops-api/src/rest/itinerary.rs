use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use serde::Deserialize;
use tourops_common::TourRecord;
use tourops_itinerary::{render_print_html, tour_day_count, ItineraryDay};

use super::tours::find_tour;
use super::{parse_id, success};
use crate::AppState;

#[derive(Deserialize)]
pub struct ItineraryQuery {
    /// `false` reads the itinerary without keeping a newly seeded working
    /// copy in memory. Defaults to `true`.
    cache: Option<bool>,
}

impl ItineraryQuery {
    async fn days(&self, state: &AppState, tour: &TourRecord) -> Vec<ItineraryDay> {
        if self.cache.unwrap_or(true) {
            state.schedules.itinerary(tour).await
        } else {
            state.schedules.preview(tour).await
        }
    }
}

/// The merged itinerary. The first request for a tour without a saved
/// schedule seeds one at random; it is kept in memory until saved or released
/// unless `cache=false` is given.
pub async fn api_itinerary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ItineraryQuery>,
) -> impl IntoResponse {
    let tour = match find_tour(&state, &id).await {
        Ok(tour) => tour,
        Err(response) => return response,
    };

    let days = query.days(&state, &tour).await;
    Json(serde_json::json!({
        "tour_id": tour.id,
        "day_count": tour_day_count(&tour).unwrap_or(0),
        "days": days,
    }))
    .into_response()
}

/// Drop the tour's in-memory working schedule.
pub async fn api_release_itinerary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let Some(uuid) = parse_id(&id) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    state.schedules.evict(uuid);
    success()
}

pub async fn api_itinerary_print(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ItineraryQuery>,
) -> impl IntoResponse {
    let tour = match find_tour(&state, &id).await {
        Ok(tour) => tour,
        Err(response) => return response,
    };

    let days = query.days(&state, &tour).await;
    Html(render_print_html(&tour, &days)).into_response()
}
