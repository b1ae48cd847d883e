//! HTTP API for tour operations: tours, schedules, itineraries, the monthly
//! plan and staff.

pub mod db;
pub mod notify;
pub mod rest;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tourops_itinerary::{MemoryScheduleRepository, ScheduleRepository, ScheduleStore};

use db::{
    MemoryStaffRepository, MemoryTourRepository, PgScheduleRepository, PgStaffRepository,
    PgTourRepository, StaffRepository, TourRepository,
};
use notify::Notifier;

pub type Schedules = ScheduleStore<Arc<dyn ScheduleRepository>>;

pub struct AppState {
    pub tours: Arc<dyn TourRepository>,
    pub staff: Arc<dyn StaffRepository>,
    pub schedules: Schedules,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn postgres(pool: PgPool, notifier: Arc<dyn Notifier>) -> Self {
        let schedules: Arc<dyn ScheduleRepository> = Arc::new(PgScheduleRepository::new(pool.clone()));
        Self {
            tours: Arc::new(PgTourRepository::new(pool.clone())),
            staff: Arc::new(PgStaffRepository::new(pool)),
            schedules: ScheduleStore::new(schedules),
            notifier,
        }
    }

    /// Everything in process memory, starting with one demo tour.
    pub fn in_memory(notifier: Arc<dyn Notifier>) -> Self {
        let schedules: Arc<dyn ScheduleRepository> = Arc::new(MemoryScheduleRepository::new());
        Self::with_repositories(
            Arc::new(MemoryTourRepository::with_demo_tour()),
            Arc::new(MemoryStaffRepository::new()),
            ScheduleStore::new(schedules),
            notifier,
        )
    }

    pub fn with_repositories(
        tours: Arc<dyn TourRepository>,
        staff: Arc<dyn StaffRepository>,
        schedules: Schedules,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tours,
            staff,
            schedules,
            notifier,
        }
    }
}

/// All routes with CORS, no-store caching headers and request tracing.
/// An empty origin list allows any origin.
pub fn router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let cors = if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
    };

    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Tours
        .route(
            "/api/tours",
            get(rest::tours::api_tours).post(rest::tours::api_create_tour),
        )
        .route(
            "/api/tours/{id}",
            get(rest::tours::api_tour_detail)
                .put(rest::tours::api_update_tour)
                .delete(rest::tours::api_delete_tour),
        )
        // Schedules and itineraries
        .route(
            "/api/tours/{id}/schedule",
            get(rest::schedule::api_schedule).post(rest::schedule::api_save_schedule),
        )
        .route(
            "/api/tours/{id}/itinerary",
            get(rest::itinerary::api_itinerary).delete(rest::itinerary::api_release_itinerary),
        )
        .route(
            "/api/tours/{id}/itinerary/print",
            get(rest::itinerary::api_itinerary_print),
        )
        .route("/api/monthly-plan", get(rest::monthly::api_monthly_plan))
        // Staff
        .route(
            "/api/staff",
            get(rest::staff::api_staff).post(rest::staff::api_create_staff),
        )
        .route(
            "/api/staff/{id}",
            axum::routing::put(rest::staff::api_update_staff).delete(rest::staff::api_delete_staff),
        )
        .with_state(state)
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
