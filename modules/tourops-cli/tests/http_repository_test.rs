use std::sync::Arc;

use serde_json::json;
use tokio::net::TcpListener;
use uuid::Uuid;

use tourops_api::db::{MemoryStaffRepository, MemoryTourRepository, TourRepository};
use tourops_api::notify::LogNotifier;
use tourops_api::{router, AppState};
use tourops_cli::{ApiClient, HttpScheduleRepository, MonthSelector};
use tourops_common::{TourQuery, TourRecord};
use tourops_itinerary::{
    ActivityKey, EditSession, MemoryScheduleRepository, ScheduleOverlay, ScheduleRepository,
    ScheduleStore,
};

fn tour() -> TourRecord {
    TourRecord::from_json(
        Uuid::new_v4(),
        json!({
            "start_date": "2025-02-10",
            "invoice": "INV-900",
            "name": "Sato (3)",
            "pax": 3,
            "agent": "HIS",
            "arrival": "2025-02-10|21:40|AC8833",
            "departure": "2025-02-13|06:00|WS517",
            "accommodation": "Chateau Nova",
            "fishing": "Yes",
        }),
    )
    .unwrap()
}

/// Serve a fresh in-memory API on a random port and return a client for it
/// along with the server's state.
async fn spawn_api(tours: &[TourRecord]) -> (ApiClient, Arc<AppState>) {
    let tour_repo = Arc::new(MemoryTourRepository::new());
    for t in tours {
        tour_repo.create(t).await.unwrap();
    }
    let schedules: Arc<dyn ScheduleRepository> = Arc::new(MemoryScheduleRepository::new());
    let state = AppState::with_repositories(
        tour_repo,
        Arc::new(MemoryStaffRepository::new()),
        ScheduleStore::new(schedules),
        Arc::new(LogNotifier),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(state);
    let app = router(state.clone(), &[]);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (ApiClient::new(&format!("http://{addr}/")), state)
}

#[tokio::test]
async fn test_http_repository_round_trip() {
    let t = tour();
    let (api, _) = spawn_api(std::slice::from_ref(&t)).await;
    let repo = HttpScheduleRepository::new(api);

    assert!(repo.load(t.id).await.unwrap().is_none());

    let overlay = ScheduleOverlay::with_days(4)
        .add_activity(1, ActivityKey::Fishing)
        .set_note(2, "Pickup at 9");
    repo.save(t.id, &overlay).await.unwrap();

    assert_eq!(repo.load(t.id).await.unwrap(), Some(overlay));
}

#[tokio::test]
async fn test_http_repository_save_unknown_tour_fails() {
    let (api, _) = spawn_api(&[]).await;
    let repo = HttpScheduleRepository::new(api);

    let err = repo
        .save(Uuid::new_v4(), &ScheduleOverlay::with_days(2))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("404"), "{err}");
}

#[tokio::test]
async fn test_client_search_and_itinerary() {
    let t = tour();
    let (api, state) = spawn_api(std::slice::from_ref(&t)).await;

    let found = api
        .search_tours(&TourQuery {
            name: Some("sato".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, t.id);

    assert!(api.get_tour(Uuid::new_v4()).await.unwrap().is_none());

    let itinerary = api.itinerary(t.id).await.unwrap();
    assert_eq!(itinerary.day_count, 4);
    assert_eq!(itinerary.days.len(), 4);
    assert_eq!(itinerary.days[0].day_label, "Arrival Day");
    assert_eq!(itinerary.days[1].day_label, "1st Day");
    assert!(!state.schedules.cache().contains(t.id));

    let html = api.itinerary_html(t.id).await.unwrap();
    assert!(html.contains("Sato"));
    assert!(!html.contains("Sato (3)"));
    assert!(!state.schedules.cache().contains(t.id));
}

#[tokio::test]
async fn test_client_monthly_plan() {
    let t = tour();
    let (api, _) = spawn_api(std::slice::from_ref(&t)).await;

    let plan = api
        .monthly_plan(MonthSelector::Month("2025-02".into()))
        .await
        .unwrap();
    assert_eq!(plan.days.len(), 28);
    let first = plan.days.iter().find(|d| d.date.to_string() == "2025-02-10").unwrap();
    assert_eq!(first.arrival, 1);
    assert_eq!(first.fishing, 1);
    assert_eq!(plan.agents[0].agent, "HIS");

    let err = api
        .monthly_plan(MonthSelector::Month("February".into()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("400"), "{err}");
}

#[tokio::test]
async fn test_edit_session_saves_through_api() {
    let t = tour();
    let (api, state) = spawn_api(std::slice::from_ref(&t)).await;
    let store = Arc::new(ScheduleStore::new(HttpScheduleRepository::new(api.clone())));
    let mut session = EditSession::new(store);

    let days = session.select(t.clone()).await;
    assert_eq!(days.len(), 4);
    // The working copy lives in the local store, not the server's cache.
    assert!(!state.schedules.cache().contains(t.id));

    session.request_edit().unwrap();
    session.confirm_edit();
    session.set_note(1, "Lunch included").unwrap();
    session.save().await.unwrap();

    let reloaded = HttpScheduleRepository::new(api).load(t.id).await.unwrap().unwrap();
    assert_eq!(reloaded.note(1), "Lunch included");
}

#[tokio::test]
async fn test_release_drops_server_working_copy() {
    let t = tour();
    let (api, state) = spawn_api(std::slice::from_ref(&t)).await;

    let seeded = state.schedules.itinerary(&t).await;
    assert!(state.schedules.cache().contains(t.id));
    assert_eq!(api.itinerary(t.id).await.unwrap().days, seeded);

    api.release_itinerary(t.id).await.unwrap();
    assert!(!state.schedules.cache().contains(t.id));
}
