use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde_json::{json, Value};
use tower::ServiceExt;

use tourops_api::db::{MemoryStaffRepository, MemoryTourRepository};
use tourops_api::notify::{ChangeAction, ChangeNotification, Notifier, RecordType};
use tourops_api::{router, AppState};
use tourops_itinerary::{MemoryScheduleRepository, ScheduleRepository, ScheduleStore};

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<ChangeNotification>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<ChangeNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &ChangeNotification) -> Result<()> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

struct TestApp {
    router: Router,
    notifier: Arc<RecordingNotifier>,
}

fn app() -> TestApp {
    let notifier = Arc::new(RecordingNotifier::default());
    let schedules: Arc<dyn ScheduleRepository> = Arc::new(MemoryScheduleRepository::new());
    let state = AppState::with_repositories(
        Arc::new(MemoryTourRepository::new()),
        Arc::new(MemoryStaffRepository::new()),
        ScheduleStore::with_rng(schedules, ChaCha20Rng::seed_from_u64(11)),
        notifier.clone(),
    );
    TestApp {
        router: router(Arc::new(state), &[]),
        notifier,
    }
}

impl TestApp {
    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = self.raw(method, uri, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn raw(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(match body {
                Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
                None => Body::empty(),
            })
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn create_tour(&self, body: Value) -> String {
        let (status, tour) = self.send("POST", "/api/tours", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        tour["id"].as_str().unwrap().to_string()
    }
}

fn five_day_tour() -> Value {
    json!({
        "start_date": "2024-06-01",
        "invoice": "INV-310",
        "name": "Tanaka (3)",
        "pax": 3,
        "agent": "JTB",
        "arrival": "2024-06-01|13:20|JL10",
        "departure": "2024-06-05|09:00|JL11",
        "accommodation": "Explorer Hotel",
        "hiking": "Yes",
        "fishing": "Yes",
        "nlt": "Yes",
    })
}

#[tokio::test]
async fn health_check() {
    let app = app();
    let (status, body) = app.raw("GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn tour_crud_and_search() {
    let app = app();
    let id = app.create_tour(five_day_tour()).await;
    app.create_tour(json!({ "start_date": "2024-05-20", "name": "Moreau (2)", "invoice": "INV-299" }))
        .await;

    let (status, tour) = app.send("GET", &format!("/api/tours/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tour["invoice"], "INV-310");

    let (_, all) = app.send("GET", "/api/tours", None).await;
    let names: Vec<&str> = all.as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Moreau (2)", "Tanaka (3)"]);

    let (_, found) = app.send("GET", "/api/tours?name=tanaka&dateFrom=2024-06-01", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, _) = app.send("GET", "/api/tours?dateFrom=June", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = app
        .send("PUT", &format!("/api/tours/{id}"), Some(json!({ "accommodation": "Chateau Nova" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["accommodation"], "Chateau Nova");
    assert_eq!(updated["invoice"], "INV-310");

    let (status, body) = app.send("DELETE", &format!("/api/tours/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
    let (status, _) = app.send("GET", &format!("/api/tours/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let actions: Vec<ChangeAction> = app.notifier.sent().iter().map(|n| n.action).collect();
    assert_eq!(
        actions,
        [ChangeAction::Create, ChangeAction::Create, ChangeAction::Update, ChangeAction::Delete]
    );
}

#[tokio::test]
async fn bad_ids_and_bodies_are_rejected() {
    let app = app();
    let (status, _) = app.send("GET", "/api/tours/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = app.send("GET", &format!("/api/tours/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.send("POST", "/api/tours", Some(json!({ "name": "No Date" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid tour"));
}

#[tokio::test]
async fn itinerary_is_seeded_once_and_not_persisted() {
    let app = app();
    let id = app.create_tour(five_day_tour()).await;

    let (status, first) = app.send("GET", &format!("/api/tours/{id}/itinerary"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["day_count"], 5);
    let days = first["days"].as_array().unwrap();
    assert_eq!(days.len(), 5);
    assert_eq!(days[0]["kind"], "arrival");
    assert_eq!(days[0]["arrival_info"], "2024-06-01 13:20 JL10");
    assert_eq!(days[4]["kind"], "departure");
    for day in &days[1..4] {
        let count = day["activities"].as_array().unwrap().len();
        assert!((1..=2).contains(&count));
    }

    let (_, second) = app.send("GET", &format!("/api/tours/{id}/itinerary"), None).await;
    assert_eq!(first, second);

    let (status, _) = app.send("GET", &format!("/api/tours/{id}/schedule"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn saved_schedule_drives_the_itinerary() {
    let app = app();
    let id = app.create_tour(five_day_tour()).await;

    let overlay = json!({
        "2": {
            "activities": [{ "name": "Ice Fishing", "timings": ["9:30~9:50 AM - 12:45 PM"] }],
            "note": "warm boots"
        }
    });
    let (status, body) = app
        .send("POST", &format!("/api/tours/{id}/schedule"), Some(overlay.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, saved) = app.send("GET", &format!("/api/tours/{id}/schedule"), None).await;
    assert_eq!(saved["schedule"], overlay);

    let (_, itinerary) = app.send("GET", &format!("/api/tours/{id}/itinerary"), None).await;
    let days = itinerary["days"].as_array().unwrap();
    assert_eq!(days[2]["activities"][0]["name"], "Ice Fishing");
    assert_eq!(days[2]["note"], "warm boots");
    assert!(days[1]["activities"].as_array().unwrap().is_empty());

    let last = app.notifier.sent().pop().unwrap();
    assert_eq!(last.record_type, RecordType::Arrival);
    assert!(last.changes.contains_key("2"));
}

#[tokio::test]
async fn updating_dates_drops_the_cached_schedule() {
    let app = app();
    let id = app.create_tour(five_day_tour()).await;
    app.send("GET", &format!("/api/tours/{id}/itinerary"), None).await;

    app.send(
        "PUT",
        &format!("/api/tours/{id}"),
        Some(json!({ "departure": "2024-06-07|09:00|JL11" })),
    )
    .await;

    let (_, itinerary) = app.send("GET", &format!("/api/tours/{id}/itinerary"), None).await;
    assert_eq!(itinerary["day_count"], 7);
    let days = itinerary["days"].as_array().unwrap();
    assert!(!days[5]["activities"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn tour_without_dates_has_empty_itinerary() {
    let app = app();
    let id = app.create_tour(json!({ "start_date": "2024-06-01", "name": "TBD" })).await;
    let (status, itinerary) = app.send("GET", &format!("/api/tours/{id}/itinerary"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(itinerary["day_count"], 0);
    assert!(itinerary["days"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn print_page_is_html() {
    let app = app();
    let id = app.create_tour(five_day_tour()).await;
    let (status, body) = app.raw("GET", &format!("/api/tours/{id}/itinerary/print"), None).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("WELCOME TO YOUR ARCTIC ADVENTURE"));
    assert!(html.contains("<div class=\"guest-title\">Tanaka</div>"));
}

#[tokio::test]
async fn monthly_plan_counts_and_validates_ranges() {
    let app = app();
    app.create_tour(five_day_tour()).await;

    let (status, plan) = app.send("GET", "/api/monthly-plan?month=2024-06", None).await;
    assert_eq!(status, StatusCode::OK);
    let days = plan["days"].as_array().unwrap();
    assert_eq!(days.len(), 30);
    assert_eq!(days[0]["hiking"], 1);
    assert_eq!(days[0]["arrival"], 1);
    assert_eq!(days[0]["count"], 4);
    assert_eq!(days[4]["departure"], 1);
    assert_eq!(plan["agents"], json!([{ "agent": "JTB", "total": 1 }]));

    let (status, body) = app
        .send("GET", "/api/monthly-plan?from=2024-06-30&to=2024-06-01", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("'From' date must be before 'To' date"));

    let (status, _) = app.send("GET", "/api/monthly-plan?from=2024-06-01", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn staff_lifecycle() {
    let app = app();

    let (status, body) = app
        .send("POST", "/api/staff", Some(json!({ "email": "a@tours.ca", "name": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Missing required fields"));

    let (status, created) = app
        .send(
            "POST",
            "/api/staff",
            Some(json!({ "email": "ada@tours.ca", "name": "Ada Lovelace", "role": "guide" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Ada Lovelace");
    let id = created["id"].as_str().unwrap().to_string();

    let (_, list) = app.send("GET", "/api/staff", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, updated) = app
        .send("PUT", &format!("/api/staff/{id}"), Some(json!({ "role": "manager" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "manager");
    assert_eq!(updated["email"], "ada@tours.ca");

    let (status, _) = app.send("DELETE", &format!("/api/staff/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send("DELETE", &format!("/api/staff/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|n| n.record_type == RecordType::Staff));
    assert_eq!(sent[1].changes.len(), 1);
    assert!(sent[1].changes.contains_key("role"));
}
