//! Typed client for the tour operations HTTP API.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tourops_common::{TourOpsError, TourQuery, TourRecord};
use tourops_itinerary::{ItineraryDay, MonthlyPlan, ScheduleOverlay, ScheduleRepository};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ItineraryResponse {
    pub tour_id: Uuid,
    pub day_count: usize,
    pub days: Vec<ItineraryDay>,
}

#[derive(Deserialize)]
struct ScheduleResponse {
    schedule: ScheduleOverlay,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn search_tours(&self, query: &TourQuery) -> Result<Vec<TourRecord>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(from) = query.date_from {
            params.push(("dateFrom", from.to_string()));
        }
        if let Some(to) = query.date_to {
            params.push(("dateTo", to.to_string()));
        }
        if let Some(invoice) = &query.invoice {
            params.push(("invoice", invoice.clone()));
        }
        if let Some(name) = &query.name {
            params.push(("name", name.clone()));
        }

        let resp = self.client.get(self.url("/api/tours")).query(&params).send().await?;
        json_body(resp).await
    }

    /// `None` when the API has no tour with this id.
    pub async fn get_tour(&self, id: Uuid) -> Result<Option<TourRecord>> {
        let resp = self.client.get(self.url(&format!("/api/tours/{id}"))).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        json_body(resp).await.map(Some)
    }

    /// Read a tour's itinerary. A schedule seeded for this read is not kept
    /// on the server; an existing working copy is shown as-is.
    pub async fn itinerary(&self, id: Uuid) -> Result<ItineraryResponse> {
        let resp = self
            .client
            .get(self.url(&format!("/api/tours/{id}/itinerary")))
            .query(&[("cache", "false")])
            .send()
            .await?;
        json_body(resp).await
    }

    pub async fn itinerary_html(&self, id: Uuid) -> Result<String> {
        let resp = self
            .client
            .get(self.url(&format!("/api/tours/{id}/itinerary/print")))
            .query(&[("cache", "false")])
            .send()
            .await?;
        Ok(check(resp).await?.text().await?)
    }

    /// Drop the server's in-memory working schedule for a tour.
    pub async fn release_itinerary(&self, id: Uuid) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/tours/{id}/itinerary")))
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    pub async fn monthly_plan(&self, range: MonthSelector) -> Result<MonthlyPlan> {
        let params: Vec<(&str, String)> = match range {
            MonthSelector::Current => Vec::new(),
            MonthSelector::Month(month) => vec![("month", month)],
            MonthSelector::Range(from, to) => {
                vec![("from", from.to_string()), ("to", to.to_string())]
            }
        };
        let resp = self
            .client
            .get(self.url("/api/monthly-plan"))
            .query(&params)
            .send()
            .await?;
        json_body(resp).await
    }
}

/// Which dates the monthly plan covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthSelector {
    Current,
    /// `YYYY-MM`
    Month(String),
    Range(NaiveDate, NaiveDate),
}

/// Map a non-success response to an error carrying the API's message.
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);
    Err(TourOpsError::Http(format!("HTTP {}: {message}", status.as_u16())).into())
}

async fn json_body<T: DeserializeOwned>(resp: Response) -> Result<T> {
    Ok(check(resp).await?.json::<T>().await?)
}

// ---------------------------------------------------------------------------
// HttpScheduleRepository
// ---------------------------------------------------------------------------

/// Schedule storage backed by the API's schedule endpoints.
pub struct HttpScheduleRepository {
    api: ApiClient,
}

impl HttpScheduleRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ScheduleRepository for HttpScheduleRepository {
    async fn load(&self, tour_id: Uuid) -> Result<Option<ScheduleOverlay>> {
        let resp = self
            .api
            .client
            .get(self.api.url(&format!("/api/tours/{tour_id}/schedule")))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(tour_id = %tour_id, "No saved schedule");
            return Ok(None);
        }
        let body: ScheduleResponse = json_body(resp).await?;
        Ok(Some(body.schedule))
    }

    async fn save(&self, tour_id: Uuid, overlay: &ScheduleOverlay) -> Result<()> {
        let resp = self
            .api
            .client
            .post(self.api.url(&format!("/api/tours/{tour_id}/schedule")))
            .json(overlay)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}
