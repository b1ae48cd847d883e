use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tourops_common::TourQuery;
use tourops_itinerary::{aggregate_monthly, month_of, month_range};

use super::tours::parse_date_param;
use super::{error_json, error_response, internal_error};
use crate::AppState;

#[derive(Deserialize)]
pub struct MonthlyQuery {
    from: Option<String>,
    to: Option<String>,
    /// `YYYY-MM`. Takes precedence over `from`/`to`.
    month: Option<String>,
}

impl MonthlyQuery {
    /// The requested range. Defaults to the current month.
    fn range(self) -> Result<(NaiveDate, NaiveDate), String> {
        if let Some(month) = self.month.filter(|m| !m.trim().is_empty()) {
            return parse_month(&month).ok_or_else(|| "month must be YYYY-MM".to_string());
        }

        let from = parse_date_param("from", self.from)?;
        let to = parse_date_param("to", self.to)?;
        match (from, to) {
            (Some(from), Some(to)) => Ok((from, to)),
            (None, None) => month_of(Utc::now().date_naive())
                .ok_or_else(|| "current month is out of range".to_string()),
            _ => Err("both from and to are required".to_string()),
        }
    }
}

fn parse_month(raw: &str) -> Option<(NaiveDate, NaiveDate)> {
    let (year, month) = raw.trim().split_once('-')?;
    month_range(year.parse().ok()?, month.parse().ok()?)
}

pub async fn api_monthly_plan(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthlyQuery>,
) -> impl IntoResponse {
    let (from, to) = match params.range() {
        Ok(r) => r,
        Err(message) => return error_json(StatusCode::BAD_REQUEST, message),
    };

    // Arrivals and departures of tours starting outside the range still count.
    let tours = match state.tours.search(&TourQuery::default()).await {
        Ok(t) => t,
        Err(e) => return internal_error(&e, "Failed to load tours"),
    };

    match aggregate_monthly(&tours, from, to) {
        Ok(plan) => Json(plan).into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        let (from, to) = parse_month("2024-02").unwrap();
        assert_eq!(from.to_string(), "2024-02-01");
        assert_eq!(to.to_string(), "2024-02-29");
        assert!(parse_month("2024").is_none());
        assert!(parse_month("2024-13").is_none());
    }
}
