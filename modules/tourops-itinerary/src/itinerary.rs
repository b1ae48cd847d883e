//! Day-by-day itinerary derived from a tour's arrival and departure fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tourops_common::TourRecord;
use tracing::debug;

use crate::datetime::{parse_date_time, DateTimeDescriptor};
use crate::overlay::{Activity, ScheduleOverlay};

pub const FREE_ACTIVITY: &str = "*Free activity";
pub const SHUTTLE_NOTICE: &str = "Shuttle service is scheduled 2 hours before the departure flight. Please wait in the lobby of your accommodation.";
pub const GEAR_COLLECTION: &str = "(Cold-weather gear will be collected)";
const EMPTY_CELL: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Arrival,
    Middle,
    Departure,
}

/// One row of the derived schedule. Every field is always populated, so a
/// renderer never has to handle missing cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day_label: String,
    pub kind: DayKind,
    pub arrival_info: String,
    pub activities: Vec<Activity>,
    pub hotel_info: String,
    pub payment_info: String,
    pub note: String,
}

/// Number of itinerary days for a stay: whole days between the two dates plus
/// one, never less than one.
pub fn day_count(arrival: NaiveDate, departure: NaiveDate) -> usize {
    let days = (departure - arrival).num_days() + 1;
    days.max(1) as usize
}

/// The day count for a tour, or `None` when either date is missing or not ISO.
pub fn tour_day_count(tour: &TourRecord) -> Option<usize> {
    let arrival = parse_date_time(Some(&tour.arrival)).calendar_date()?;
    let departure = parse_date_time(Some(&tour.departure)).calendar_date()?;
    Some(day_count(arrival, departure))
}

/// "Arrival Day", "1st Day", "2nd Day", "3rd Day", then "{n}th Day".
pub fn day_label(index: usize) -> String {
    match index {
        0 => "Arrival Day".to_string(),
        1 => "1st Day".to_string(),
        2 => "2nd Day".to_string(),
        3 => "3rd Day".to_string(),
        n => format!("{n}th Day"),
    }
}

/// Build the itinerary for a tour, overlaying saved activities and notes.
///
/// Returns an empty list when the arrival or departure date cannot be read.
/// A one-day stay is styled as an arrival day.
pub fn generate_itinerary(tour: &TourRecord, overlay: Option<&ScheduleOverlay>) -> Vec<ItineraryDay> {
    let arrival = parse_date_time(Some(&tour.arrival));
    let departure = parse_date_time(Some(&tour.departure));

    let (Some(arrival_date), Some(departure_date)) =
        (arrival.calendar_date(), departure.calendar_date())
    else {
        debug!(tour_id = %tour.id, "Tour has no usable arrival/departure dates, itinerary is empty");
        return Vec::new();
    };

    let count = day_count(arrival_date, departure_date);
    let hotel = or_dash(&tour.accommodation);

    (0..count)
        .map(|index| {
            let note = overlay
                .map(|o| o.note(index).to_string())
                .unwrap_or_default();

            if index == 0 {
                ItineraryDay {
                    day_label: day_label(index),
                    kind: DayKind::Arrival,
                    arrival_info: arrival.display().unwrap_or_else(|| EMPTY_CELL.to_string()),
                    activities: Vec::new(),
                    hotel_info: hotel.clone(),
                    // Headcount, not a payment.
                    payment_info: if tour.pax != 0 {
                        tour.pax.to_string()
                    } else {
                        EMPTY_CELL.to_string()
                    },
                    note,
                }
            } else if index == count - 1 {
                ItineraryDay {
                    day_label: day_label(index),
                    kind: DayKind::Departure,
                    arrival_info: SHUTTLE_NOTICE.to_string(),
                    activities: Vec::new(),
                    hotel_info: departure_info(&departure),
                    payment_info: EMPTY_CELL.to_string(),
                    note,
                }
            } else {
                ItineraryDay {
                    day_label: day_label(index),
                    kind: DayKind::Middle,
                    arrival_info: FREE_ACTIVITY.to_string(),
                    activities: overlay
                        .map(|o| o.activities(index).to_vec())
                        .unwrap_or_default(),
                    hotel_info: hotel.clone(),
                    payment_info: if index == 1 && !tour.payment.is_empty() {
                        format!("*Optional (Self-pay) - {}", tour.payment)
                    } else {
                        EMPTY_CELL.to_string()
                    },
                    note,
                }
            }
        })
        .collect()
}

fn departure_info(departure: &DateTimeDescriptor) -> String {
    let date = if departure.date.is_empty() {
        EMPTY_CELL
    } else {
        departure.date.as_str()
    };
    format!(
        "{date} {}{}\n{GEAR_COLLECTION}",
        departure.time,
        departure.flight_suffix()
    )
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        value.to_string()
    }
}
