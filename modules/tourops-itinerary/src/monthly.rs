//! Per-day activity, arrival and departure counts over a date range.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tourops_common::{TourFlag, TourOpsError, TourRecord};

use crate::datetime::parse_date_time;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivityCount {
    pub date: NaiveDate,
    /// Sum of every other column, arrivals and departures included.
    pub count: u32,
    pub hiking: u32,
    pub fishing: u32,
    pub dog_sledging: u32,
    pub snowmobile_atv: u32,
    pub aurora_village: u32,
    pub city_tour: u32,
    pub snowshoe: u32,
    pub dnr: u32,
    pub nlt: u32,
    pub arrival: u32,
    pub departure: u32,
}

impl DailyActivityCount {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            count: 0,
            hiking: 0,
            fishing: 0,
            dog_sledging: 0,
            snowmobile_atv: 0,
            aurora_village: 0,
            city_tour: 0,
            snowshoe: 0,
            dnr: 0,
            nlt: 0,
            arrival: 0,
            departure: 0,
        }
    }

    fn bump(&mut self, flag: TourFlag) {
        let column = match flag {
            TourFlag::CityTour => &mut self.city_tour,
            TourFlag::Fishing => &mut self.fishing,
            TourFlag::DogSledging => &mut self.dog_sledging,
            TourFlag::SnowmobileAtv => &mut self.snowmobile_atv,
            TourFlag::Hiking => &mut self.hiking,
            TourFlag::AuroraVillage => &mut self.aurora_village,
            TourFlag::Nlt => &mut self.nlt,
            TourFlag::Snowshoe => &mut self.snowshoe,
            TourFlag::Dnr => &mut self.dnr,
        };
        *column += 1;
    }

    fn total(&self) -> u32 {
        self.hiking
            + self.fishing
            + self.dog_sledging
            + self.snowmobile_atv
            + self.aurora_village
            + self.city_tour
            + self.snowshoe
            + self.dnr
            + self.nlt
            + self.arrival
            + self.departure
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCount {
    pub agent: String,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPlan {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days: Vec<DailyActivityCount>,
    pub agents: Vec<AgentCount>,
}

/// First and last day of a calendar month.
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next - Duration::days(1)))
}

/// Aggregate tours over `[from, to]`.
///
/// Flags of tours starting in the range are counted on their start date, using
/// the lenient `yes` check. Arrivals and departures of every tour are counted
/// on their own dates when those fall in the range. Every date of the range is
/// present in the result. Agent totals cover tours starting in the range,
/// largest first, ties in first-seen order.
pub fn aggregate_monthly(
    tours: &[TourRecord],
    from: NaiveDate,
    to: NaiveDate,
) -> Result<MonthlyPlan, TourOpsError> {
    if from > to {
        return Err(TourOpsError::Validation(
            "'From' date must be before 'To' date".into(),
        ));
    }

    let in_range = |d: NaiveDate| d >= from && d <= to;
    let mut by_date: BTreeMap<NaiveDate, DailyActivityCount> = BTreeMap::new();
    let mut agents: Vec<AgentCount> = Vec::new();

    for tour in tours.iter().filter(|t| in_range(t.start_date)) {
        let day = by_date
            .entry(tour.start_date)
            .or_insert_with(|| DailyActivityCount::empty(tour.start_date));
        for flag in TourFlag::ALL {
            if tour.flag_counted(flag) {
                day.bump(flag);
            }
        }

        let agent = if tour.agent.is_empty() { "Others" } else { tour.agent.as_str() };
        match agents.iter_mut().find(|a| a.agent == agent) {
            Some(existing) => existing.total += 1,
            None => agents.push(AgentCount {
                agent: agent.to_string(),
                total: 1,
            }),
        }
    }

    for tour in tours {
        if let Some(date) = parse_date_time(Some(&tour.arrival)).calendar_date().filter(|d| in_range(*d)) {
            by_date
                .entry(date)
                .or_insert_with(|| DailyActivityCount::empty(date))
                .arrival += 1;
        }
        if let Some(date) = parse_date_time(Some(&tour.departure)).calendar_date().filter(|d| in_range(*d)) {
            by_date
                .entry(date)
                .or_insert_with(|| DailyActivityCount::empty(date))
                .departure += 1;
        }
    }

    let days = from
        .iter_days()
        .take_while(|d| *d <= to)
        .map(|date| {
            let mut day = by_date
                .remove(&date)
                .unwrap_or_else(|| DailyActivityCount::empty(date));
            day.count = day.total();
            day
        })
        .collect();

    agents.sort_by(|a, b| b.total.cmp(&a.total));

    Ok(MonthlyPlan {
        from,
        to,
        days,
        agents,
    })
}

/// The month containing `date`.
pub fn month_of(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    month_range(date.year(), date.month())
}
