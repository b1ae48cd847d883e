//! Terminal rendering for tours, itineraries and the monthly plan.

use console::style;
use tourops_common::TourRecord;
use tourops_itinerary::{DayKind, ItineraryDay, MonthlyPlan};

/// One-line label used in tour pickers.
pub fn tour_label(tour: &TourRecord) -> String {
    let invoice = if tour.invoice.is_empty() { "-" } else { tour.invoice.as_str() };
    format!("{}  {:<10}  {}  ({} pax)", tour.start_date, invoice, tour.name, tour.pax)
}

pub fn itinerary_lines(days: &[ItineraryDay]) -> Vec<String> {
    let mut lines = Vec::new();
    for day in days {
        let heading = match day.kind {
            DayKind::Arrival => style(&day.day_label).green().bold(),
            DayKind::Departure => style(&day.day_label).magenta().bold(),
            DayKind::Middle => style(&day.day_label).bold(),
        };
        lines.push(heading.to_string());
        lines.push(format!("  {}", indent(&day.arrival_info)));

        for activity in &day.activities {
            let timing = activity.timings.first().map(String::as_str).unwrap_or("");
            lines.push(format!("  - {} {}", style(&activity.name).cyan(), style(timing).dim()));
        }

        lines.push(format!("  Hotel: {}", indent(&day.hotel_info)));
        lines.push(format!("  Pax/Payment: {}", day.payment_info));
        if !day.note.is_empty() {
            lines.push(format!("  Note: {}", style(indent(&day.note)).yellow()));
        }
    }
    lines
}

pub fn print_itinerary(tour: &TourRecord, days: &[ItineraryDay]) {
    println!();
    println!("{}", style(tour_label(tour)).bold().underlined());
    if days.is_empty() {
        println!("{}", style("No itinerary: arrival or departure date is missing.").yellow());
        return;
    }
    for line in itinerary_lines(days) {
        println!("{line}");
    }
}

pub fn monthly_lines(plan: &MonthlyPlan) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<10} {:>5} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}",
        "Date", "Total", "HIK", "FSH", "DOG", "SNO", "ICE", "CTY", "SHO", "DNR", "NLT", "ARR", "DEP"
    )];
    for d in plan.days.iter().filter(|d| d.count > 0) {
        lines.push(format!(
            "{:<10} {:>5} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}",
            d.date.to_string(),
            d.count,
            d.hiking,
            d.fishing,
            d.dog_sledging,
            d.snowmobile_atv,
            d.aurora_village,
            d.city_tour,
            d.snowshoe,
            d.dnr,
            d.nlt,
            d.arrival,
            d.departure,
        ));
    }
    if !plan.agents.is_empty() {
        lines.push(String::new());
        lines.push("Agents:".to_string());
        for a in &plan.agents {
            lines.push(format!("  {:<24} {:>4}", a.agent, a.total));
        }
    }
    lines
}

fn indent(text: &str) -> String {
    text.replace('\n', "\n  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tourops_itinerary::{aggregate_monthly, generate_itinerary, month_range};
    use uuid::Uuid;

    fn tour() -> TourRecord {
        TourRecord::from_json(
            Uuid::nil(),
            json!({
                "start_date": "2024-06-01",
                "invoice": "INV-7",
                "name": "Ito (2)",
                "pax": 2,
                "arrival": "2024-06-01|10:00",
                "departure": "2024-06-03|12:00",
                "hiking": "Yes",
                "agent": "HIS",
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_tour_label() {
        assert_eq!(tour_label(&tour()), "2024-06-01  INV-7       Ito (2)  (2 pax)");
    }

    #[test]
    fn test_itinerary_lines_cover_every_day() {
        console::set_colors_enabled(false);
        let days = generate_itinerary(&tour(), None);
        let lines = itinerary_lines(&days);
        assert_eq!(lines.iter().filter(|l| l.ends_with("Day")).count(), 3);
        assert!(lines.iter().any(|l| l.contains("(Cold-weather gear will be collected)")));
    }

    #[test]
    fn test_monthly_lines_skip_empty_days() {
        let (from, to) = month_range(2024, 6).unwrap();
        let plan = aggregate_monthly(&[tour()], from, to).unwrap();
        let lines = monthly_lines(&plan);
        // header, 06-01 and 06-03, blank, "Agents:", one agent
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("2024-06-01"));
        assert!(lines[2].starts_with("2024-06-03"));
        assert!(lines[5].contains("HIS"));
    }
}
