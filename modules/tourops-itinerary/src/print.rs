//! Printable guest itinerary page.

use tourops_common::TourRecord;

use crate::itinerary::{ItineraryDay, FREE_ACTIVITY};

/// Render a standalone landscape HTML page for a guest group: a welcome
/// header with the booking details, the itinerary table, and a footer.
pub fn render_print_html(tour: &TourRecord, days: &[ItineraryDay]) -> String {
    let rows: String = days
        .iter()
        .enumerate()
        .map(|(i, day)| render_row(i, day))
        .collect();

    let content = format!(
        r#"<div class="welcome-header">
<div class="welcome-text">WELCOME TO YOUR ARCTIC ADVENTURE</div>
<div class="guest-title">{guest}</div>
<div class="guest-info">
<div class="info-item"><div class="info-label">Invoice</div><div class="info-value">{invoice}</div></div>
<div class="info-item"><div class="info-label">Pax</div><div class="info-value">{pax}</div></div>
<div class="info-item"><div class="info-label">Language</div><div class="info-value">{language}</div></div>
<div class="info-item"><div class="info-label">Group</div><div class="info-value">{group}</div></div>
</div>
</div>
<div class="schedule-section">
<div class="section-title">Your Itinerary</div>
<table>
<thead><tr><th>Day</th><th>Arrival Date ARR.</th><th>Planned Activities</th><th>Hotel Stay HOTEL</th><th>People pax</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</div>
<div class="footer">Welcome to the Arctic! We look forward to making your stay unforgettable with authentic experiences and warm hospitality.</div>"#,
        guest = html_escape(guest_title(&tour.name)),
        invoice = html_escape(&tour.invoice),
        pax = tour.pax,
        language = html_escape(&tour.language),
        group = html_escape(&tour.group_id),
    );

    build_page("Guest Arrival Schedule", &content)
}

/// Guest names carry a trailing headcount, e.g. `"Lee Group (3)"`.
fn guest_title(name: &str) -> &str {
    let trimmed = name.trim_end();
    if let Some(body) = trimmed.strip_suffix(')') {
        if let Some(open) = body.rfind('(') {
            let digits = &body[open + 1..];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return body[..open].trim_end();
            }
        }
    }
    trimmed
}

fn render_row(index: usize, day: &ItineraryDay) -> String {
    let activities = if day.activities.is_empty() {
        format!(r#"<div class="free">{}</div>"#, html_escape(FREE_ACTIVITY))
    } else {
        day.activities
            .iter()
            .map(|a| {
                format!(
                    r#"<div class="activity"><div class="activity-name">{}</div><div class="activity-timing">{}</div></div>"#,
                    html_escape(&a.name),
                    html_escape(a.timings.first().map(String::as_str).unwrap_or_default()),
                )
            })
            .collect()
    };

    let note = if day.note.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="note">{}</div>"#, multiline(&day.note))
    };

    format!(
        "<tr class=\"{stripe}\"><td class=\"day\">{label}</td><td>{arrival}</td><td>{activities}</td><td>{hotel}</td><td class=\"pax\"><div>{payment}</div>{note}</td></tr>\n",
        stripe = if index % 2 == 0 { "even" } else { "odd" },
        label = html_escape(&day.day_label),
        arrival = multiline(&day.arrival_info),
        hotel = multiline(&day.hotel_info),
        payment = html_escape(&day.payment_info),
    )
}

fn multiline(s: &str) -> String {
    html_escape(s).replace('\n', "<br>")
}

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
@page{{size:landscape;margin:10mm;}}
*{{margin:0;padding:0;box-sizing:border-box;-webkit-print-color-adjust:exact;print-color-adjust:exact;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#fff;}}
.welcome-header{{background:linear-gradient(135deg,#0b3d91,#1e6fd9);color:#fff;padding:20px 28px;}}
.welcome-text{{font-size:13px;letter-spacing:3px;font-weight:600;opacity:.9;}}
.guest-title{{font-size:26px;font-weight:700;margin:6px 0 12px;}}
.guest-info{{display:flex;gap:32px;}}
.info-label{{font-size:10px;text-transform:uppercase;opacity:.8;}}
.info-value{{font-size:14px;font-weight:600;}}
.schedule-section{{padding:16px 28px;}}
.section-title{{font-size:16px;font-weight:700;margin-bottom:10px;color:#0b3d91;}}
table{{width:100%;border-collapse:collapse;font-size:11px;}}
th{{background:#0b3d91;color:#fff;text-align:left;padding:8px;}}
td{{border:1px solid #bbb;padding:8px;vertical-align:top;}}
tr.even td{{background:#f7f7f7;}}
td.day{{font-weight:600;}}
td.pax{{text-align:center;}}
.free{{color:#777;font-style:italic;}}
.activity{{background:#eef4ff;border:1px solid #c5d8fb;border-radius:4px;padding:4px 6px;margin-bottom:4px;}}
.activity-name{{font-weight:600;}}
.activity-timing{{font-size:10px;color:#555;}}
.note{{margin-top:6px;font-size:10px;color:#444;text-align:left;}}
.footer{{padding:12px 28px;font-size:12px;color:#555;font-style:italic;text-align:center;}}
</style>
</head>
<body>
{content}
</body>
</html>"#
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActivityKey;
    use crate::itinerary::generate_itinerary;
    use crate::overlay::ScheduleOverlay;
    use serde_json::json;
    use uuid::Uuid;

    fn tour() -> TourRecord {
        TourRecord::from_json(
            Uuid::new_v4(),
            json!({
                "start_date": "2024-06-01",
                "invoice": "INV-204",
                "name": "Kim & Park (4)",
                "pax": 4,
                "language": "Korean",
                "group_id": "G-7",
                "arrival": "2024-06-01|10:00|KE71",
                "departure": "2024-06-03|15:00|KE72",
                "accommodation": "Explorer Hotel",
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_guest_title_strips_headcount() {
        assert_eq!(guest_title("Lee Group (3)"), "Lee Group");
        assert_eq!(guest_title("Lee Group (12)  "), "Lee Group");
        assert_eq!(guest_title("Lee (VIP)"), "Lee (VIP)");
        assert_eq!(guest_title("Lee"), "Lee");
    }

    #[test]
    fn test_page_has_header_table_and_footer() {
        let t = tour();
        let overlay = ScheduleOverlay::new()
            .add_activity(1, ActivityKey::DogSledging)
            .set_note(1, "bring <gloves>\nand hats");
        let html = render_print_html(&t, &generate_itinerary(&t, Some(&overlay)));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("WELCOME TO YOUR ARCTIC ADVENTURE"));
        assert!(html.contains(r#"<div class="guest-title">Kim &amp; Park</div>"#));
        assert!(html.contains("INV-204"));
        assert!(html.contains("Korean"));
        assert!(html.contains("G-7"));
        assert!(html.contains("Your Itinerary"));
        assert!(html.contains("Arrival Day"));
        assert!(html.contains("Dog Sledging"));
        assert!(html.contains("bring &lt;gloves&gt;<br>and hats"));
        assert!(html.contains("(Cold-weather gear will be collected)"));
        assert!(html.contains("Welcome to the Arctic!"));
        assert_eq!(html.matches("<tr class=").count(), 3);
    }

    #[test]
    fn test_days_without_activities_print_free_activity() {
        let t = tour();
        let html = render_print_html(&t, &generate_itinerary(&t, None));
        assert!(html.contains(r#"<div class="free">*Free activity</div>"#));
    }
}
