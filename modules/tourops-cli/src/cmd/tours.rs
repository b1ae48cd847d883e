use anyhow::Result;
use console::style;
use tourops_cli::render::tour_label;
use tourops_common::TourQuery;

use super::{parse_date, Ctx};

pub async fn run(
    ctx: &Ctx,
    from: Option<String>,
    to: Option<String>,
    invoice: Option<String>,
    name: Option<String>,
) -> Result<()> {
    let query = TourQuery {
        date_from: parse_date("--from", from)?,
        date_to: parse_date("--to", to)?,
        invoice,
        name,
    };

    let tours = ctx.api.search_tours(&query).await?;
    ctx.print_header(&format!("{} tour(s)", tours.len()));
    for tour in &tours {
        println!("{}  {}", tour_label(tour), style(tour.id).dim());
    }
    Ok(())
}
