use std::path::PathBuf;

use anyhow::{Context, Result};
use tourops_cli::render::print_itinerary;

use super::{parse_tour_id, Ctx};

pub async fn run(ctx: &Ctx, id: &str, html: Option<PathBuf>) -> Result<()> {
    let id = parse_tour_id(id)?;
    let tour = ctx
        .api
        .get_tour(id)
        .await?
        .with_context(|| format!("tour {id} not found"))?;

    if let Some(path) = html {
        let page = ctx.api.itinerary_html(id).await?;
        std::fs::write(&path, page)
            .with_context(|| format!("failed to write {}", path.display()))?;
        ctx.print_success(&format!("Wrote {}", path.display()));
        return Ok(());
    }

    let itinerary = ctx.api.itinerary(id).await?;
    print_itinerary(&tour, &itinerary.days);
    Ok(())
}
