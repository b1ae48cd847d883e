use anyhow::Result;
use tourops_cli::render::monthly_lines;
use tourops_cli::MonthSelector;

use super::{parse_date, Ctx};

pub async fn run(
    ctx: &Ctx,
    month: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    let selector = match (month, parse_date("--from", from)?, parse_date("--to", to)?) {
        (Some(month), _, _) => MonthSelector::Month(month),
        (None, Some(from), Some(to)) => MonthSelector::Range(from, to),
        _ => MonthSelector::Current,
    };

    let plan = ctx.api.monthly_plan(selector).await?;
    ctx.print_header(&format!("Monthly plan {} to {}", plan.from, plan.to));
    for line in monthly_lines(&plan) {
        println!("{line}");
    }
    Ok(())
}
