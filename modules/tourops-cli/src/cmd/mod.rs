pub mod itinerary;
pub mod monthly;
pub mod plan;
pub mod tours;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use console::style;
use dialoguer::theme::ColorfulTheme;
use uuid::Uuid;

use tourops_cli::ApiClient;

/// Shared state for every command: the API client and output helpers.
pub struct Ctx {
    pub api: ApiClient,
    theme: ColorfulTheme,
}

impl Ctx {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            theme: ColorfulTheme::default(),
        }
    }

    pub fn theme(&self) -> &ColorfulTheme {
        &self.theme
    }

    pub fn print_header(&self, text: &str) {
        println!("{}", style(text).bold().cyan());
    }

    pub fn print_info(&self, text: &str) {
        println!("{}", style(text).dim());
    }

    pub fn print_success(&self, text: &str) {
        println!("{}", style(text).green());
    }

    pub fn print_warning(&self, text: &str) {
        println!("{}", style(text).yellow());
    }
}

pub fn parse_date(label: &str, raw: Option<String>) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("{label} must be a YYYY-MM-DD date, got {s:?}"))
    })
    .transpose()
}

pub fn parse_tour_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).with_context(|| format!("not a tour id: {raw:?}"))
}
