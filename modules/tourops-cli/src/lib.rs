//! Operator tooling for the tour operations API.

pub mod client;
pub mod render;

pub use client::{ApiClient, HttpScheduleRepository, MonthSelector};
