//! Itinerary derivation and schedule persistence.
//!
//! A tour's raw arrival/departure fields are parsed, expanded into one row per
//! day of the stay, and merged with a per-tour schedule overlay holding the
//! activities and notes staff assigned to each day. When a tour has no saved
//! overlay, one is seeded at random from the tour's enabled activities.

pub mod assigner;
pub mod catalog;
pub mod datetime;
pub mod itinerary;
pub mod monthly;
pub mod overlay;
pub mod print;
pub mod session;
pub mod store;

pub use assigner::generate_random_schedule;
pub use catalog::{enabled_activities, ActivityKey, CatalogEntry};
pub use datetime::{parse_date_time, DateTimeDescriptor};
pub use itinerary::{day_count, day_label, generate_itinerary, tour_day_count, DayKind, ItineraryDay};
pub use monthly::{aggregate_monthly, month_of, month_range, AgentCount, DailyActivityCount, MonthlyPlan};
pub use overlay::{Activity, DaySchedule, ScheduleOverlay};
pub use print::render_print_html;
pub use session::{EditMode, EditSession};
pub use store::{MemoryScheduleRepository, OverlayCache, ScheduleRepository, ScheduleStore};
