//! Storage seams for tours and staff. Schedules use `ScheduleRepository`
//! from the itinerary crate.

pub mod memory;
pub mod models;

use anyhow::Result;
use async_trait::async_trait;
use tourops_common::{StaffMember, TourQuery, TourRecord};
use uuid::Uuid;

pub use memory::{MemoryStaffRepository, MemoryTourRepository};
pub use models::schedule::PgScheduleRepository;
pub use models::staff::PgStaffRepository;
pub use models::tour::PgTourRepository;

#[async_trait]
pub trait TourRepository: Send + Sync {
    /// Tours matching the query, ordered by `start_date`.
    async fn search(&self, query: &TourQuery) -> Result<Vec<TourRecord>>;

    async fn get(&self, id: Uuid) -> Result<Option<TourRecord>>;

    async fn create(&self, tour: &TourRecord) -> Result<()>;

    /// Overwrite a stored tour. Returns false when no tour has that id.
    async fn update(&self, tour: &TourRecord) -> Result<bool>;

    /// Returns false when no tour has that id.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait StaffRepository: Send + Sync {
    /// All staff, newest first.
    async fn list(&self) -> Result<Vec<StaffMember>>;

    async fn get(&self, id: Uuid) -> Result<Option<StaffMember>>;

    async fn create(&self, staff: &StaffMember) -> Result<()>;

    async fn update(&self, staff: &StaffMember) -> Result<bool>;

    async fn delete(&self, id: Uuid) -> Result<bool>;
}
