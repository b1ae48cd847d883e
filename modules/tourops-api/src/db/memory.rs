//! In-memory repositories. Used when no database is configured and in tests.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tourops_common::{StaffMember, TourQuery, TourRecord};
use uuid::Uuid;

use super::{StaffRepository, TourRepository};

// ---------------------------------------------------------------------------
// MemoryTourRepository
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryTourRepository {
    tours: Mutex<Vec<TourRecord>>,
}

impl MemoryTourRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository holding one demo booking, so a fresh instance has
    /// something to show.
    pub fn with_demo_tour() -> Self {
        let repo = Self::new();
        repo.tours.lock().unwrap().push(demo_tour());
        repo
    }
}

fn demo_tour() -> TourRecord {
    let start = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap_or_default();
    TourRecord {
        id: Uuid::new_v4(),
        start_date: start,
        invoice: "INV-001".into(),
        language: "English".into(),
        name: "John Smith (2)".into(),
        pax: 2,
        group_id: "GRP-001".into(),
        dnr: "No".into(),
        td: String::new(),
        agent: "Direct".into(),
        arrival: "2024-12-20|14:30|AC123".into(),
        departure: "2024-12-24|11:00|AC456".into(),
        accommodation: "Explorer Hotel".into(),
        gears: "Yes".into(),
        snowshoe: "No".into(),
        nlt: "Yes".into(),
        city_tour: "Yes".into(),
        hiking: "No".into(),
        fishing: "Yes".into(),
        dog_sledging: "Yes".into(),
        snowmobile_atv: "No".into(),
        aurora_village: "Yes".into(),
        payment: "Paid".into(),
        reservation_number: "RES-001".into(),
        remarks: String::new(),
    }
}

#[async_trait]
impl TourRepository for MemoryTourRepository {
    async fn search(&self, query: &TourQuery) -> Result<Vec<TourRecord>> {
        let mut found: Vec<TourRecord> = self
            .tours
            .lock()
            .unwrap()
            .iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        found.sort_by_key(|t| t.start_date);
        Ok(found)
    }

    async fn get(&self, id: Uuid) -> Result<Option<TourRecord>> {
        Ok(self.tours.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, tour: &TourRecord) -> Result<()> {
        let mut tours = self.tours.lock().unwrap();
        if tours.iter().any(|t| t.id == tour.id) {
            anyhow::bail!("tour {} already exists", tour.id);
        }
        tours.push(tour.clone());
        Ok(())
    }

    async fn update(&self, tour: &TourRecord) -> Result<bool> {
        let mut tours = self.tours.lock().unwrap();
        match tours.iter_mut().find(|t| t.id == tour.id) {
            Some(existing) => {
                *existing = tour.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tours = self.tours.lock().unwrap();
        let before = tours.len();
        tours.retain(|t| t.id != id);
        Ok(tours.len() != before)
    }
}

// ---------------------------------------------------------------------------
// MemoryStaffRepository
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStaffRepository {
    staff: Mutex<Vec<StaffMember>>,
}

impl MemoryStaffRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StaffRepository for MemoryStaffRepository {
    async fn list(&self) -> Result<Vec<StaffMember>> {
        let mut staff = self.staff.lock().unwrap().clone();
        staff.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(staff)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StaffMember>> {
        Ok(self.staff.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn create(&self, member: &StaffMember) -> Result<()> {
        let mut staff = self.staff.lock().unwrap();
        if staff.iter().any(|s| s.email.eq_ignore_ascii_case(&member.email)) {
            anyhow::bail!("staff email {} is already registered", member.email);
        }
        staff.push(member.clone());
        Ok(())
    }

    async fn update(&self, member: &StaffMember) -> Result<bool> {
        let mut staff = self.staff.lock().unwrap();
        match staff.iter_mut().find(|s| s.id == member.id) {
            Some(existing) => {
                *existing = member.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut staff = self.staff.lock().unwrap();
        let before = staff.len();
        staff.retain(|s| s.id != id);
        Ok(staff.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_tour_is_searchable() {
        let repo = MemoryTourRepository::with_demo_tour();
        let found = repo
            .search(&TourQuery {
                name: Some("smith".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].invoice, "INV-001");
    }

    #[tokio::test]
    async fn test_search_orders_by_start_date() {
        let repo = MemoryTourRepository::new();
        for (day, invoice) in [(9, "B"), (3, "A"), (20, "C")] {
            let mut tour = demo_tour();
            tour.start_date = NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
            tour.invoice = invoice.into();
            repo.create(&tour).await.unwrap();
        }
        let invoices: Vec<String> = repo
            .search(&TourQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.invoice)
            .collect();
        assert_eq!(invoices, ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_report_missing_rows() {
        let repo = MemoryTourRepository::new();
        let tour = demo_tour();
        assert!(!repo.update(&tour).await.unwrap());
        repo.create(&tour).await.unwrap();
        assert!(repo.update(&tour).await.unwrap());
        assert!(repo.delete(tour.id).await.unwrap());
        assert!(!repo.delete(tour.id).await.unwrap());
    }
}
