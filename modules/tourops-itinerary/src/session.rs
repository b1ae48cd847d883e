//! Edit-mode gate around a selected tour's schedule.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tourops_common::{TourOpsError, TourRecord};
use tracing::info;

use crate::catalog::ActivityKey;
use crate::itinerary::{generate_itinerary, tour_day_count, ItineraryDay};
use crate::overlay::{Activity, ScheduleOverlay};
use crate::store::{ScheduleRepository, ScheduleStore};

/// `Locked -> request_edit -> ConfirmPending -> confirm_edit -> Editable -> done_editing -> Locked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    Locked,
    ConfirmPending,
    Editable,
}

/// One operator's view of a single selected tour. Schedule edits go through
/// the shared store's cache and are only allowed while `Editable`.
///
/// The session also keeps its own last known overlay, so an entry evicted
/// from the shared cache by someone else is restored from it rather than
/// started over empty.
pub struct EditSession<R: ScheduleRepository> {
    store: Arc<ScheduleStore<R>>,
    tour: Option<TourRecord>,
    day_count: usize,
    mode: EditMode,
    working: Option<ScheduleOverlay>,
}

impl<R: ScheduleRepository> EditSession<R> {
    pub fn new(store: Arc<ScheduleStore<R>>) -> Self {
        Self {
            store,
            tour: None,
            day_count: 0,
            mode: EditMode::Locked,
            working: None,
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn tour(&self) -> Option<&TourRecord> {
        self.tour.as_ref()
    }

    pub fn day_count(&self) -> usize {
        self.day_count
    }

    /// Switch to a tour. The previous tour's working copy is dropped and the
    /// session is locked again.
    pub async fn select(&mut self, tour: TourRecord) -> Vec<ItineraryDay> {
        self.deselect();
        self.day_count = tour_day_count(&tour).unwrap_or(0);
        if self.day_count > 0 {
            self.working = Some(self.store.ensure(&tour, self.day_count).await);
        }
        self.tour = Some(tour);
        self.itinerary()
    }

    pub fn deselect(&mut self) {
        if let Some(previous) = self.tour.take() {
            self.store.evict(previous.id);
        }
        self.day_count = 0;
        self.mode = EditMode::Locked;
        self.working = None;
    }

    /// The selected tour's itinerary with its working overlay applied.
    pub fn itinerary(&self) -> Vec<ItineraryDay> {
        match &self.tour {
            Some(tour) => generate_itinerary(tour, self.overlay().as_ref()),
            None => Vec::new(),
        }
    }

    /// The shared working copy, or this session's last known one when the
    /// cache no longer holds the tour.
    pub fn overlay(&self) -> Option<ScheduleOverlay> {
        let tour = self.tour.as_ref()?;
        self.store
            .cache()
            .get(tour.id)
            .or_else(|| self.working.clone())
    }

    /// Ask to unlock the schedule. Editing starts after `confirm_edit`.
    pub fn request_edit(&mut self) -> Result<(), TourOpsError> {
        if self.tour.is_none() || self.day_count == 0 {
            return Err(TourOpsError::Validation("no tour with a schedule is selected".into()));
        }
        if self.mode == EditMode::Locked {
            self.mode = EditMode::ConfirmPending;
        }
        Ok(())
    }

    pub fn confirm_edit(&mut self) {
        if self.mode == EditMode::ConfirmPending {
            self.mode = EditMode::Editable;
            info!(tour_id = ?self.tour.as_ref().map(|t| t.id), "Schedule unlocked for editing");
        }
    }

    pub fn cancel_edit(&mut self) {
        if self.mode == EditMode::ConfirmPending {
            self.mode = EditMode::Locked;
        }
    }

    pub fn done_editing(&mut self) {
        self.mode = EditMode::Locked;
    }

    pub fn set_activity(
        &mut self,
        day_index: usize,
        activity_index: usize,
        activity: Option<Activity>,
    ) -> Result<(), TourOpsError> {
        self.edit(|o| o.set_activity(day_index, activity_index, activity))
    }

    pub fn add_activity(&mut self, day_index: usize, key: ActivityKey) -> Result<(), TourOpsError> {
        self.edit(|o| o.add_activity(day_index, key))
    }

    pub fn set_note(&mut self, day_index: usize, text: &str) -> Result<(), TourOpsError> {
        self.edit(|o| o.set_note(day_index, text))
    }

    /// Save the working overlay. Allowed in any mode; a failure leaves the
    /// working copy intact so the save can be retried.
    pub async fn save(&mut self) -> Result<(), TourOpsError> {
        let tour_id = self
            .tour
            .as_ref()
            .map(|t| t.id)
            .ok_or_else(|| TourOpsError::Validation("no tour selected".into()))?;
        let overlay = self
            .overlay()
            .ok_or_else(|| TourOpsError::Validation("tour has no schedule".into()))?;
        self.store.save(tour_id, &overlay).await?;
        self.working = Some(overlay);
        Ok(())
    }

    fn edit(
        &mut self,
        change: impl FnOnce(&ScheduleOverlay) -> ScheduleOverlay,
    ) -> Result<(), TourOpsError> {
        if self.mode != EditMode::Editable {
            return Err(TourOpsError::ScheduleLocked);
        }
        let tour_id = self
            .tour
            .as_ref()
            .map(|t| t.id)
            .ok_or_else(|| TourOpsError::Validation("no tour selected".into()))?;

        let current = self
            .overlay()
            .ok_or_else(|| TourOpsError::Validation("tour has no schedule".into()))?;
        let next = change(&current);
        self.store.update(tour_id, next.clone());
        self.working = Some(next);
        Ok(())
    }
}
