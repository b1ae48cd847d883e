//! Schedule persistence seam, the in-memory overlay cache, and the store that
//! decides between a cached, saved, or freshly seeded overlay.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tourops_common::{TourOpsError, TourRecord};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assigner::generate_random_schedule;
use crate::itinerary::{generate_itinerary, tour_day_count, ItineraryDay};
use crate::overlay::ScheduleOverlay;

// ---------------------------------------------------------------------------
// Persistence trait
// ---------------------------------------------------------------------------

/// Loads and saves one schedule overlay per tour.
///
/// Implemented by the Postgres store in the API, the HTTP client in the CLI,
/// and `MemoryScheduleRepository` for tests and demo mode.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// The saved overlay, or `None` when the tour has never been saved.
    async fn load(&self, tour_id: Uuid) -> Result<Option<ScheduleOverlay>>;

    /// Replace the tour's overlay in a single write.
    async fn save(&self, tour_id: Uuid, overlay: &ScheduleOverlay) -> Result<()>;

    /// Drop the tour's overlay. Stores that delete schedules together with
    /// their tour keep the default.
    async fn delete(&self, _tour_id: Uuid) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<P: ScheduleRepository + ?Sized> ScheduleRepository for Arc<P> {
    async fn load(&self, tour_id: Uuid) -> Result<Option<ScheduleOverlay>> {
        (**self).load(tour_id).await
    }

    async fn save(&self, tour_id: Uuid, overlay: &ScheduleOverlay) -> Result<()> {
        (**self).save(tour_id, overlay).await
    }

    async fn delete(&self, tour_id: Uuid) -> Result<()> {
        (**self).delete(tour_id).await
    }
}

// ---------------------------------------------------------------------------
// MemoryScheduleRepository
// ---------------------------------------------------------------------------

/// In-memory schedule storage. Thread-safe. Can be told to fail reads or
/// writes so callers' error paths can be exercised.
#[derive(Default)]
pub struct MemoryScheduleRepository {
    schedules: Mutex<HashMap<Uuid, ScheduleOverlay>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn saved_count(&self) -> usize {
        self.schedules.lock().unwrap().len()
    }
}

#[async_trait]
impl ScheduleRepository for MemoryScheduleRepository {
    async fn load(&self, tour_id: Uuid) -> Result<Option<ScheduleOverlay>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("schedule storage is unavailable");
        }
        Ok(self.schedules.lock().unwrap().get(&tour_id).cloned())
    }

    async fn save(&self, tour_id: Uuid, overlay: &ScheduleOverlay) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("schedule storage is unavailable");
        }
        self.schedules
            .lock()
            .unwrap()
            .insert(tour_id, overlay.clone());
        Ok(())
    }

    async fn delete(&self, tour_id: Uuid) -> Result<()> {
        self.schedules.lock().unwrap().remove(&tour_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// OverlayCache
// ---------------------------------------------------------------------------

/// Working copies of overlays, keyed by tour. Entries are evicted when a tour
/// is deselected, edited, or deleted.
#[derive(Default)]
pub struct OverlayCache {
    entries: Mutex<HashMap<Uuid, ScheduleOverlay>>,
}

impl OverlayCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tour_id: Uuid) -> Option<ScheduleOverlay> {
        self.entries.lock().unwrap().get(&tour_id).cloned()
    }

    pub fn set(&self, tour_id: Uuid, overlay: ScheduleOverlay) {
        self.entries.lock().unwrap().insert(tour_id, overlay);
    }

    /// Insert `overlay` unless the tour already has an entry; returns the
    /// entry that ends up cached.
    pub fn get_or_insert(&self, tour_id: Uuid, overlay: ScheduleOverlay) -> ScheduleOverlay {
        self.entries
            .lock()
            .unwrap()
            .entry(tour_id)
            .or_insert(overlay)
            .clone()
    }

    pub fn evict(&self, tour_id: Uuid) -> Option<ScheduleOverlay> {
        self.entries.lock().unwrap().remove(&tour_id)
    }

    pub fn contains(&self, tour_id: Uuid) -> bool {
        self.entries.lock().unwrap().contains_key(&tour_id)
    }
}

// ---------------------------------------------------------------------------
// ScheduleStore
// ---------------------------------------------------------------------------

/// Owns the overlay cache and mediates between generated defaults and saved
/// schedules.
pub struct ScheduleStore<R: ScheduleRepository> {
    repo: R,
    cache: OverlayCache,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl<R: ScheduleRepository> ScheduleStore<R> {
    /// A store seeding new schedules from OS entropy.
    pub fn new(repo: R) -> Self {
        Self::with_rng(repo, StdRng::from_entropy())
    }

    /// A store seeding new schedules from the given generator.
    pub fn with_rng(repo: R, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            repo,
            cache: OverlayCache::new(),
            rng: Mutex::new(Box::new(rng)),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn cache(&self) -> &OverlayCache {
        &self.cache
    }

    /// The saved overlay for a tour, bypassing the cache.
    pub async fn load(&self, tour_id: Uuid) -> Result<Option<ScheduleOverlay>> {
        self.repo.load(tour_id).await
    }

    /// The working overlay for a tour.
    ///
    /// A cached overlay is returned as-is. Otherwise the saved overlay is
    /// loaded, or, when there is none (or loading fails), a random one is
    /// seeded. Either way the result is cached, so seeding happens at most once
    /// until the tour is evicted. Seeded overlays are not saved.
    ///
    /// A working copy cached while the load was in flight wins over the
    /// loaded or seeded one.
    pub async fn ensure(&self, tour: &TourRecord, day_count: usize) -> ScheduleOverlay {
        if let Some(cached) = self.cache.get(tour.id) {
            return cached;
        }

        let overlay = self.load_or_seed(tour, day_count).await;
        self.cache.get_or_insert(tour.id, overlay)
    }

    /// Like `itinerary`, but leaves no new cache entry behind. An existing
    /// working copy is still used.
    pub async fn preview(&self, tour: &TourRecord) -> Vec<ItineraryDay> {
        let Some(day_count) = tour_day_count(tour) else {
            return Vec::new();
        };
        let overlay = match self.cache.get(tour.id) {
            Some(cached) => cached,
            None => self.load_or_seed(tour, day_count).await,
        };
        generate_itinerary(tour, Some(&overlay))
    }

    async fn load_or_seed(&self, tour: &TourRecord, day_count: usize) -> ScheduleOverlay {
        match self.repo.load(tour.id).await {
            Ok(Some(saved)) => {
                debug!(tour_id = %tour.id, "Loaded saved schedule");
                saved
            }
            Ok(None) => self.seed(tour, day_count),
            Err(e) => {
                warn!(tour_id = %tour.id, error = %e, "Failed to load schedule, seeding a new one");
                self.seed(tour, day_count)
            }
        }
    }

    /// The tour's itinerary merged with its working overlay. Tours without
    /// usable dates get an empty itinerary and no overlay is created.
    pub async fn itinerary(&self, tour: &TourRecord) -> Vec<ItineraryDay> {
        let Some(day_count) = tour_day_count(tour) else {
            return Vec::new();
        };
        let overlay = self.ensure(tour, day_count).await;
        generate_itinerary(tour, Some(&overlay))
    }

    /// Replace the working overlay without saving it.
    pub fn update(&self, tour_id: Uuid, overlay: ScheduleOverlay) {
        self.cache.set(tour_id, overlay);
    }

    /// Persist the overlay in one write. On success it also becomes the
    /// working copy; on failure nothing in memory changes and the error is
    /// retryable.
    pub async fn save(&self, tour_id: Uuid, overlay: &ScheduleOverlay) -> Result<(), TourOpsError> {
        self.repo.save(tour_id, overlay).await.map_err(|e| {
            warn!(tour_id = %tour_id, error = %e, "Failed to save schedule");
            TourOpsError::Persistence(e.to_string())
        })?;

        self.cache.set(tour_id, overlay.clone());
        info!(tour_id = %tour_id, days = overlay.len(), "Schedule saved");
        Ok(())
    }

    pub fn evict(&self, tour_id: Uuid) {
        if self.cache.evict(tour_id).is_some() {
            debug!(tour_id = %tour_id, "Evicted cached schedule");
        }
    }

    /// Forget a deleted tour's schedule, cached and saved.
    pub async fn delete(&self, tour_id: Uuid) -> Result<()> {
        self.evict(tour_id);
        self.repo.delete(tour_id).await
    }

    fn seed(&self, tour: &TourRecord, day_count: usize) -> ScheduleOverlay {
        debug!(tour_id = %tour.id, day_count, "No saved schedule, seeding one");
        let mut rng = self.rng.lock().unwrap();
        generate_random_schedule(tour, day_count, &mut **rng)
    }
}
