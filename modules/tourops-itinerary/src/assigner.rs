//! Seeds a schedule for tours that have never had one saved.

use rand::seq::SliceRandom;
use rand::Rng;
use tourops_common::TourRecord;

use crate::catalog::enabled_activities;
use crate::overlay::{DaySchedule, ScheduleOverlay};

/// Build a starting overlay for a tour with no saved schedule.
///
/// Every day in `[0, day_count)` gets an entry. Arrival and departure days
/// stay empty; each day in between receives one or two of the tour's enabled
/// activities (coin flip), drawn without repeats and each with one random
/// time slot. The result is not persisted by this function.
pub fn generate_random_schedule<R: Rng + ?Sized>(
    tour: &TourRecord,
    day_count: usize,
    rng: &mut R,
) -> ScheduleOverlay {
    let available = enabled_activities(tour);

    (0..day_count)
        .map(|index| {
            let is_middle = index > 0 && index + 1 < day_count;
            if !is_middle {
                return (index, DaySchedule::default());
            }

            let wanted = if rng.gen_bool(0.5) { 1 } else { 2 };
            let mut shuffled = available.clone();
            shuffled.shuffle(rng);

            let activities = shuffled
                .into_iter()
                .take(wanted)
                .filter_map(|key| {
                    let entry = key.entry();
                    let slot = rng.gen_range(0..entry.timings.len());
                    entry.with_timing(slot)
                })
                .collect();

            (
                index,
                DaySchedule {
                    activities,
                    note: String::new(),
                },
            )
        })
        .collect()
}
