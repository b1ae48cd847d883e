//! The per-tour schedule overlay: staff-assigned activities and notes per day.
//!
//! Every edit returns a new overlay. Days live behind `Arc` so an edit copies
//! only the day it touches; the other days stay shared with the previous value.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::ActivityKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(default)]
    pub timings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub note: String,
}

/// Day index to schedule. Serialized as a JSON object keyed by the decimal
/// day index, which is also the body of the schedule save endpoint.
///
/// Indices are not checked against the tour's current day count. If a tour's
/// dates change after a save, entries past the new range stay in the overlay
/// and the itinerary simply never reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleOverlay {
    days: BTreeMap<usize, Arc<DaySchedule>>,
}

impl ScheduleOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// An overlay with an empty entry for every day in `[0, day_count)`.
    pub fn with_days(day_count: usize) -> Self {
        let empty = Arc::new(DaySchedule::default());
        Self {
            days: (0..day_count).map(|i| (i, empty.clone())).collect(),
        }
    }

    pub fn day(&self, day_index: usize) -> Option<&DaySchedule> {
        self.days.get(&day_index).map(Arc::as_ref)
    }

    pub fn activities(&self, day_index: usize) -> &[Activity] {
        self.day(day_index)
            .map(|d| d.activities.as_slice())
            .unwrap_or(&[])
    }

    pub fn note(&self, day_index: usize) -> &str {
        self.day(day_index).map(|d| d.note.as_str()).unwrap_or("")
    }

    pub fn day_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.days.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Whether both overlays hold the very same allocation for this day.
    pub fn shares_day(&self, other: &ScheduleOverlay, day_index: usize) -> bool {
        match (self.days.get(&day_index), other.days.get(&day_index)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Replace the activity at `activity_index`, or append it when the index
    /// is past the end. With `None`, remove the activity at that index
    /// (out of range removals change nothing).
    pub fn set_activity(
        &self,
        day_index: usize,
        activity_index: usize,
        activity: Option<Activity>,
    ) -> ScheduleOverlay {
        self.update_day(day_index, |day| match activity {
            Some(activity) => match day.activities.get_mut(activity_index) {
                Some(slot) => *slot = activity,
                None => day.activities.push(activity),
            },
            None => {
                if activity_index < day.activities.len() {
                    day.activities.remove(activity_index);
                }
            }
        })
    }

    /// Append the catalog activity for `key` with its first time slot.
    pub fn add_activity(&self, day_index: usize, key: ActivityKey) -> ScheduleOverlay {
        match key.entry().with_timing(0) {
            Some(activity) => self.update_day(day_index, |day| day.activities.push(activity)),
            None => self.clone(),
        }
    }

    /// Replace the note for a day. An empty string clears it.
    pub fn set_note(&self, day_index: usize, text: &str) -> ScheduleOverlay {
        self.update_day(day_index, |day| day.note = text.to_string())
    }

    fn update_day(
        &self,
        day_index: usize,
        edit: impl FnOnce(&mut DaySchedule),
    ) -> ScheduleOverlay {
        let mut next = self.clone();
        let day = next.days.entry(day_index).or_default();
        edit(Arc::make_mut(day));
        next
    }
}

impl FromIterator<(usize, DaySchedule)> for ScheduleOverlay {
    fn from_iter<I: IntoIterator<Item = (usize, DaySchedule)>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().map(|(i, d)| (i, Arc::new(d))).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(name: &str, timing: &str) -> Activity {
        Activity {
            name: name.into(),
            timings: vec![timing.into()],
        }
    }

    fn sample() -> ScheduleOverlay {
        ScheduleOverlay::from_iter([
            (0, DaySchedule::default()),
            (
                1,
                DaySchedule {
                    activities: vec![activity("City Tour", "3:00 PM - 4:30 PM")],
                    note: "pick up at lobby".into(),
                },
            ),
            (
                2,
                DaySchedule {
                    activities: vec![
                        activity("Ice Fishing", "10:30~10:50 AM - 1:45 PM"),
                        activity("Aurora Viewing", "9:30~9:50 PM - 1:30 AM"),
                    ],
                    note: String::new(),
                },
            ),
            (3, DaySchedule::default()),
        ])
    }

    #[test]
    fn test_remove_activity_leaves_other_days_untouched() {
        let before = sample();
        let after = before.set_activity(2, 0, None);

        assert_eq!(after.activities(2).len(), 1);
        assert_eq!(after.activities(2)[0].name, "Aurora Viewing");
        assert_eq!(after.day(1), before.day(1));
        assert_eq!(after.day(3), before.day(3));
        // The original value is unchanged.
        assert_eq!(before.activities(2).len(), 2);
    }

    #[test]
    fn test_edits_copy_only_the_touched_day() {
        let before = sample();
        let after = before.set_note(2, "bring gloves");
        assert!(after.shares_day(&before, 1));
        assert!(!after.shares_day(&before, 2));
        assert_eq!(before.note(2), "");
        assert_eq!(after.note(2), "bring gloves");
    }

    #[test]
    fn test_set_activity_replaces_in_bounds() {
        let after = sample().set_activity(1, 0, Some(activity("Snowmobile", "x")));
        assert_eq!(after.activities(1), &[activity("Snowmobile", "x")]);
    }

    #[test]
    fn test_set_activity_appends_out_of_bounds() {
        let after = sample().set_activity(1, 7, Some(activity("Snowmobile", "x")));
        assert_eq!(after.activities(1).len(), 2);
        assert_eq!(after.activities(1)[1].name, "Snowmobile");
    }

    #[test]
    fn test_remove_out_of_range_is_a_no_op() {
        let before = sample();
        assert_eq!(before.set_activity(1, 5, None), before);
    }

    #[test]
    fn test_edit_creates_missing_day() {
        let after = ScheduleOverlay::new().set_note(4, "late checkout");
        assert_eq!(after.note(4), "late checkout");
        assert!(after.activities(4).is_empty());
    }

    #[test]
    fn test_add_activity_uses_first_slot() {
        let after = sample().add_activity(3, ActivityKey::DogSledging);
        assert_eq!(
            after.activities(3),
            &[activity("Dog Sledging", "1:30~1:45 PM - 3:30 PM")]
        );
    }

    #[test]
    fn test_set_note_empty_clears() {
        let after = sample().set_note(1, "");
        assert_eq!(after.note(1), "");
        assert_eq!(after.activities(1).len(), 1);
    }

    #[test]
    fn test_json_shape_is_keyed_by_day_index() {
        let overlay = ScheduleOverlay::new().set_note(1, "hi");
        let json = serde_json::to_value(&overlay).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "1": { "activities": [], "note": "hi" } })
        );

        let parsed: ScheduleOverlay = serde_json::from_value(serde_json::json!({
            "0": { "activities": [] },
            "2": { "activities": [{ "name": "City Tour", "timings": ["3:00 PM - 4:30 PM"] }], "note": "" }
        }))
        .unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.activities(2)[0].name, "City Tour");
    }
}
