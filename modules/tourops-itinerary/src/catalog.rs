//! The fixed activity catalog: display names and bookable time slots.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tourops_common::{TourFlag, TourOpsError, TourRecord};

use crate::overlay::Activity;

/// An activity that can be placed on an itinerary day. Each key matches the
/// tour flag column of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKey {
    CityTour,
    Fishing,
    DogSledging,
    SnowmobileAtv,
    Hiking,
    AuroraVillage,
    Nlt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub timings: &'static [&'static str],
}

impl CatalogEntry {
    /// An activity instance holding only the given slot.
    pub fn with_timing(&self, slot: usize) -> Option<Activity> {
        self.timings.get(slot).map(|timing| Activity {
            name: self.name.to_string(),
            timings: vec![timing.to_string()],
        })
    }
}

impl ActivityKey {
    /// Catalog order. Enabled activities are always listed in this order.
    pub const ALL: [ActivityKey; 7] = [
        ActivityKey::CityTour,
        ActivityKey::Fishing,
        ActivityKey::DogSledging,
        ActivityKey::SnowmobileAtv,
        ActivityKey::Hiking,
        ActivityKey::AuroraVillage,
        ActivityKey::Nlt,
    ];

    pub fn entry(&self) -> &'static CatalogEntry {
        match self {
            ActivityKey::CityTour => &CatalogEntry {
                name: "City Tour",
                timings: &["10:00~10:15 AM - 12:00 PM", "3:00 PM - 4:30 PM"],
            },
            ActivityKey::Fishing => &CatalogEntry {
                name: "Ice Fishing",
                timings: &["10:30~10:50 AM - 1:45 PM", "9:30~9:50 AM - 12:45 PM"],
            },
            ActivityKey::DogSledging => &CatalogEntry {
                name: "Dog Sledging",
                timings: &["1:30~1:45 PM - 3:30 PM"],
            },
            ActivityKey::SnowmobileAtv => &CatalogEntry {
                name: "Snowmobile",
                timings: &["10:00~10:15 AM - 11:30 AM", "1:30~1:45 PM - 3:00 PM"],
            },
            ActivityKey::Hiking => &CatalogEntry {
                name: "Cameron Fall Hiking",
                timings: &["1:00~1:15 PM - 3:00 PM", "1:30~1:45 PM - 5:00 PM"],
            },
            ActivityKey::AuroraVillage => &CatalogEntry {
                name: "Ice Lake Tour",
                timings: &["11:00 AM - 12:00 PM", "2:00~2:15 PM - 3:30 PM"],
            },
            ActivityKey::Nlt => &CatalogEntry {
                name: "Aurora Viewing",
                timings: &["9:30~9:50 PM - 1:30 AM", "10:00~10:15 PM - 2:00 AM"],
            },
        }
    }

    pub fn flag(&self) -> TourFlag {
        match self {
            ActivityKey::CityTour => TourFlag::CityTour,
            ActivityKey::Fishing => TourFlag::Fishing,
            ActivityKey::DogSledging => TourFlag::DogSledging,
            ActivityKey::SnowmobileAtv => TourFlag::SnowmobileAtv,
            ActivityKey::Hiking => TourFlag::Hiking,
            ActivityKey::AuroraVillage => TourFlag::AuroraVillage,
            ActivityKey::Nlt => TourFlag::Nlt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.flag().as_str()
    }

    /// Find the catalog key whose display name is `name`.
    pub fn from_display_name(name: &str) -> Option<ActivityKey> {
        ActivityKey::ALL.into_iter().find(|k| k.entry().name == name)
    }
}

impl std::fmt::Display for ActivityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKey {
    type Err = TourOpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| TourOpsError::Validation(format!("unknown activity: {s}")))
    }
}

/// Activities whose flag is exactly `"Yes"` on this tour, in catalog order.
pub fn enabled_activities(tour: &TourRecord) -> Vec<ActivityKey> {
    ActivityKey::ALL
        .into_iter()
        .filter(|k| tour.flag_enabled(k.flag()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entry_has_a_slot() {
        for key in ActivityKey::ALL {
            assert!(!key.entry().timings.is_empty(), "{key} has no timings");
        }
    }

    #[test]
    fn test_key_round_trips_through_str() {
        for key in ActivityKey::ALL {
            assert_eq!(key.as_str().parse::<ActivityKey>().unwrap(), key);
        }
        assert!("snowshoe".parse::<ActivityKey>().is_err());
    }

    #[test]
    fn test_with_timing_picks_one_slot() {
        let hiking = ActivityKey::Hiking.entry();
        let placed = hiking.with_timing(1).unwrap();
        assert_eq!(placed.name, "Cameron Fall Hiking");
        assert_eq!(placed.timings, vec!["1:30~1:45 PM - 5:00 PM".to_string()]);
        assert!(hiking.with_timing(2).is_none());
    }

    #[test]
    fn test_from_display_name() {
        assert_eq!(
            ActivityKey::from_display_name("Ice Lake Tour"),
            Some(ActivityKey::AuroraVillage)
        );
        assert_eq!(ActivityKey::from_display_name("Snowshoe"), None);
    }
}
