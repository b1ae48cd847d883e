use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::TourOpsError;

// --- Tours ---

/// A guest group booking as stored by the tour store.
///
/// Activity flags and most descriptive fields are free text; a flag is on when
/// it holds the literal `"Yes"`. `arrival` and `departure` use the compound
/// `date | time | flight` encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourRecord {
    pub id: Uuid,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub invoice: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pax: i32,
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub dnr: String,
    #[serde(default)]
    pub td: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub arrival: String,
    #[serde(default)]
    pub departure: String,
    #[serde(default)]
    pub accommodation: String,
    #[serde(default)]
    pub gears: String,
    #[serde(default)]
    pub snowshoe: String,
    #[serde(default)]
    pub nlt: String,
    #[serde(default)]
    pub city_tour: String,
    #[serde(default)]
    pub hiking: String,
    #[serde(default)]
    pub fishing: String,
    #[serde(default)]
    pub dog_sledging: String,
    #[serde(default)]
    pub snowmobile_atv: String,
    #[serde(default)]
    pub aurora_village: String,
    #[serde(default)]
    pub payment: String,
    #[serde(default)]
    pub reservation_number: String,
    #[serde(default)]
    pub remarks: String,
}

impl TourRecord {
    /// Build a record from a JSON request body, assigning `id`.
    /// Missing text fields default to empty; `start_date` is required.
    pub fn from_json(id: Uuid, body: Value) -> Result<Self, TourOpsError> {
        let Value::Object(mut fields) = body else {
            return Err(TourOpsError::Validation("tour body must be a JSON object".into()));
        };
        fields.retain(|_, v| !v.is_null());
        fields.insert("id".into(), Value::String(id.to_string()));
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| TourOpsError::Validation(format!("invalid tour: {e}")))
    }

    /// Apply a partial update. Keys present in `patch` overwrite the stored
    /// values, `null` resets a field to its default and `id` is never changed.
    pub fn merge_patch(&self, patch: &Value) -> Result<Self, TourOpsError> {
        let updates = patch
            .as_object()
            .ok_or_else(|| TourOpsError::Validation("tour update must be a JSON object".into()))?;

        let mut current = serde_json::to_value(self).map_err(anyhow::Error::from)?;
        if let Some(fields) = current.as_object_mut() {
            for (key, value) in updates {
                if key == "id" {
                    continue;
                }
                if value.is_null() {
                    fields.remove(key);
                } else {
                    fields.insert(key.clone(), value.clone());
                }
            }
        }

        let mut merged: TourRecord = serde_json::from_value(current)
            .map_err(|e| TourOpsError::Validation(format!("invalid tour update: {e}")))?;
        merged.id = self.id;
        Ok(merged)
    }

    pub fn flag(&self, flag: TourFlag) -> &str {
        match flag {
            TourFlag::CityTour => &self.city_tour,
            TourFlag::Fishing => &self.fishing,
            TourFlag::DogSledging => &self.dog_sledging,
            TourFlag::SnowmobileAtv => &self.snowmobile_atv,
            TourFlag::Hiking => &self.hiking,
            TourFlag::AuroraVillage => &self.aurora_village,
            TourFlag::Nlt => &self.nlt,
            TourFlag::Snowshoe => &self.snowshoe,
            TourFlag::Dnr => &self.dnr,
        }
    }

    /// Exact, case-sensitive `"Yes"`. Used when seeding schedules.
    pub fn flag_enabled(&self, flag: TourFlag) -> bool {
        self.flag(flag) == "Yes"
    }

    /// Trimmed, case-insensitive `yes`. Used by the monthly activity counts.
    pub fn flag_counted(&self, flag: TourFlag) -> bool {
        self.flag(flag).trim().eq_ignore_ascii_case("yes")
    }
}

/// The Yes/No columns of a tour record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourFlag {
    CityTour,
    Fishing,
    DogSledging,
    SnowmobileAtv,
    Hiking,
    AuroraVillage,
    Nlt,
    Snowshoe,
    Dnr,
}

impl TourFlag {
    pub const ALL: [TourFlag; 9] = [
        TourFlag::CityTour,
        TourFlag::Fishing,
        TourFlag::DogSledging,
        TourFlag::SnowmobileAtv,
        TourFlag::Hiking,
        TourFlag::AuroraVillage,
        TourFlag::Nlt,
        TourFlag::Snowshoe,
        TourFlag::Dnr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TourFlag::CityTour => "city_tour",
            TourFlag::Fishing => "fishing",
            TourFlag::DogSledging => "dog_sledging",
            TourFlag::SnowmobileAtv => "snowmobile_atv",
            TourFlag::Hiking => "hiking",
            TourFlag::AuroraVillage => "aurora_village",
            TourFlag::Nlt => "nlt",
            TourFlag::Snowshoe => "snowshoe",
            TourFlag::Dnr => "dnr",
        }
    }
}

impl std::fmt::Display for TourFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TourFlag {
    type Err = TourOpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TourFlag::ALL
            .into_iter()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| TourOpsError::Validation(format!("unknown activity flag: {s}")))
    }
}

/// Search filters for the tour list. All filters are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub invoice: Option<String>,
    pub name: Option<String>,
}

impl TourQuery {
    pub fn matches(&self, tour: &TourRecord) -> bool {
        if self.date_from.is_some_and(|from| tour.start_date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| tour.start_date > to) {
            return false;
        }
        if let Some(invoice) = self.invoice.as_deref() {
            if !contains_ignore_case(&tour.invoice, invoice) {
                return false;
            }
        }
        if let Some(name) = self.name.as_deref() {
            if !contains_ignore_case(&tour.name, name) {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// --- Staff ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl StaffMember {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The shape returned by the staff endpoints.
    pub fn view(&self) -> StaffView {
        StaffView {
            id: self.id,
            email: self.email.clone(),
            name: self.name(),
            role: self.role.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStaff {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

impl NewStaff {
    pub fn validate(&self) -> Result<(), TourOpsError> {
        if self.email.trim().is_empty() || self.name.trim().is_empty() || self.role.trim().is_empty()
        {
            return Err(TourOpsError::Validation("Missing required fields".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl StaffPatch {
    pub fn apply(&self, staff: &StaffMember) -> StaffMember {
        let mut updated = staff.clone();
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            updated.email = email.to_string();
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            let (first, last) = split_name(name);
            updated.first_name = first;
            updated.last_name = last;
        }
        if let Some(role) = self.role.as_deref().filter(|r| !r.is_empty()) {
            updated.role = role.to_string();
        }
        updated
    }
}

/// Split a display name into first and last name. A single word is used for both.
pub fn split_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest: Vec<&str> = parts.collect();
    let last = if rest.is_empty() {
        first.clone()
    } else {
        rest.join(" ")
    };
    (first, last)
}
