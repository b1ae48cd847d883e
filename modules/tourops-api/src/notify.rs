//! Change notifications sent to staff when tours, schedules or staff records
//! are created, updated or deleted.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tourops_common::Config;
use tracing::{debug, info, warn};
use uuid::Uuid;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

impl ChangeAction {
    fn past_tense(&self) -> &'static str {
        match self {
            ChangeAction::Create => "Created",
            ChangeAction::Update => "Updated",
            ChangeAction::Delete => "Deleted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Staff,
    Tour,
    /// A tour's saved schedule.
    Arrival,
}

impl RecordType {
    fn label(&self) -> &'static str {
        match self {
            RecordType::Staff => "Staff Member",
            RecordType::Tour => "Tour",
            RecordType::Arrival => "Guest Arrival",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub action: ChangeAction,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub record_id: Uuid,
    pub record_name: String,
    pub changes: BTreeMap<String, FieldChange>,
    pub timestamp: DateTime<Utc>,
}

impl ChangeNotification {
    pub fn created(record_type: RecordType, id: Uuid, name: &str, record: &impl Serialize) -> Self {
        let changes = fields(record)
            .into_iter()
            .map(|(k, v)| (k, FieldChange { old: None, new: Some(v) }))
            .collect();
        Self::new(ChangeAction::Create, record_type, id, name, changes)
    }

    /// Only fields whose value changed are listed.
    pub fn updated(
        record_type: RecordType,
        id: Uuid,
        name: &str,
        before: &impl Serialize,
        after: &impl Serialize,
    ) -> Self {
        let mut old = fields(before);
        let new = fields(after);

        let mut changes = BTreeMap::new();
        for (key, value) in new {
            let previous = old.remove(&key);
            if previous.as_ref() != Some(&value) {
                changes.insert(key, FieldChange { old: previous, new: Some(value) });
            }
        }
        for (key, value) in old {
            changes.insert(key, FieldChange { old: Some(value), new: None });
        }
        Self::new(ChangeAction::Update, record_type, id, name, changes)
    }

    pub fn deleted(record_type: RecordType, id: Uuid, name: &str, record: &impl Serialize) -> Self {
        let changes = fields(record)
            .into_iter()
            .map(|(k, v)| (k, FieldChange { old: Some(v), new: None }))
            .collect();
        Self::new(ChangeAction::Delete, record_type, id, name, changes)
    }

    fn new(
        action: ChangeAction,
        record_type: RecordType,
        record_id: Uuid,
        record_name: &str,
        changes: BTreeMap<String, FieldChange>,
    ) -> Self {
        Self {
            action,
            record_type,
            record_id,
            record_name: record_name.to_string(),
            changes,
            timestamp: Utc::now(),
        }
    }

    /// e.g. `"Tour Updated - Lee Group (3)"`.
    pub fn subject(&self) -> String {
        let mut subject = format!("{} {}", self.record_type.label(), self.action.past_tense());
        if !self.record_name.is_empty() {
            subject.push_str(" - ");
            subject.push_str(&self.record_name);
        }
        subject
    }

    /// Plain-text email body.
    pub fn text(&self) -> String {
        let mut lines = String::new();
        for (field, change) in &self.changes {
            let label = field_label(field);
            let line = match self.action {
                ChangeAction::Update => format!(
                    "{label}: \"{}\" -> \"{}\"",
                    value_text(change.old.as_ref()),
                    value_text(change.new.as_ref())
                ),
                ChangeAction::Create => format!("{label}: {}", value_text(change.new.as_ref())),
                ChangeAction::Delete => format!("{label}: {}", value_text(change.old.as_ref())),
            };
            lines.push('\n');
            lines.push_str(&line);
        }

        format!(
            "{subject}\n\nAction: {action}\nType: {kind}\nTime: {time}\n\nChanges:{lines}\n\n---\nThis is an automated notification from the tour operations system.\n",
            subject = self.subject(),
            action = self.action.past_tense().to_uppercase(),
            kind = self.record_type.label(),
            time = self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        )
    }
}

/// Top-level fields of a serialized record, `id` excluded.
fn fields(record: &impl Serialize) -> BTreeMap<String, Value> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map.into_iter().filter(|(k, _)| k != "id").collect(),
        _ => BTreeMap::new(),
    }
}

/// `reservation_number` -> `Reservation Number`.
fn field_label(field: &str) -> String {
    field
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) if s.is_empty() => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &ChangeNotification) -> Result<()>;
}

/// Writes notifications to the log. Used when no mail provider is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &ChangeNotification) -> Result<()> {
        info!(
            action = ?notification.action,
            record_type = ?notification.record_type,
            record_id = %notification.record_id,
            fields = notification.changes.len(),
            "{}",
            notification.subject()
        );
        Ok(())
    }
}

/// Sends notifications as plain-text email through the Resend API.
pub struct ResendNotifier {
    client: reqwest::Client,
    api_key: String,
    from: String,
    recipients: Vec<String>,
}

impl ResendNotifier {
    pub fn new(api_key: &str, from: &str, recipients: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            from: from.to_string(),
            recipients,
        }
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn notify(&self, notification: &ChangeNotification) -> Result<()> {
        if self.recipients.is_empty() {
            debug!("No notification recipients configured, skipping email");
            return Ok(());
        }

        let body = serde_json::json!({
            "from": self.from,
            "to": self.recipients,
            "subject": notification.subject(),
            "text": notification.text(),
        });

        let resp = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            anyhow::bail!("Resend API error (HTTP {}): {message}", status.as_u16());
        }

        info!(recipients = self.recipients.len(), "{}", notification.subject());
        Ok(())
    }
}

/// Pick the notifier the configuration allows for.
pub fn notifier_from_config(config: &Config) -> Arc<dyn Notifier> {
    match &config.resend_api_key {
        Some(key) => Arc::new(ResendNotifier::new(
            key,
            &config.notify_from,
            config.notify_recipients.clone(),
        )),
        None => Arc::new(LogNotifier),
    }
}

/// Deliver a notification. Failures are logged and never surface to the caller.
pub async fn dispatch(notifier: &dyn Notifier, notification: ChangeNotification) {
    if let Err(e) = notifier.notify(&notification).await {
        warn!(error = %e, subject = %notification.subject(), "Failed to send change notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_lists_only_changed_fields() {
        let before = json!({ "id": "x", "name": "Lee (2)", "pax": 2, "hotel": "Explorer" });
        let after = json!({ "id": "y", "name": "Lee (3)", "pax": 3, "hotel": "Explorer" });
        let n = ChangeNotification::updated(RecordType::Tour, Uuid::nil(), "Lee (3)", &before, &after);

        assert_eq!(n.changes.len(), 2);
        assert_eq!(n.changes["pax"].old, Some(json!(2)));
        assert_eq!(n.changes["pax"].new, Some(json!(3)));
        assert!(!n.changes.contains_key("id"));
        assert_eq!(n.subject(), "Tour Updated - Lee (3)");
    }

    #[test]
    fn test_created_and_deleted_carry_one_side() {
        let record = json!({ "email": "a@x.com", "role": "guide" });
        let created = ChangeNotification::created(RecordType::Staff, Uuid::nil(), "Ann", &record);
        assert!(created.changes.values().all(|c| c.old.is_none() && c.new.is_some()));
        assert_eq!(created.subject(), "Staff Member Created - Ann");

        let deleted = ChangeNotification::deleted(RecordType::Staff, Uuid::nil(), "", &record);
        assert!(deleted.changes.values().all(|c| c.old.is_some() && c.new.is_none()));
        assert_eq!(deleted.subject(), "Staff Member Deleted");
    }

    #[test]
    fn test_text_body() {
        let before = json!({ "reservation_number": "" });
        let after = json!({ "reservation_number": "RES-9" });
        let n = ChangeNotification::updated(RecordType::Arrival, Uuid::nil(), "Kim", &before, &after);
        let text = n.text();
        assert!(text.starts_with("Guest Arrival Updated - Kim"));
        assert!(text.contains("Reservation Number: \"-\" -> \"RES-9\""));
        assert!(text.contains("Action: UPDATED"));
    }

    #[test]
    fn test_serialized_shape() {
        let n = ChangeNotification::created(RecordType::Tour, Uuid::nil(), "T", &json!({ "pax": 1 }));
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["action"], "create");
        assert_eq!(value["type"], "tour");
        assert_eq!(value["changes"]["pax"], json!({ "new": 1 }));
    }
}
