//! Interaction event domain model.
//!
//! # Invariants
//! - `person_id` references an existing person; the store enforces this by
//!   cascade-deleting events with their owner, not by a constraint engine.
//! - `kind` is an open foreign key into the event-type catalog, never a
//!   closed enum: users can define their own interaction kinds.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped interaction with a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub person_id: String,
    /// Calendar date of the interaction (no time component).
    pub date: NaiveDate,
    /// Optional HH:MM, used only for same-day ordering and display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    /// Event-type catalog id. Serialized as `type` to match external schema
    /// naming.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Per-event override of the type's default follow-up interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_follow_up_days: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for recording an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub person_id: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub kind: String,
    pub notes: Option<String>,
    pub custom_follow_up_days: Option<u32>,
}

impl EventDraft {
    pub fn new(person_id: impl Into<String>, date: NaiveDate, kind: impl Into<String>) -> Self {
        Self {
            person_id: person_id.into(),
            date,
            time: None,
            kind: kind.into(),
            notes: None,
            custom_follow_up_days: None,
        }
    }

    pub(crate) fn into_event(self, id: String, now: DateTime<Utc>) -> Event {
        Event {
            id,
            person_id: self.person_id,
            date: self.date,
            time: self.time,
            kind: self.kind,
            notes: self.notes,
            custom_follow_up_days: self.custom_follow_up_days,
            created_at: now,
            updated_at: now,
        }
    }
}
