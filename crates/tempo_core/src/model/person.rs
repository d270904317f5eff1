//! Person domain model.
//!
//! # Invariants
//! - `company_id`, when set, references a company owned by the same store.
//! - `next_follow_up_date` is a manual override: while set, the follow-up
//!   engine ignores event history entirely for this person.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline state of a contact.
///
/// Only `Active` people surface in the prioritized follow-up list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonStatus {
    #[default]
    Active,
    Parked,
    Closed,
}

impl PersonStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Parked => "parked",
            Self::Closed => "closed",
        }
    }

    /// Parses the wire form used by the CSV format. Unknown values map to
    /// `Active`, matching lenient import behavior.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "parked" => Self::Parked,
            "closed" => Self::Closed,
            _ => Self::Active,
        }
    }
}

/// A tracked contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    /// Manual follow-up override; suppresses event-driven calculation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_follow_up_date: Option<NaiveDate>,
    pub status: PersonStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating a person.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonDraft {
    pub name: String,
    pub email: Option<String>,
    pub job_title: Option<String>,
    pub linkedin_url: Option<String>,
    pub notes: Option<String>,
    pub company_id: Option<String>,
    pub next_follow_up_date: Option<NaiveDate>,
    pub status: PersonStatus,
}

impl PersonDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn into_person(self, id: String, now: DateTime<Utc>) -> Person {
        Person {
            id,
            name: self.name,
            email: self.email,
            job_title: self.job_title,
            linkedin_url: self.linkedin_url,
            notes: self.notes,
            company_id: self.company_id,
            next_follow_up_date: self.next_follow_up_date,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}
