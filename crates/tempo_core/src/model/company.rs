//! Company domain model.
//!
//! Companies are referenced (not owned) by people via `Person::company_id`.
//! Deleting a company never deletes people; the store clears the reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A company a tracked contact belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating a company.
///
/// The store assigns `id` and both timestamps on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDraft {
    pub name: String,
    pub linkedin_url: Option<String>,
    pub website_url: Option<String>,
    pub notes: Option<String>,
}

impl CompanyDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn into_company(self, id: String, now: DateTime<Utc>) -> Company {
        Company {
            id,
            name: self.name,
            linkedin_url: self.linkedin_url,
            website_url: self.website_url,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}
