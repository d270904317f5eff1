//! The repository/store: sole owner and mutation point for all entities.
//!
//! # Responsibility
//! - Own the dataset collections and expose CRUD plus query operations.
//! - Enforce referential cleanup: person deletion cascades to events,
//!   company deletion clears references on people.
//! - Persist the whole dataset through the blob store on every mutation.
//!
//! # Invariants
//! - Mutations fully apply or not at all: state is replaced only after the
//!   serialized candidate was saved successfully.
//! - Inserts stamp a fresh unique id plus both timestamps; updates refresh
//!   `updated_at` and never touch `created_at`.

use crate::catalog;
use crate::csv::{self, FormatError};
use crate::followup::{self, FollowUpStatus};
use crate::model::{
    Company, CompanyDraft, Event, EventDraft, EventTypeCategory, EventTypeDefinition, Person,
    PersonDraft, PersonStatus, ValidationError,
};
use crate::storage::{BlobStore, StorageError};
use chrono::{Local, NaiveDate, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

mod migrate;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation failure. Queries for absent ids return `Option` instead.
#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    NotFound(String),
    Storage(StorageError),
    Format(FormatError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Format(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
            Self::Format(err) => Some(err),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<FormatError> for StoreError {
    fn from(value: FormatError) -> Self {
        Self::Format(value)
    }
}

/// The persisted dataset: everything one storage blob holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub custom_event_types: Vec<EventTypeDefinition>,
    /// One-shot guard for the legacy event-type label migration.
    #[serde(default)]
    pub legacy_types_migrated: bool,
}

/// Partial update for an event type. `None` fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventTypePatch {
    pub name: Option<String>,
    pub category: Option<EventTypeCategory>,
    pub default_follow_up_days: Option<u32>,
}

/// Result of an event-type deletion request.
///
/// Deletion is refused (no mutation) while events still reference the type;
/// the blocking events are returned so the caller can resolve and retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteEventTypeOutcome {
    Deleted,
    InUse { conflicting_events: Vec<Event> },
}

/// Entity counts recovered by a CSV import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub people: usize,
    pub companies: usize,
    pub events: usize,
    pub custom_event_types: usize,
}

/// Single-writer, in-memory store persisted through an opaque blob store.
pub struct Store<S: BlobStore> {
    storage: S,
    data: Dataset,
}

impl<S: BlobStore> Store<S> {
    /// Loads the dataset from storage (empty when nothing was saved yet) and
    /// runs the one-time legacy event-type migration.
    pub fn open(storage: S) -> StoreResult<Self> {
        let mut data = match storage.load()? {
            Some(blob) => serde_json::from_str(&blob).map_err(StorageError::from)?,
            None => Dataset::default(),
        };

        let migrated = migrate::migrate_legacy_event_types(&mut data);
        let mut store = Self { storage, data };
        if migrated {
            store.persist()?;
        }

        info!(
            "event=store_open module=store status=ok people={} companies={} events={} custom_types={}",
            store.data.people.len(),
            store.data.companies.len(),
            store.data.events.len(),
            store.data.custom_event_types.len()
        );
        Ok(store)
    }

    /// Read-only view of the full dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    // ---- people ----

    pub fn add_person(&mut self, draft: PersonDraft) -> StoreResult<String> {
        let id = new_id();
        let mut next = self.data.clone();
        next.people.push(draft.into_person(id.clone(), Utc::now()));
        self.commit(next)?;
        Ok(id)
    }

    /// Replaces a person's fields. `created_at` is preserved from the stored
    /// record; `updated_at` is refreshed.
    pub fn update_person(&mut self, person: Person) -> StoreResult<()> {
        let mut next = self.data.clone();
        let slot = next
            .people
            .iter_mut()
            .find(|p| p.id == person.id)
            .ok_or_else(|| StoreError::NotFound(person.id.clone()))?;
        let created_at = slot.created_at;
        *slot = Person {
            created_at,
            updated_at: Utc::now(),
            ..person
        };
        self.commit(next)
    }

    /// Deletes a person and every event they own.
    pub fn delete_person(&mut self, id: &str) -> StoreResult<()> {
        if !self.data.people.iter().any(|p| p.id == id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let mut next = self.data.clone();
        next.people.retain(|p| p.id != id);
        next.events.retain(|e| e.person_id != id);
        self.commit(next)
    }

    pub fn get_person(&self, id: &str) -> Option<&Person> {
        self.data.people.iter().find(|p| p.id == id)
    }

    pub fn people(&self) -> &[Person] {
        &self.data.people
    }

    pub fn people_by_company(&self, company_id: &str) -> Vec<&Person> {
        self.data
            .people
            .iter()
            .filter(|p| p.company_id.as_deref() == Some(company_id))
            .collect()
    }

    // ---- companies ----

    pub fn add_company(&mut self, draft: CompanyDraft) -> StoreResult<String> {
        let id = new_id();
        let mut next = self.data.clone();
        next.companies
            .push(draft.into_company(id.clone(), Utc::now()));
        self.commit(next)?;
        Ok(id)
    }

    pub fn update_company(&mut self, company: Company) -> StoreResult<()> {
        let mut next = self.data.clone();
        let slot = next
            .companies
            .iter_mut()
            .find(|c| c.id == company.id)
            .ok_or_else(|| StoreError::NotFound(company.id.clone()))?;
        let created_at = slot.created_at;
        *slot = Company {
            created_at,
            updated_at: Utc::now(),
            ..company
        };
        self.commit(next)
    }

    /// Deletes a company and clears the reference on its people. People are
    /// never deleted by this cascade.
    pub fn delete_company(&mut self, id: &str) -> StoreResult<()> {
        if !self.data.companies.iter().any(|c| c.id == id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let now = Utc::now();
        let mut next = self.data.clone();
        next.companies.retain(|c| c.id != id);
        for person in next
            .people
            .iter_mut()
            .filter(|p| p.company_id.as_deref() == Some(id))
        {
            person.company_id = None;
            person.updated_at = now;
        }
        self.commit(next)
    }

    pub fn get_company(&self, id: &str) -> Option<&Company> {
        self.data.companies.iter().find(|c| c.id == id)
    }

    pub fn companies(&self) -> &[Company] {
        &self.data.companies
    }

    // ---- events ----

    pub fn add_event(&mut self, draft: EventDraft) -> StoreResult<String> {
        let id = new_id();
        let mut next = self.data.clone();
        next.events.push(draft.into_event(id.clone(), Utc::now()));
        self.commit(next)?;
        Ok(id)
    }

    pub fn update_event(&mut self, event: Event) -> StoreResult<()> {
        let mut next = self.data.clone();
        let slot = next
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| StoreError::NotFound(event.id.clone()))?;
        let created_at = slot.created_at;
        *slot = Event {
            created_at,
            updated_at: Utc::now(),
            ..event
        };
        self.commit(next)
    }

    pub fn delete_event(&mut self, id: &str) -> StoreResult<()> {
        if !self.data.events.iter().any(|e| e.id == id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let mut next = self.data.clone();
        next.events.retain(|e| e.id != id);
        self.commit(next)
    }

    pub fn get_event(&self, id: &str) -> Option<&Event> {
        self.data.events.iter().find(|e| e.id == id)
    }

    /// A person's events, most recent first.
    pub fn events_by_person(&self, person_id: &str) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .data
            .events
            .iter()
            .filter(|e| e.person_id == person_id)
            .cloned()
            .collect();
        followup::sort_events_descending(&mut events);
        events
    }

    /// Events currently referencing an event-type id.
    pub fn events_using_type(&self, type_id: &str) -> Vec<&Event> {
        self.data
            .events
            .iter()
            .filter(|e| e.kind == type_id)
            .collect()
    }

    // ---- event types ----

    /// The resolved catalog: built-ins merged with custom/override entries.
    pub fn all_event_types(&self) -> Vec<EventTypeDefinition> {
        catalog::resolve_all(&self.data.custom_event_types)
    }

    pub fn get_event_type(&self, id: &str) -> Option<EventTypeDefinition> {
        catalog::resolve_by_id(&self.data.custom_event_types, id)
    }

    /// Creates a user-defined event type.
    ///
    /// Rejects intervals outside the allowed range and names that collide
    /// (case-insensitively) with any resolved type.
    pub fn create_event_type(
        &mut self,
        name: &str,
        category: EventTypeCategory,
        follow_up_days: u32,
    ) -> StoreResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyTypeName.into());
        }
        catalog::validate_follow_up_days(follow_up_days)?;
        self.ensure_unique_type_name(name, None)?;

        let id = catalog::new_custom_type_id();
        let mut next = self.data.clone();
        next.custom_event_types.push(EventTypeDefinition {
            id: id.clone(),
            name: name.to_string(),
            category,
            default_follow_up_days: follow_up_days,
            is_custom: true,
            created_at: Some(Utc::now()),
        });
        self.commit(next)?;
        Ok(id)
    }

    /// Applies a partial update to an event type.
    ///
    /// A built-in target is materialized as a same-id override entry that
    /// keeps `is_custom = false`, so it still lists among the defaults; a
    /// second update replaces that entry instead of appending another.
    pub fn update_event_type(&mut self, id: &str, patch: EventTypePatch) -> StoreResult<()> {
        let current = self
            .get_event_type(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut updated = current;
        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ValidationError::EmptyTypeName.into());
            }
            if !name.eq_ignore_ascii_case(&updated.name) {
                self.ensure_unique_type_name(&name, Some(id))?;
            }
            updated.name = name;
        }
        if let Some(category) = patch.category {
            updated.category = category;
        }
        if let Some(days) = patch.default_follow_up_days {
            catalog::validate_follow_up_days(days)?;
            updated.default_follow_up_days = days;
        }

        let mut next = self.data.clone();
        match next.custom_event_types.iter_mut().find(|t| t.id == id) {
            Some(slot) => *slot = updated,
            None => next.custom_event_types.push(updated),
        }
        self.commit(next)
    }

    /// Deletes an event type, refusing while events still reference it.
    pub fn delete_event_type(&mut self, id: &str) -> StoreResult<DeleteEventTypeOutcome> {
        if self.get_event_type(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let conflicting: Vec<Event> = self
            .events_using_type(id)
            .into_iter()
            .cloned()
            .collect();
        if !conflicting.is_empty() {
            return Ok(DeleteEventTypeOutcome::InUse {
                conflicting_events: conflicting,
            });
        }

        if catalog::is_built_in(id) {
            return Err(ValidationError::BuiltInNotDeletable { id: id.to_string() }.into());
        }

        let mut next = self.data.clone();
        next.custom_event_types.retain(|t| t.id != id);
        self.commit(next)?;
        Ok(DeleteEventTypeOutcome::Deleted)
    }

    // ---- follow-up queries ----

    /// Follow-up status as of the local calendar date.
    pub fn get_follow_up_status(&self, person_id: &str) -> Option<FollowUpStatus> {
        self.follow_up_status_on(person_id, Local::now().date_naive())
    }

    /// Deterministic variant used by tests and previews.
    pub fn follow_up_status_on(
        &self,
        person_id: &str,
        today: NaiveDate,
    ) -> Option<FollowUpStatus> {
        let person = self.get_person(person_id)?;
        let events = self.events_by_person(person_id);
        let resolved = self.all_event_types();
        Some(followup::follow_up_status(person, &events, &resolved, today))
    }

    /// Prioritized follow-up list: active people with at least one event,
    /// most overdue first.
    pub fn list_active_follow_up_statuses(&self) -> Vec<FollowUpStatus> {
        self.list_active_follow_up_statuses_on(Local::now().date_naive())
    }

    pub fn list_active_follow_up_statuses_on(&self, today: NaiveDate) -> Vec<FollowUpStatus> {
        let resolved = self.all_event_types();
        let mut statuses: Vec<FollowUpStatus> = self
            .data
            .people
            .iter()
            .filter(|p| p.status == PersonStatus::Active)
            .filter(|p| self.data.events.iter().any(|e| e.person_id == p.id))
            .map(|p| {
                followup::follow_up_status(p, &self.events_by_person(&p.id), &resolved, today)
            })
            .collect();
        // Stable sort keeps ties in person order.
        statuses.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue));
        statuses
    }

    // ---- backup / restore ----

    /// Serializes the dataset into the CSV backup format.
    pub fn export_csv(&self) -> String {
        let out = csv::export_csv(
            &self.data.people,
            &self.data.companies,
            &self.data.events,
            &self.data.custom_event_types,
        );
        info!(
            "event=csv_export module=store status=ok people={} events={}",
            self.data.people.len(),
            self.data.events.len()
        );
        out
    }

    /// Replaces the whole dataset with the contents of a CSV backup.
    ///
    /// Best-effort per line; fails only on catastrophic input or when the
    /// replacement dataset cannot be persisted (the old state is kept then).
    pub fn import_csv(&mut self, content: &str) -> StoreResult<ImportSummary> {
        let parsed = csv::parse_csv(content)?;
        let mut next = Dataset {
            people: parsed.people,
            companies: parsed.companies,
            events: parsed.events,
            custom_event_types: parsed.custom_event_types,
            legacy_types_migrated: false,
        };
        // Old backups may carry legacy event-type labels.
        migrate::migrate_legacy_event_types(&mut next);

        let summary = ImportSummary {
            people: next.people.len(),
            companies: next.companies.len(),
            events: next.events.len(),
            custom_event_types: next.custom_event_types.len(),
        };
        self.commit(next)?;
        info!(
            "event=csv_import module=store status=ok people={} companies={} events={} custom_types={}",
            summary.people, summary.companies, summary.events, summary.custom_event_types
        );
        Ok(summary)
    }

    // ---- internals ----

    fn ensure_unique_type_name(&self, name: &str, skip_id: Option<&str>) -> StoreResult<()> {
        let collides = self.all_event_types().iter().any(|t| {
            Some(t.id.as_str()) != skip_id && t.name.eq_ignore_ascii_case(name)
        });
        if collides {
            return Err(ValidationError::DuplicateTypeName {
                name: name.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Serializes and saves the candidate state, then makes it current.
    /// A failed save leaves the previous state untouched.
    fn commit(&mut self, next: Dataset) -> StoreResult<()> {
        let blob = serde_json::to_string(&next).map_err(StorageError::from)?;
        self.storage.save(&blob)?;
        self.data = next;
        Ok(())
    }

    fn persist(&mut self) -> StoreResult<()> {
        let blob = serde_json::to_string(&self.data).map_err(StorageError::from)?;
        self.storage.save(&blob)?;
        Ok(())
    }
}

/// Unique within one running instance and collision-resistant across
/// re-loads; no external coordination required.
fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Conventional backup file name for a given export date. Cosmetic only.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("tempo-export-{date}.csv")
}
