//! Domain model for outreach tracking.
//!
//! # Responsibility
//! - Define the canonical records owned by the store: people, companies,
//!   interaction events and event-type definitions.
//! - Keep these shapes free of behavior beyond small constructors.
//!
//! # Invariants
//! - Every record carries a stable string `id` assigned at insert time.
//! - `created_at`/`updated_at` are stamped by the store, never by callers.

pub mod company;
pub mod event;
pub mod event_type;
pub mod person;

pub use company::{Company, CompanyDraft};
pub use event::{Event, EventDraft};
pub use event_type::{EventTypeCategory, EventTypeDefinition, ValidationError};
pub use person::{Person, PersonDraft, PersonStatus};
