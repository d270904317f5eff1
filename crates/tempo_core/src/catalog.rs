//! Event-type catalog: built-in defaults merged with user entries.
//!
//! # Responsibility
//! - Own the fixed built-in type list.
//! - Resolve the effective catalog from built-ins plus stored custom and
//!   override entries.
//!
//! # Invariants
//! - Merge is last-writer-wins keyed by id: a stored entry with a built-in's
//!   id replaces that built-in in place, a new id appends.
//! - Resolved ids are unique.

use crate::model::{EventTypeCategory, EventTypeDefinition, ValidationError};
use once_cell::sync::Lazy;
use uuid::Uuid;

pub const FOLLOW_UP_DAYS_MIN: u32 = 1;
pub const FOLLOW_UP_DAYS_MAX: u32 = 365;

/// Prefix for user-created type ids, guaranteeing no collision with the
/// fixed built-in ids.
const CUSTOM_ID_PREFIX: &str = "custom-";

static BUILT_IN_TYPES: Lazy<Vec<EventTypeDefinition>> = Lazy::new(|| {
    let built_in = |id: &str, name: &str, category: EventTypeCategory, days: u32| {
        EventTypeDefinition {
            id: id.to_string(),
            name: name.to_string(),
            category,
            default_follow_up_days: days,
            is_custom: false,
            created_at: None,
        }
    };
    vec![
        built_in("email", "Email", EventTypeCategory::OutboundMessage, 5),
        built_in(
            "linkedin-connection",
            "LinkedIn Connection Request",
            EventTypeCategory::OutboundMessage,
            7,
        ),
        built_in(
            "linkedin-inmail",
            "LinkedIn InMail",
            EventTypeCategory::OutboundMessage,
            7,
        ),
        built_in("phone-call", "Phone Call", EventTypeCategory::Meeting, 7),
        built_in("meeting", "Meeting", EventTypeCategory::Meeting, 14),
        built_in(
            "reply-received",
            "Reply Received",
            EventTypeCategory::InboundMessage,
            2,
        ),
        built_in(
            "message-received",
            "Message Received",
            EventTypeCategory::InboundMessage,
            2,
        ),
    ]
});

/// The fixed built-in type list, in defined order.
pub fn built_in_types() -> &'static [EventTypeDefinition] {
    &BUILT_IN_TYPES
}

/// Whether `id` names a built-in type (overridden or not).
pub fn is_built_in(id: &str) -> bool {
    BUILT_IN_TYPES.iter().any(|t| t.id == id)
}

/// Generates a fresh id for a user-created type.
pub fn new_custom_type_id() -> String {
    format!("{CUSTOM_ID_PREFIX}{}", Uuid::new_v4())
}

/// Merges built-ins with stored custom/override entries.
///
/// Built-ins are seeded first in defined order; `custom` entries are applied
/// in storage order, each replacing the same-id slot or appending at the end.
pub fn resolve_all(custom: &[EventTypeDefinition]) -> Vec<EventTypeDefinition> {
    let mut resolved = BUILT_IN_TYPES.clone();
    for entry in custom {
        match resolved.iter_mut().find(|t| t.id == entry.id) {
            Some(slot) => *slot = entry.clone(),
            None => resolved.push(entry.clone()),
        }
    }
    resolved
}

/// Resolves a single type id against the merged catalog.
pub fn resolve_by_id(custom: &[EventTypeDefinition], id: &str) -> Option<EventTypeDefinition> {
    custom
        .iter()
        .rev()
        .find(|t| t.id == id)
        .or_else(|| BUILT_IN_TYPES.iter().find(|t| t.id == id))
        .cloned()
}

/// Validates a follow-up interval against the allowed range.
pub fn validate_follow_up_days(days: u32) -> Result<(), ValidationError> {
    if (FOLLOW_UP_DAYS_MIN..=FOLLOW_UP_DAYS_MAX).contains(&days) {
        Ok(())
    } else {
        Err(ValidationError::FollowUpDaysOutOfRange { days })
    }
}
