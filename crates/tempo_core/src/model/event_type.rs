//! Event-type definitions and their validation errors.
//!
//! # Responsibility
//! - Define the shared shape for built-in and user-created interaction kinds.
//!
//! # Invariants
//! - `default_follow_up_days` stays within `[1, 365]` on every write path.
//! - Ids are unique across the resolved (merged) catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coarse grouping used by consuming UIs to cluster interaction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventTypeCategory {
    Meeting,
    OutboundMessage,
    InboundMessage,
}

impl EventTypeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meeting => "meeting",
            Self::OutboundMessage => "outbound-message",
            Self::InboundMessage => "inbound-message",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "meeting" => Some(Self::Meeting),
            "outbound-message" => Some(Self::OutboundMessage),
            "inbound-message" => Some(Self::InboundMessage),
            _ => None,
        }
    }
}

/// One interaction kind with its default follow-up interval.
///
/// Built-in types have fixed ids and `is_custom = false`. A user override of
/// a built-in is stored as a same-id entry that also keeps
/// `is_custom = false`, so listings still group it with the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeDefinition {
    pub id: String,
    pub name: String,
    pub category: EventTypeCategory,
    pub default_follow_up_days: u32,
    pub is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Rejected mutator input. No partial mutation occurs when one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    FollowUpDaysOutOfRange { days: u32 },
    EmptyTypeName,
    DuplicateTypeName { name: String },
    BuiltInNotDeletable { id: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FollowUpDaysOutOfRange { days } => {
                write!(f, "follow-up days {days} outside allowed range 1..=365")
            }
            Self::EmptyTypeName => write!(f, "event type name cannot be empty"),
            Self::DuplicateTypeName { name } => {
                write!(f, "event type name `{name}` already exists")
            }
            Self::BuiltInNotDeletable { id } => {
                write!(f, "built-in event type `{id}` cannot be deleted")
            }
        }
    }
}

impl Error for ValidationError {}
