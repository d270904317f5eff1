//! Follow-up status derivation.
//!
//! # Responsibility
//! - Compute a person's follow-up urgency from their event history, the
//!   resolved event-type catalog and a reference date.
//!
//! # Invariants
//! - Pure: same inputs always yield the same status; nothing is persisted.
//! - A manual `next_follow_up_date` override takes absolute precedence over
//!   event-driven calculation.
//! - A future-dated last event is never overdue.

use crate::model::{Event, EventTypeDefinition, Person};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Fallback interval when neither the event nor its type supplies one
/// (person never contacted, or event references an unknown type id).
pub const DEFAULT_FOLLOW_UP_DAYS: u32 = 7;

/// How pressing a follow-up is, derived from `days_overdue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Display for Urgency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{label}")
    }
}

/// Derived follow-up state for one person. Recomputed on every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpStatus {
    pub person_id: String,
    pub last_event: Option<Event>,
    pub last_event_type: Option<EventTypeDefinition>,
    /// Whole calendar days since the last event; `None` when never contacted.
    pub days_since_last_event: Option<i64>,
    /// Effective interval for the last event; `0` under a manual override.
    pub suggested_follow_up_days: u32,
    /// Positive = overdue, zero = due today, negative = days remaining.
    /// `None` when there is no data to derive from.
    pub days_overdue: Option<i64>,
    pub is_overdue: bool,
    pub is_future_event: bool,
    pub urgency: Urgency,
}

/// Classifies urgency from a signed overdue count. Total and deterministic.
pub fn urgency_for(days_overdue: i64) -> Urgency {
    if days_overdue > 7 {
        Urgency::Critical
    } else if days_overdue > 3 {
        Urgency::High
    } else if days_overdue > 0 {
        Urgency::Medium
    } else if days_overdue > -3 {
        Urgency::Low
    } else {
        Urgency::None
    }
}

fn sort_time(event: &Event) -> NaiveTime {
    // Absent time sorts as midnight, i.e. last among same-day events.
    event.time.unwrap_or(NaiveTime::MIN)
}

/// Selects the most recent event by `(date, time)` descending.
///
/// Input order does not matter; for exact `(date, time)` ties the latest
/// stored entry wins.
pub fn latest_event(events: &[Event]) -> Option<&Event> {
    events.iter().max_by_key(|e| (e.date, sort_time(e)))
}

/// Sorts events most-recent-first, the order consumed by timelines.
pub fn sort_events_descending(events: &mut [Event]) {
    events.sort_by(|a, b| (b.date, sort_time(b)).cmp(&(a.date, sort_time(a))));
}

/// Computes the follow-up status for one person as of `today`.
///
/// `catalog` is the resolved (merged) event-type list.
pub fn follow_up_status(
    person: &Person,
    events: &[Event],
    catalog: &[EventTypeDefinition],
    today: NaiveDate,
) -> FollowUpStatus {
    let last = latest_event(events);
    let last_type =
        last.and_then(|e| catalog.iter().find(|t| t.id == e.kind)).cloned();
    let days_since = last.map(|e| (today - e.date).num_days());
    let is_future = last.is_some_and(|e| e.date > today);

    if let Some(next_date) = person.next_follow_up_date {
        // Manual override: event history is ignored for overdue/urgency.
        let days_overdue = (today - next_date).num_days();
        return FollowUpStatus {
            person_id: person.id.clone(),
            last_event: last.cloned(),
            last_event_type: last_type,
            days_since_last_event: days_since,
            suggested_follow_up_days: 0,
            days_overdue: Some(days_overdue),
            is_overdue: days_overdue > 0,
            is_future_event: is_future,
            urgency: urgency_for(days_overdue),
        };
    }

    let Some(last) = last else {
        // Never contacted: no overdue count to derive.
        return FollowUpStatus {
            person_id: person.id.clone(),
            last_event: None,
            last_event_type: None,
            days_since_last_event: None,
            suggested_follow_up_days: DEFAULT_FOLLOW_UP_DAYS,
            days_overdue: None,
            is_overdue: false,
            is_future_event: false,
            urgency: Urgency::None,
        };
    };

    let suggested = last.custom_follow_up_days.unwrap_or_else(|| {
        last_type
            .as_ref()
            .map(|t| t.default_follow_up_days)
            .unwrap_or(DEFAULT_FOLLOW_UP_DAYS)
    });
    let days_overdue = if is_future {
        0
    } else {
        (today - last.date).num_days() - i64::from(suggested)
    };

    FollowUpStatus {
        person_id: person.id.clone(),
        last_event: Some(last.clone()),
        last_event_type: last_type,
        days_since_last_event: days_since,
        suggested_follow_up_days: suggested,
        days_overdue: Some(days_overdue),
        is_overdue: days_overdue > 0,
        is_future_event: is_future,
        urgency: urgency_for(days_overdue),
    }
}
