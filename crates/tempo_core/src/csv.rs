//! CSV backup format: encode and best-effort decode of the full dataset.
//!
//! # Responsibility
//! - Serialize people, companies, events and the custom/override type list
//!   into one denormalized text blob, and parse it back.
//!
//! # Invariants
//! - One row per (person, event); a person with zero events still emits one
//!   row with empty event columns.
//! - Custom/override types live in a sentinel-delimited section right after
//!   the header, one `EVENTTYPE,...` line each.
//! - Parsing is best-effort: malformed lines are skipped with a warning;
//!   only a near-empty input fails outright.

use crate::catalog;
use crate::model::{
    Company, Event, EventTypeCategory, EventTypeDefinition, Person, PersonStatus,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use log::warn;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const HEADER_COLUMNS: [&str; 18] = [
    "PersonId",
    "PersonName",
    "PersonEmail",
    "PersonJobTitle",
    "PersonLinkedIn",
    "PersonNotes",
    "PersonStatus",
    "CompanyId",
    "CompanyName",
    "CompanyLinkedIn",
    "CompanyWebsite",
    "CompanyNotes",
    "EventId",
    "EventDate",
    "EventTime",
    "EventType",
    "EventNotes",
    "EventCustomFollowUpDays",
];

const EVENT_TYPES_START: &str = "# CUSTOM_EVENT_TYPES_START";
const EVENT_TYPES_END: &str = "# CUSTOM_EVENT_TYPES_END";
const EVENT_TYPE_TAG: &str = "EVENTTYPE";
const TIME_FORMAT: &str = "%H:%M";

/// Catastrophic parse failure. Lesser malformations are recovered by
/// skipping the offending line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Fewer than two non-empty lines: no header plus data to work with.
    Empty,
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "CSV input is empty or has no data rows"),
        }
    }
}

impl Error for FormatError {}

/// Entities recovered from one CSV blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvDataset {
    pub people: Vec<Person>,
    pub companies: Vec<Company>,
    pub events: Vec<Event>,
    pub custom_event_types: Vec<EventTypeDefinition>,
}

/// Serializes the dataset into the 18-column backup format.
pub fn export_csv(
    people: &[Person],
    companies: &[Company],
    events: &[Event],
    custom_event_types: &[EventTypeDefinition],
) -> String {
    let company_by_id: HashMap<&str, &Company> =
        companies.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut events_by_person: HashMap<&str, Vec<&Event>> = HashMap::new();
    for event in events {
        events_by_person
            .entry(event.person_id.as_str())
            .or_default()
            .push(event);
    }

    let mut lines = vec![HEADER_COLUMNS.join(",")];

    if !custom_event_types.is_empty() {
        lines.push(EVENT_TYPES_START.to_string());
        for ty in custom_event_types {
            lines.push(join_fields(&[
                EVENT_TYPE_TAG,
                &ty.id,
                &ty.name,
                ty.category.as_str(),
                &ty.default_follow_up_days.to_string(),
            ]));
        }
        lines.push(EVENT_TYPES_END.to_string());
    }

    for person in people {
        let company = person
            .company_id
            .as_deref()
            .and_then(|id| company_by_id.get(id).copied());
        match events_by_person.get(person.id.as_str()) {
            None => lines.push(row_line(person, company, None)),
            Some(person_events) => {
                for event in person_events {
                    lines.push(row_line(person, company, Some(event)));
                }
            }
        }
    }

    lines.join("\n")
}

fn row_line(person: &Person, company: Option<&Company>, event: Option<&Event>) -> String {
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();
    let company_field = |pick: fn(&Company) -> &Option<String>| {
        company.map(|c| opt(pick(c))).unwrap_or_default()
    };

    join_fields(&[
        &person.id,
        &person.name,
        &opt(&person.email),
        &opt(&person.job_title),
        &opt(&person.linkedin_url),
        &opt(&person.notes),
        person.status.as_str(),
        &company.map(|c| c.id.clone()).unwrap_or_default(),
        &company.map(|c| c.name.clone()).unwrap_or_default(),
        &company_field(|c| &c.linkedin_url),
        &company_field(|c| &c.website_url),
        &company_field(|c| &c.notes),
        &event.map(|e| e.id.clone()).unwrap_or_default(),
        &event.map(|e| e.date.to_string()).unwrap_or_default(),
        &event
            .and_then(|e| e.time)
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_default(),
        &event.map(|e| e.kind.clone()).unwrap_or_default(),
        &event.map(|e| opt(&e.notes)).unwrap_or_default(),
        &event
            .and_then(|e| e.custom_follow_up_days)
            .map(|d| d.to_string())
            .unwrap_or_default(),
    ])
}

/// Parses a backup blob produced by [`export_csv`] (or a compatible tool).
///
/// People and companies deduplicate first-id-wins across the denormalized
/// rows; events append for every row carrying id, date and type.
pub fn parse_csv(input: &str) -> Result<CsvDataset, FormatError> {
    let lines: Vec<&str> = input.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Err(FormatError::Empty);
    }

    let header = parse_line(lines[0]);
    if header != HEADER_COLUMNS {
        // Known leniency: positional parsing proceeds regardless.
        warn!(
            "event=csv_parse module=csv status=warn reason=header_mismatch columns={}",
            header.len()
        );
    }

    let now = Utc::now();
    let mut people: Vec<Person> = Vec::new();
    let mut companies: Vec<Company> = Vec::new();
    let mut events: Vec<Event> = Vec::new();
    let mut custom_event_types: Vec<EventTypeDefinition> = Vec::new();
    let mut in_type_section = false;

    for line in &lines[1..] {
        if line.starts_with(EVENT_TYPES_START) {
            in_type_section = true;
            continue;
        }
        if line.starts_with(EVENT_TYPES_END) {
            in_type_section = false;
            continue;
        }

        if in_type_section {
            if let Some(ty) = parse_event_type_line(line, now) {
                custom_event_types.push(ty);
            }
            continue;
        }

        let fields = parse_line(line);
        if fields.len() < 18 {
            warn!(
                "event=csv_parse module=csv status=warn reason=short_row fields={}",
                fields.len()
            );
            continue;
        }

        let company_id = &fields[7];
        if !company_id.is_empty()
            && !fields[8].is_empty()
            && !companies.iter().any(|c: &Company| &c.id == company_id)
        {
            companies.push(Company {
                id: company_id.clone(),
                name: fields[8].clone(),
                linkedin_url: non_empty(&fields[9]),
                website_url: non_empty(&fields[10]),
                notes: non_empty(&fields[11]),
                created_at: now,
                updated_at: now,
            });
        }

        let person_id = &fields[0];
        if !person_id.is_empty() && !people.iter().any(|p: &Person| &p.id == person_id) {
            people.push(Person {
                id: person_id.clone(),
                name: fields[1].clone(),
                email: non_empty(&fields[2]),
                job_title: non_empty(&fields[3]),
                linkedin_url: non_empty(&fields[4]),
                notes: non_empty(&fields[5]),
                company_id: non_empty(&fields[7]),
                next_follow_up_date: None,
                status: PersonStatus::parse_or_default(&fields[6]),
                created_at: now,
                updated_at: now,
            });
        }

        if let Some(event) = parse_event_fields(&fields, now) {
            events.push(event);
        }
    }

    Ok(CsvDataset {
        people,
        companies,
        events,
        custom_event_types,
    })
}

fn parse_event_type_line(
    line: &str,
    now: chrono::DateTime<Utc>,
) -> Option<EventTypeDefinition> {
    let fields = parse_line(line);
    if fields.len() < 5 || fields[0] != EVENT_TYPE_TAG {
        warn!("event=csv_parse module=csv status=warn reason=malformed_type_line");
        return None;
    }
    let category = EventTypeCategory::parse(&fields[3]).or_else(|| {
        warn!(
            "event=csv_parse module=csv status=warn reason=unknown_category value={}",
            fields[3]
        );
        None
    })?;
    let days = fields[4].parse::<u32>().ok().or_else(|| {
        warn!(
            "event=csv_parse module=csv status=warn reason=bad_follow_up_days value={}",
            fields[4]
        );
        None
    })?;
    // Built-in overrides keep is_custom = false so they round-trip as
    // overrides, not as separate custom types.
    Some(EventTypeDefinition {
        id: fields[1].clone(),
        name: fields[2].clone(),
        category,
        default_follow_up_days: days,
        is_custom: !catalog::is_built_in(&fields[1]),
        created_at: Some(now),
    })
}

fn parse_event_fields(fields: &[String], now: chrono::DateTime<Utc>) -> Option<Event> {
    // A row represents a real event only when id, date and type are all set;
    // rows without them are pure person/company carriers.
    if fields[12].is_empty() || fields[13].is_empty() || fields[15].is_empty() {
        return None;
    }
    let date = match fields[13].parse::<NaiveDate>() {
        Ok(date) => date,
        Err(_) => {
            warn!(
                "event=csv_parse module=csv status=warn reason=bad_event_date value={}",
                fields[13]
            );
            return None;
        }
    };
    let time = if fields[14].is_empty() {
        None
    } else {
        NaiveTime::parse_from_str(&fields[14], TIME_FORMAT).ok()
    };

    Some(Event {
        id: fields[12].clone(),
        person_id: fields[0].clone(),
        date,
        time,
        kind: fields[15].clone(),
        notes: non_empty(&fields[16]),
        custom_follow_up_days: fields[17].parse::<u32>().ok(),
        created_at: now,
        updated_at: now,
    })
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn join_fields(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quotes a field iff it contains a comma, newline or double quote,
/// doubling internal quotes.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('\n') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Splits one line into fields, honoring quoted sections and `""` escapes.
fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}
