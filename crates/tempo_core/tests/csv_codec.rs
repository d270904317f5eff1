use chrono::{NaiveDate, NaiveTime};
use tempo_core::model::{CompanyDraft, EventDraft, EventTypeCategory, PersonDraft, PersonStatus};
use tempo_core::storage::MemoryBlobStore;
use tempo_core::store::{export_file_name, EventTypePatch, Store, StoreError};
use tempo_core::{parse_csv, FormatError};

fn open_store() -> Store<MemoryBlobStore> {
    Store::open(MemoryBlobStore::new()).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn export_starts_with_the_fixed_header() {
    let store = open_store();
    let csv = store.export_csv();
    assert!(csv.starts_with("PersonId,PersonName,PersonEmail,"));
    assert!(csv.lines().next().unwrap().ends_with("EventCustomFollowUpDays"));
}

#[test]
fn person_without_events_still_emits_one_row() {
    let mut store = open_store();
    let id = store.add_person(PersonDraft::named("Ada")).unwrap();

    let csv = store.export_csv();
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].starts_with(&format!("{id},Ada,")));
    // All event columns empty.
    assert!(rows[0].ends_with(",,,,,"));
}

#[test]
fn round_trip_reproduces_entities_and_catalog() {
    let mut store = open_store();
    let company = store
        .add_company({
            let mut c = CompanyDraft::named("Initech, Inc.");
            c.website_url = Some("https://initech.example".to_string());
            c
        })
        .unwrap();

    let mut ada_draft = PersonDraft::named("Ada Lovelace");
    ada_draft.email = Some("ada@initech.example".to_string());
    ada_draft.company_id = Some(company.clone());
    ada_draft.status = PersonStatus::Parked;
    let ada = store.add_person(ada_draft).unwrap();

    // Bob has no events and no company.
    let bob = store.add_person(PersonDraft::named("Bob")).unwrap();

    let mut first = EventDraft::new(&ada, date(2026, 8, 1), "email");
    first.notes = Some("intro, said \"maybe\"".to_string());
    first.custom_follow_up_days = Some(3);
    store.add_event(first).unwrap();
    let mut second = EventDraft::new(&ada, date(2026, 8, 5), "meeting");
    second.time = NaiveTime::from_hms_opt(14, 30, 0);
    store.add_event(second).unwrap();

    let custom = store
        .create_event_type("Coffee Chat", EventTypeCategory::Meeting, 10)
        .unwrap();
    store
        .update_event_type(
            "email",
            EventTypePatch {
                default_follow_up_days: Some(9),
                ..EventTypePatch::default()
            },
        )
        .unwrap();

    let parsed = parse_csv(&store.export_csv()).unwrap();

    assert_eq!(parsed.people.len(), 2);
    let ada_back = parsed.people.iter().find(|p| p.id == ada).unwrap();
    assert_eq!(ada_back.name, "Ada Lovelace");
    assert_eq!(ada_back.email.as_deref(), Some("ada@initech.example"));
    assert_eq!(ada_back.company_id.as_deref(), Some(company.as_str()));
    assert_eq!(ada_back.status, PersonStatus::Parked);
    assert!(parsed.people.iter().any(|p| p.id == bob));

    assert_eq!(parsed.companies.len(), 1);
    assert_eq!(parsed.companies[0].name, "Initech, Inc.");
    assert_eq!(
        parsed.companies[0].website_url.as_deref(),
        Some("https://initech.example")
    );

    assert_eq!(parsed.events.len(), 2);
    let noted = parsed
        .events
        .iter()
        .find(|e| e.notes.is_some())
        .unwrap();
    assert_eq!(noted.notes.as_deref(), Some("intro, said \"maybe\""));
    assert_eq!(noted.custom_follow_up_days, Some(3));
    let timed = parsed.events.iter().find(|e| e.time.is_some()).unwrap();
    assert_eq!(timed.time, NaiveTime::from_hms_opt(14, 30, 0));

    assert_eq!(parsed.custom_event_types.len(), 2);
    let email_override = parsed
        .custom_event_types
        .iter()
        .find(|t| t.id == "email")
        .unwrap();
    assert_eq!(email_override.default_follow_up_days, 9);
    assert!(!email_override.is_custom);
    let coffee = parsed
        .custom_event_types
        .iter()
        .find(|t| t.id == custom)
        .unwrap();
    assert!(coffee.is_custom);
    assert_eq!(coffee.name, "Coffee Chat");
}

#[test]
fn import_replaces_the_dataset_and_reports_counts() {
    let mut source = open_store();
    let ada = source.add_person(PersonDraft::named("Ada")).unwrap();
    source
        .add_event(EventDraft::new(&ada, date(2026, 8, 1), "email"))
        .unwrap();
    source
        .create_event_type("Coffee Chat", EventTypeCategory::Meeting, 10)
        .unwrap();
    let backup = source.export_csv();

    let mut target = open_store();
    target.add_person(PersonDraft::named("Stale")).unwrap();

    let summary = target.import_csv(&backup).unwrap();
    assert_eq!(summary.people, 1);
    assert_eq!(summary.companies, 0);
    assert_eq!(summary.events, 1);
    assert_eq!(summary.custom_event_types, 1);

    assert!(target.people().iter().all(|p| p.name != "Stale"));
    assert_eq!(target.get_person(&ada).unwrap().name, "Ada");
    assert!(target.dataset().legacy_types_migrated);
}

#[test]
fn near_empty_input_is_a_format_error() {
    let mut store = open_store();
    for input in ["", "\n\n  \n", "PersonId,PersonName"] {
        let err = store.import_csv(input).unwrap_err();
        assert!(matches!(err, StoreError::Format(FormatError::Empty)));
    }
    assert_eq!(parse_csv("").unwrap_err(), FormatError::Empty);
}

#[test]
fn short_rows_are_skipped_without_aborting() {
    let header = "PersonId,PersonName,PersonEmail,PersonJobTitle,PersonLinkedIn,PersonNotes,PersonStatus,CompanyId,CompanyName,CompanyLinkedIn,CompanyWebsite,CompanyNotes,EventId,EventDate,EventTime,EventType,EventNotes,EventCustomFollowUpDays";
    let good = "p1,Ada,,,,,active,,,,,,e1,2026-08-01,,email,,";
    let input = format!("{header}\nnot,enough,fields\n{good}");

    let parsed = parse_csv(&input).unwrap();
    assert_eq!(parsed.people.len(), 1);
    assert_eq!(parsed.events.len(), 1);
    assert_eq!(parsed.events[0].kind, "email");
}

#[test]
fn malformed_event_type_lines_are_skipped() {
    let header = "PersonId,PersonName,PersonEmail,PersonJobTitle,PersonLinkedIn,PersonNotes,PersonStatus,CompanyId,CompanyName,CompanyLinkedIn,CompanyWebsite,CompanyNotes,EventId,EventDate,EventTime,EventType,EventNotes,EventCustomFollowUpDays";
    let input = format!(
        "{header}\n\
         # CUSTOM_EVENT_TYPES_START\n\
         EVENTTYPE,custom-1,Coffee Chat,meeting,10\n\
         NOTATYPE,custom-2,Bad Tag,meeting,5\n\
         EVENTTYPE,custom-3,Bad Category,afternoon,5\n\
         EVENTTYPE,custom-4,Bad Days,meeting,soon\n\
         # CUSTOM_EVENT_TYPES_END\n\
         p1,Ada,,,,,active,,,,,,,,,,,"
    );

    let parsed = parse_csv(&input).unwrap();
    assert_eq!(parsed.custom_event_types.len(), 1);
    assert_eq!(parsed.custom_event_types[0].id, "custom-1");
    assert_eq!(parsed.people.len(), 1);
    // The zero-event carrier row produced no event.
    assert!(parsed.events.is_empty());
}

#[test]
fn duplicate_person_rows_keep_the_first_occurrence() {
    let header = "PersonId,PersonName,PersonEmail,PersonJobTitle,PersonLinkedIn,PersonNotes,PersonStatus,CompanyId,CompanyName,CompanyLinkedIn,CompanyWebsite,CompanyNotes,EventId,EventDate,EventTime,EventType,EventNotes,EventCustomFollowUpDays";
    let input = format!(
        "{header}\n\
         p1,Ada,,,,,active,,,,,,e1,2026-08-01,,email,,\n\
         p1,Renamed,,,,,closed,,,,,,e2,2026-08-02,,meeting,,"
    );

    let parsed = parse_csv(&input).unwrap();
    assert_eq!(parsed.people.len(), 1);
    assert_eq!(parsed.people[0].name, "Ada");
    assert_eq!(parsed.people[0].status, PersonStatus::Active);
    // Events still append for every row.
    assert_eq!(parsed.events.len(), 2);
}

#[test]
fn unparseable_event_dates_drop_the_event_but_keep_the_person() {
    let header = "PersonId,PersonName,PersonEmail,PersonJobTitle,PersonLinkedIn,PersonNotes,PersonStatus,CompanyId,CompanyName,CompanyLinkedIn,CompanyWebsite,CompanyNotes,EventId,EventDate,EventTime,EventType,EventNotes,EventCustomFollowUpDays";
    let input = format!("{header}\np1,Ada,,,,,active,,,,,,e1,not-a-date,,email,,");

    let parsed = parse_csv(&input).unwrap();
    assert_eq!(parsed.people.len(), 1);
    assert!(parsed.events.is_empty());
}

#[test]
fn export_file_name_carries_the_date_stamp() {
    assert_eq!(
        export_file_name(date(2026, 8, 27)),
        "tempo-export-2026-08-27.csv"
    );
}
