use chrono::NaiveDate;
use tempo_core::model::{EventDraft, EventTypeCategory, PersonDraft, ValidationError};
use tempo_core::storage::MemoryBlobStore;
use tempo_core::store::{DeleteEventTypeOutcome, EventTypePatch, Store, StoreError};

fn open_store() -> Store<MemoryBlobStore> {
    Store::open(MemoryBlobStore::new()).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn created_custom_type_appears_in_resolved_catalog() {
    let mut store = open_store();
    let id = store
        .create_event_type("Coffee Chat", EventTypeCategory::Meeting, 10)
        .unwrap();

    assert!(id.starts_with("custom-"));
    let types = store.all_event_types();
    let created = types.iter().find(|t| t.id == id).unwrap();
    assert_eq!(created.name, "Coffee Chat");
    assert!(created.is_custom);
    assert_eq!(created.default_follow_up_days, 10);
    // Customs append after the built-ins.
    assert_eq!(types.last().unwrap().id, id);
}

#[test]
fn create_rejects_out_of_range_interval() {
    let mut store = open_store();
    for days in [0, 366] {
        let err = store
            .create_event_type("Workshop", EventTypeCategory::Meeting, days)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::FollowUpDaysOutOfRange { .. })
        ));
    }
    assert!(store
        .create_event_type("Workshop", EventTypeCategory::Meeting, 365)
        .is_ok());
}

#[test]
fn create_rejects_duplicate_name_case_insensitively() {
    let mut store = open_store();
    let err = store
        .create_event_type("EMAIL", EventTypeCategory::OutboundMessage, 5)
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::DuplicateTypeName { .. })
    ));

    store
        .create_event_type("Coffee Chat", EventTypeCategory::Meeting, 10)
        .unwrap();
    let err = store
        .create_event_type("coffee chat", EventTypeCategory::Meeting, 3)
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn built_in_override_stays_listed_as_default() {
    let mut store = open_store();
    store
        .update_event_type(
            "email",
            EventTypePatch {
                default_follow_up_days: Some(10),
                ..EventTypePatch::default()
            },
        )
        .unwrap();

    let types = store.all_event_types();
    let email = types.iter().find(|t| t.id == "email").unwrap();
    assert_eq!(email.default_follow_up_days, 10);
    assert!(!email.is_custom);
    // Still in the built-in slot, not appended.
    assert_eq!(types[0].id, "email");
}

#[test]
fn second_override_updates_the_same_entry() {
    let mut store = open_store();
    let patch = |days| EventTypePatch {
        default_follow_up_days: Some(days),
        ..EventTypePatch::default()
    };
    store.update_event_type("email", patch(10)).unwrap();
    store.update_event_type("email", patch(12)).unwrap();

    assert_eq!(store.dataset().custom_event_types.len(), 1);
    assert_eq!(
        store.get_event_type("email").unwrap().default_follow_up_days,
        12
    );
}

#[test]
fn custom_type_updates_in_place() {
    let mut store = open_store();
    let id = store
        .create_event_type("Coffee Chat", EventTypeCategory::Meeting, 10)
        .unwrap();
    store
        .update_event_type(
            &id,
            EventTypePatch {
                name: Some("Coffee Catch-up".to_string()),
                default_follow_up_days: Some(14),
                ..EventTypePatch::default()
            },
        )
        .unwrap();

    assert_eq!(store.dataset().custom_event_types.len(), 1);
    let updated = store.get_event_type(&id).unwrap();
    assert_eq!(updated.name, "Coffee Catch-up");
    assert_eq!(updated.default_follow_up_days, 14);
    assert!(updated.is_custom);
}

#[test]
fn update_unknown_type_is_not_found() {
    let mut store = open_store();
    let err = store
        .update_event_type("missing", EventTypePatch::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn delete_is_refused_while_events_reference_the_type() {
    let mut store = open_store();
    let type_id = store
        .create_event_type("Coffee Chat", EventTypeCategory::Meeting, 10)
        .unwrap();
    let person_id = store.add_person(PersonDraft::named("Ada")).unwrap();
    let event_id = store
        .add_event(EventDraft::new(&person_id, date(2026, 8, 1), &type_id))
        .unwrap();

    let outcome = store.delete_event_type(&type_id).unwrap();
    match outcome {
        DeleteEventTypeOutcome::InUse { conflicting_events } => {
            assert_eq!(conflicting_events.len(), 1);
            assert_eq!(conflicting_events[0].id, event_id);
        }
        other => panic!("expected refusal, got {other:?}"),
    }
    // Refusal mutates nothing.
    assert!(store.get_event_type(&type_id).is_some());

    store.delete_event(&event_id).unwrap();
    assert_eq!(
        store.delete_event_type(&type_id).unwrap(),
        DeleteEventTypeOutcome::Deleted
    );
    assert!(store.get_event_type(&type_id).is_none());
}

#[test]
fn built_in_types_cannot_be_deleted() {
    let mut store = open_store();
    let err = store.delete_event_type("email").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::BuiltInNotDeletable { .. })
    ));
}

#[test]
fn delete_unknown_type_is_not_found() {
    let mut store = open_store();
    let err = store.delete_event_type("missing").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
