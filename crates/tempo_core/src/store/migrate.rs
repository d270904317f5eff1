//! One-time migration of legacy human-readable event-type labels.
//!
//! Early datasets stored event types as display labels ("Email", "Meeting
//! Invite") instead of catalog ids. The remap runs at most once per dataset,
//! gated by the persisted `legacy_types_migrated` flag; the flag (not the
//! label heuristic) is what guarantees idempotence, so a later custom type
//! that happens to look like a legacy label is never touched.

use super::Dataset;
use log::info;

const LEGACY_LABEL_MAP: &[(&str, &str)] = &[
    ("Email", "email"),
    ("LinkedIn Connection Request", "linkedin-connection"),
    ("LinkedIn InMail", "linkedin-inmail"),
    ("Meeting", "meeting"),
    ("Meeting Invite", "meeting"),
    ("Phone Call", "phone-call"),
    ("Reply Received", "reply-received"),
    ("Message Received", "message-received"),
];

/// Unrecognized legacy labels collapse to the most common interaction kind.
const FALLBACK_TYPE_ID: &str = "email";

/// Heuristic for pre-catalog values: display labels carried no hyphen and
/// started uppercase, while catalog ids are lowercase or hyphenated
/// (`custom-` prefixed for user types).
fn is_legacy_label(value: &str) -> bool {
    !value.contains('-') && value.chars().next().is_some_and(|c| c.is_uppercase())
}

fn modern_id(label: &str) -> &'static str {
    LEGACY_LABEL_MAP
        .iter()
        .find(|(legacy, _)| *legacy == label)
        .map(|(_, id)| *id)
        .unwrap_or(FALLBACK_TYPE_ID)
}

/// Remaps legacy event-type labels to catalog ids and marks the dataset
/// migrated. Returns whether the dataset changed (including the flag flip),
/// so the caller knows to persist.
pub(crate) fn migrate_legacy_event_types(data: &mut Dataset) -> bool {
    if data.legacy_types_migrated {
        return false;
    }

    let mut remapped = 0usize;
    for event in &mut data.events {
        if is_legacy_label(&event.kind) {
            event.kind = modern_id(&event.kind).to_string();
            remapped += 1;
        }
    }

    data.legacy_types_migrated = true;
    if remapped > 0 {
        info!("event=dataset_migrated module=store status=ok remapped_events={remapped}");
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_label_detection() {
        assert!(is_legacy_label("Email"));
        assert!(is_legacy_label("Meeting Invite"));
        assert!(!is_legacy_label("email"));
        assert!(!is_legacy_label("linkedin-connection"));
        assert!(!is_legacy_label("custom-1b9d"));
        // Hyphenated display labels never existed, so this stays untouched.
        assert!(!is_legacy_label("Follow-Up"));
    }

    #[test]
    fn unknown_labels_fall_back_to_email() {
        assert_eq!(modern_id("Carrier Pigeon"), "email");
        assert_eq!(modern_id("Meeting Invite"), "meeting");
    }
}
