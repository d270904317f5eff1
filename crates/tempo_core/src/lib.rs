//! Core domain logic for Tempo, a single-user outreach tracker.
//! This crate is the single source of truth for business invariants.

pub mod catalog;
pub mod csv;
pub mod followup;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;

pub use csv::{export_csv, parse_csv, CsvDataset, FormatError};
pub use followup::{follow_up_status, FollowUpStatus, Urgency};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{
    Company, CompanyDraft, Event, EventDraft, EventTypeCategory, EventTypeDefinition, Person,
    PersonDraft, PersonStatus, ValidationError,
};
pub use storage::{BlobStore, MemoryBlobStore, SqliteBlobStore, StorageError};
pub use store::{
    export_file_name, Dataset, DeleteEventTypeOutcome, EventTypePatch, ImportSummary, Store,
    StoreError, StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
