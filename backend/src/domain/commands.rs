//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are not
//! exposed over the public API. The REST layer maps the DTOs from the
//! `shared` crate onto them.

pub mod babies {
    use chrono::NaiveDate;

    /// Input for registering a new baby.
    #[derive(Debug, Clone)]
    pub struct CreateBabyCommand {
        pub name: String,
        pub dob: Option<NaiveDate>,
        pub parent_email: Option<String>,
    }

    /// Profile edit. Absent fields are left unchanged; a blank parent email
    /// removes it.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateBabyCommand {
        pub baby_id: String,
        pub name: Option<String>,
        pub dob: Option<NaiveDate>,
        pub parent_email: Option<String>,
    }
}

pub mod sleep_checks {
    use chrono::{DateTime, Utc};

    use crate::domain::models::sleep_check::{CheckKind, SleepCheckPatch};

    /// Input for recording a sleep check outside the live monitor, e.g. a
    /// check entered after the fact. The timestamp defaults to now.
    #[derive(Debug, Clone)]
    pub struct RecordSleepCheckCommand {
        pub baby_id: String,
        pub caretaker_id: String,
        pub kind: CheckKind,
        pub position: String,
        pub note: Option<String>,
        pub mood: Option<String>,
        pub timestamp: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateSleepCheckCommand {
        pub baby_id: String,
        pub check_id: String,
        pub patch: SleepCheckPatch,
    }
}

pub mod care_logs {
    /// Input for creating any care log. `log` carries the entered fields;
    /// its id is assigned by the store.
    #[derive(Debug, Clone)]
    pub struct CreateCareLogCommand<T> {
        pub baby_id: String,
        pub log: T,
    }
}

pub mod reports {
    use chrono::NaiveDate;

    /// Input for emailing a day's report to the baby's parent.
    #[derive(Debug, Clone)]
    pub struct SendReportCommand {
        pub baby_id: String,
        /// UTC calendar day; today when absent
        pub date: Option<NaiveDate>,
    }
}
