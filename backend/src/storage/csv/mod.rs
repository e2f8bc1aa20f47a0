//! File-based storage: YAML profiles and CSV tables under one data directory.
//!
//! ```text
//! <data dir>/
//!   <baby id>/
//!     baby.yaml
//!     sleep_checks.csv
//!     diapers.csv
//!     feedings.csv
//!     bottles.csv
//! ```

pub mod baby_repository;
pub mod care_log_repository;
pub mod connection;
pub mod sleep_check_repository;

pub use baby_repository::BabyRepository;
pub use care_log_repository::CareLogRepository;
pub use connection::CsvConnection;
pub use sleep_check_repository::SleepCheckRepository;
