//! # REST API Interface Layer
//!
//! Provides HTTP REST endpoints for babylog.
//! This layer handles:
//! - HTTP request/response serialization and deserialization
//! - Mapping public DTOs from `shared` onto domain commands
//! - Error translation from domain to HTTP status codes
//! - Request logging
//!
//! Handlers hold no business logic. Every route is nested under a baby,
//! e.g. `/api/babies/:baby_id/sleep-checks`.

pub mod baby_apis;
pub mod care_log_apis;
pub mod daily_log_apis;
pub mod error;
pub mod mappers;
pub mod monitor_apis;
pub mod report_apis;
pub mod sleep_check_apis;

pub use baby_apis::*;
pub use care_log_apis::*;
pub use daily_log_apis::*;
pub use monitor_apis::*;
pub use report_apis::*;
pub use sleep_check_apis::*;
