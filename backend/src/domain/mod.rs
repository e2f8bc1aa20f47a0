//! # Domain Module
//!
//! Contains all business logic for babylog.
//!
//! This module models a daycare's care log for each baby: sleep checks made
//! at regular intervals during naps, plus diaper, feeding and bottle logs.
//! It operates independently of any specific UI framework or storage
//! mechanism.
//!
//! ## Module Organization
//!
//! - **sleep_sessions**: Groups the flat sleep check stream into sessions
//! - **sleep_timer**: Elapsed-since-last-check counter and overdue alarm
//! - **sleep_monitor**: Live monitor per baby that records start, check and
//!   stop and drives the timer
//! - **sleep_check_service**: Recording, editing and listing sleep checks
//! - **care_log_service**: Diaper, feeding and bottle logs
//! - **daily_logs**: Per-day archive of all logs
//! - **report_service**: Daily email report to the parent
//! - **email_service** / **email_config_service**: SMTP delivery and its settings
//!
//! ## Business Rules
//!
//! - A session is a start, any number of checks, and an optional stop
//! - At most one session is open per baby; a new start truncates it
//! - Checks and stops outside any session are orphans and are never merged
//! - The overdue alarm fires once when ten minutes pass without a check
//! - A monitor action only takes effect once its event has been stored
//! - Days are UTC calendar dates

pub mod baby_service;
pub mod care_log_service;
pub mod commands;
pub mod daily_logs;
pub mod durations;
pub mod email_config_service;
pub mod email_service;
pub mod models;
pub mod report_service;
pub mod sleep_check_service;
pub mod sleep_monitor;
pub mod sleep_sessions;
pub mod sleep_timer;

pub use baby_service::BabyService;
pub use care_log_service::CareLogService;
pub use daily_logs::DailyLogService;
pub use email_config_service::EmailConfigService;
pub use email_service::{EmailConfig, SmtpReportSender};
pub use report_service::{LoggingReportSender, ReportSender, ReportService};
pub use sleep_check_service::SleepCheckService;
pub use sleep_monitor::{MonitorRegistry, SleepMonitor};
