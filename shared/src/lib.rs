//! Wire types shared between the babylog backend and its clients.
//!
//! Timestamps travel as RFC 3339 strings and calendar dates as `YYYY-MM-DD`,
//! the same way the backend stores them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A baby enrolled in the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baby {
    pub id: String,
    pub name: String,
    /// YYYY-MM-DD
    pub dob: Option<String>,
    /// Address that receives daily reports
    pub parent_email: Option<String>,
    /// RFC 3339
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBabyRequest {
    pub name: String,
    /// YYYY-MM-DD
    pub dob: Option<String>,
    pub parent_email: Option<String>,
}

/// Profile edit. Absent fields are left unchanged; an empty parent email
/// removes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBabyRequest {
    pub name: Option<String>,
    /// YYYY-MM-DD
    pub dob: Option<String>,
    pub parent_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BabyResponse {
    pub baby: Baby,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BabyListResponse {
    pub babies: Vec<Baby>,
}

/// Kind of sleep check event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepCheckKind {
    /// Baby was put down to sleep
    Start,
    /// Caretaker looked in on a sleeping baby
    Check,
    /// Baby woke up
    Stop,
}

impl fmt::Display for SleepCheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SleepCheckKind::Start => "start",
            SleepCheckKind::Check => "check",
            SleepCheckKind::Stop => "stop",
        };
        write!(f, "{}", label)
    }
}

/// One caretaker observation in a baby's sleep stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepCheck {
    pub id: String,
    pub baby_id: String,
    pub caretaker_id: String,
    /// RFC 3339
    pub timestamp: String,
    pub kind: SleepCheckKind,
    pub position: String,
    pub note: Option<String>,
    pub mood: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSleepCheckRequest {
    pub caretaker_id: String,
    pub kind: SleepCheckKind,
    pub position: String,
    pub note: Option<String>,
    pub mood: Option<String>,
    /// Optional RFC 3339 override - uses current time if not provided
    pub timestamp: Option<String>,
}

/// Partial update of a stored sleep check. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSleepCheckRequest {
    pub position: Option<String>,
    pub note: Option<String>,
    pub mood: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepCheckListResponse {
    /// Newest first
    pub checks: Vec<SleepCheck>,
}

/// One row of a session table: an event and the time since the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStep {
    pub check: SleepCheck,
    pub interval_seconds: Option<i64>,
    /// e.g. "5m 0s"
    pub interval_display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    pub started_at: String,
    pub stopped_at: Option<String>,
    /// True only for the trailing session that is still in progress
    pub is_open: bool,
    pub total_duration_seconds: Option<i64>,
    pub total_duration_display: Option<String>,
    pub steps: Vec<SessionStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSessionListResponse {
    /// Oldest first
    pub sessions: Vec<SleepSession>,
    /// Checks and stops that arrived with no open session
    pub orphans: Vec<SleepCheck>,
    /// Stored rows skipped because they lacked a timestamp or kind
    pub malformed_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorActionRequest {
    pub caretaker_id: String,
    pub position: String,
    pub note: Option<String>,
    /// Only accepted on stop
    pub mood: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueAlert {
    pub baby_id: String,
    pub message: String,
    pub elapsed_seconds: u64,
    /// RFC 3339
    pub raised_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorStatusResponse {
    pub baby_id: String,
    pub running: bool,
    pub elapsed_seconds: u64,
    /// "MM:SS"
    pub elapsed_display: String,
    pub alarm_triggered: bool,
    /// Alerts raised since the monitor was created, oldest first
    pub alerts: Vec<OverdueAlert>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiaperKind {
    Wet,
    Dirty,
    Mixed,
    Dry,
}

impl fmt::Display for DiaperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiaperKind::Wet => "wet",
            DiaperKind::Dirty => "dirty",
            DiaperKind::Mixed => "mixed",
            DiaperKind::Dry => "dry",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaperLog {
    pub id: String,
    pub baby_id: String,
    pub kind: DiaperKind,
    pub note: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDiaperLogRequest {
    pub kind: DiaperKind,
    pub note: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingLog {
    pub id: String,
    pub baby_id: String,
    pub food: String,
    pub note: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFeedingLogRequest {
    pub food: String,
    pub note: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleLog {
    pub id: String,
    pub baby_id: String,
    /// Ounces
    pub amount: f64,
    pub note: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBottleLogRequest {
    pub amount: f64,
    pub note: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaperLogListResponse {
    pub logs: Vec<DiaperLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingLogListResponse {
    pub logs: Vec<FeedingLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleLogListResponse {
    pub logs: Vec<BottleLog>,
}

/// Everything logged for a baby on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLogs {
    /// YYYY-MM-DD
    pub date: String,
    pub sleep_checks: Vec<SleepCheck>,
    pub diapers: Vec<DiaperLog>,
    pub feedings: Vec<FeedingLog>,
    pub bottles: Vec<BottleLog>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLogsResponse {
    /// Newest date first
    pub days: Vec<DailyLogs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendReportRequest {
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReportResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_check_kind_serializes_lowercase() {
        let json = serde_json::to_string(&SleepCheckKind::Start).unwrap();
        assert_eq!(json, "\"start\"");
        let kind: SleepCheckKind = serde_json::from_str("\"stop\"").unwrap();
        assert_eq!(kind, SleepCheckKind::Stop);
    }

    #[test]
    fn test_send_report_request_date_is_optional() {
        let request: SendReportRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.date, None);
    }

    #[test]
    fn test_update_baby_request_fields_are_optional() {
        let request: UpdateBabyRequest = serde_json::from_str(r#"{"parent_email":"parent@example.com"}"#).unwrap();
        assert_eq!(request.name, None);
        assert_eq!(request.parent_email.as_deref(), Some("parent@example.com"));
    }

    #[test]
    fn test_diaper_kind_display() {
        assert_eq!(DiaperKind::Mixed.to_string(), "mixed");
    }
}
