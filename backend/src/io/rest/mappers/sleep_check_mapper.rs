//! Mapping between the sleep DTOs in `shared` and the domain's sleep checks,
//! sessions and monitor state.

use crate::domain::commands::sleep_checks::{RecordSleepCheckCommand, UpdateSleepCheckCommand};
use crate::domain::durations::{format_duration, format_timer};
use crate::domain::models::sleep_check::{
    parse_timestamp, CheckKind, SleepCheck as DomainSleepCheck, SleepCheckPatch, SleepCheckValidationError,
};
use crate::domain::sleep_monitor::MonitorAction;
use crate::domain::sleep_sessions::{SessionGrouping, SleepSession as DomainSleepSession};
use crate::domain::sleep_timer::{OverdueAlert as DomainOverdueAlert, TimerState};
use shared::{
    MonitorActionRequest, MonitorStatusResponse, OverdueAlert as SharedOverdueAlert, RecordSleepCheckRequest,
    SessionStep as SharedSessionStep, SleepCheck as SharedSleepCheck, SleepCheckKind,
    SleepCheckListResponse, SleepSession as SharedSleepSession, SleepSessionListResponse,
    UpdateSleepCheckRequest,
};

pub struct SleepCheckMapper;

impl SleepCheckMapper {
    pub fn kind_to_domain(kind: SleepCheckKind) -> CheckKind {
        match kind {
            SleepCheckKind::Start => CheckKind::Start,
            SleepCheckKind::Check => CheckKind::Check,
            SleepCheckKind::Stop => CheckKind::Stop,
        }
    }

    pub fn kind_to_dto(kind: CheckKind) -> SleepCheckKind {
        match kind {
            CheckKind::Start => SleepCheckKind::Start,
            CheckKind::Check => SleepCheckKind::Check,
            CheckKind::Stop => SleepCheckKind::Stop,
        }
    }

    pub fn to_dto(domain: &DomainSleepCheck) -> SharedSleepCheck {
        SharedSleepCheck {
            id: domain.id.clone(),
            baby_id: domain.baby_id.clone(),
            caretaker_id: domain.caretaker_id.clone(),
            timestamp: domain.timestamp.to_rfc3339(),
            kind: Self::kind_to_dto(domain.kind),
            position: domain.position.clone(),
            note: domain.note.clone(),
            mood: domain.mood.clone(),
        }
    }

    pub fn to_list_dto(checks: &[DomainSleepCheck]) -> SleepCheckListResponse {
        SleepCheckListResponse {
            checks: checks.iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_record_command(
        baby_id: &str,
        request: RecordSleepCheckRequest,
    ) -> Result<RecordSleepCheckCommand, SleepCheckValidationError> {
        let timestamp = request.timestamp.as_deref().map(parse_timestamp).transpose()?;
        Ok(RecordSleepCheckCommand {
            baby_id: baby_id.to_string(),
            caretaker_id: request.caretaker_id,
            kind: Self::kind_to_domain(request.kind),
            position: request.position,
            note: request.note,
            mood: request.mood,
            timestamp,
        })
    }

    pub fn to_update_command(
        baby_id: &str,
        check_id: &str,
        request: UpdateSleepCheckRequest,
    ) -> Result<UpdateSleepCheckCommand, SleepCheckValidationError> {
        let timestamp = request.timestamp.as_deref().map(parse_timestamp).transpose()?;
        Ok(UpdateSleepCheckCommand {
            baby_id: baby_id.to_string(),
            check_id: check_id.to_string(),
            patch: SleepCheckPatch {
                position: request.position,
                note: request.note,
                mood: request.mood,
                timestamp,
            },
        })
    }

    pub fn session_to_dto(session: &DomainSleepSession) -> SharedSleepSession {
        let total = session.total_duration();
        SharedSleepSession {
            started_at: session.start.timestamp.to_rfc3339(),
            stopped_at: session.stop.as_ref().map(|stop| stop.timestamp.to_rfc3339()),
            is_open: session.is_open,
            total_duration_seconds: total.map(|d| d.num_seconds()),
            total_duration_display: total.map(format_duration),
            steps: session
                .steps()
                .into_iter()
                .map(|step| SharedSessionStep {
                    check: Self::to_dto(step.check),
                    interval_seconds: step.interval.map(|d| d.num_seconds()),
                    interval_display: step.interval.map(format_duration),
                })
                .collect(),
        }
    }

    /// Sessions go out newest first, the order the history screen shows them.
    pub fn to_session_list_dto(grouping: &SessionGrouping) -> SleepSessionListResponse {
        SleepSessionListResponse {
            sessions: grouping.sessions.iter().rev().map(Self::session_to_dto).collect(),
            orphans: grouping.orphans.iter().map(Self::to_dto).collect(),
            malformed_count: grouping.malformed,
        }
    }

    pub fn to_monitor_action(request: MonitorActionRequest) -> MonitorAction {
        MonitorAction {
            caretaker_id: request.caretaker_id,
            position: request.position,
            note: request.note,
            mood: request.mood,
        }
    }

    pub fn alert_to_dto(alert: DomainOverdueAlert) -> SharedOverdueAlert {
        SharedOverdueAlert {
            baby_id: alert.baby_id,
            message: alert.message,
            elapsed_seconds: alert.elapsed_seconds,
            raised_at: alert.raised_at.to_rfc3339(),
        }
    }

    pub fn to_monitor_status_dto(
        baby_id: &str,
        state: TimerState,
        alerts: Vec<DomainOverdueAlert>,
    ) -> MonitorStatusResponse {
        MonitorStatusResponse {
            baby_id: baby_id.to_string(),
            running: state.running,
            elapsed_seconds: state.elapsed_seconds,
            elapsed_display: format_timer(state.elapsed_seconds),
            alarm_triggered: state.alarm_triggered,
            alerts: alerts.into_iter().map(Self::alert_to_dto).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sleep_sessions::group_sleep_checks;
    use chrono::{Duration, TimeZone, Utc};

    fn check(id: &str, kind: CheckKind, offset_secs: i64) -> DomainSleepCheck {
        DomainSleepCheck {
            id: id.to_string(),
            baby_id: "baby-1".to_string(),
            caretaker_id: "staff-1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 13, 0, 0).unwrap() + Duration::seconds(offset_secs),
            kind,
            position: "Back".to_string(),
            note: None,
            mood: None,
        }
    }

    #[test]
    fn test_session_dto_intervals_and_totals() {
        let grouping = group_sleep_checks(vec![
            check("a", CheckKind::Start, 0),
            check("b", CheckKind::Check, 300),
            check("c", CheckKind::Stop, 700),
            check("d", CheckKind::Start, 1_000),
        ]);

        let dto = SleepCheckMapper::to_session_list_dto(&grouping);
        assert_eq!(dto.sessions.len(), 2);
        assert!(dto.sessions[0].is_open);

        let closed = &dto.sessions[1];
        assert_eq!(closed.total_duration_seconds, Some(700));
        assert_eq!(closed.total_duration_display.as_deref(), Some("11m 40s"));
        let intervals: Vec<Option<i64>> = closed.steps.iter().map(|s| s.interval_seconds).collect();
        assert_eq!(intervals, vec![None, Some(300), Some(400)]);
        assert_eq!(closed.steps[2].interval_display.as_deref(), Some("6m 40s"));
    }

    #[test]
    fn test_record_command_rejects_bad_timestamp() {
        let request = RecordSleepCheckRequest {
            caretaker_id: "staff-1".to_string(),
            kind: SleepCheckKind::Check,
            position: "Side".to_string(),
            note: None,
            mood: None,
            timestamp: Some("yesterday".to_string()),
        };
        assert!(matches!(
            SleepCheckMapper::to_record_command("baby-1", request),
            Err(SleepCheckValidationError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_monitor_status_display() {
        let state = TimerState {
            elapsed_seconds: 605,
            running: true,
            alarm_triggered: true,
        };
        let dto = SleepCheckMapper::to_monitor_status_dto("baby-1", state, Vec::new());
        assert_eq!(dto.elapsed_display, "10:05");
        assert!(dto.alarm_triggered);
    }
}
