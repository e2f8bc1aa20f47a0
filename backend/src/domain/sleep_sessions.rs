//! Sleep session reconstruction.
//!
//! A baby's sleep checks form a flat stream of `start`, `check` and `stop`
//! events. [`group_sleep_checks`] turns that stream into bounded sessions:
//!
//! - events are ordered by timestamp, ties broken by id, so the result does
//!   not depend on the order the store returned them in
//! - at most one session is open at a time; a `start` while a session is
//!   open truncates it (it is kept, without a stop) and opens a new one, so
//!   when two caretakers start a nap concurrently the later start wins
//! - a `check` or `stop` with no open session is an orphan; orphans never
//!   join a session but are returned separately for audit display
//!
//! Sessions are a pure projection of the event list. Callers rebuild them
//! whenever the stream changes and never patch them in place.

use chrono::Duration;
use tracing::{debug, warn};

use crate::domain::models::sleep_check::{CheckKind, SleepCheck, SleepCheckRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct SleepSession {
    pub start: SleepCheck,
    pub checks: Vec<SleepCheck>,
    pub stop: Option<SleepCheck>,
    /// True only for the trailing session that is still in progress. A
    /// session truncated by a later start has no stop and is not open.
    pub is_open: bool,
}

/// One row of a session: an event and the time since the previous event.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStep<'a> {
    pub check: &'a SleepCheck,
    /// None for the opening start
    pub interval: Option<Duration>,
}

impl SleepSession {
    fn open(start: SleepCheck) -> Self {
        Self {
            start,
            checks: Vec::new(),
            stop: None,
            is_open: false,
        }
    }

    /// `stop - start`, only for sessions that were stopped
    pub fn total_duration(&self) -> Option<Duration> {
        self.stop
            .as_ref()
            .map(|stop| stop.timestamp - self.start.timestamp)
    }

    /// The start, each check, then the stop if there is one
    pub fn events(&self) -> impl Iterator<Item = &SleepCheck> {
        std::iter::once(&self.start)
            .chain(self.checks.iter())
            .chain(self.stop.iter())
    }

    pub fn last_event(&self) -> &SleepCheck {
        self.stop
            .as_ref()
            .or_else(|| self.checks.last())
            .unwrap_or(&self.start)
    }

    pub fn steps(&self) -> Vec<SessionStep<'_>> {
        let mut previous: Option<&SleepCheck> = None;
        self.events()
            .map(|check| {
                let interval = previous.map(|p| check.timestamp - p.timestamp);
                previous = Some(check);
                SessionStep { check, interval }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionGrouping {
    /// Oldest first
    pub sessions: Vec<SleepSession>,
    /// Checks and stops that arrived with no open session, in time order
    pub orphans: Vec<SleepCheck>,
    /// Stored rows dropped before grouping for lacking a timestamp or kind
    pub malformed: usize,
}

impl SessionGrouping {
    /// The session still in progress, if any
    pub fn open_session(&self) -> Option<&SleepSession> {
        self.sessions.last().filter(|s| s.is_open)
    }
}

/// Group raw stored rows, first dropping the malformed ones.
pub fn group_records<I>(records: I) -> SessionGrouping
where
    I: IntoIterator<Item = SleepCheckRecord>,
{
    let mut malformed = 0;
    let checks: Vec<SleepCheck> = records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match SleepCheck::try_from(record) {
                Ok(check) => Some(check),
                Err(e) => {
                    warn!("Skipping malformed sleep check {}: {}", id, e);
                    malformed += 1;
                    None
                }
            }
        })
        .collect();

    let mut grouping = group_sleep_checks(checks);
    grouping.malformed = malformed;
    grouping
}

/// Partition one baby's sleep checks into sessions.
pub fn group_sleep_checks(mut checks: Vec<SleepCheck>) -> SessionGrouping {
    checks.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

    let mut sessions = Vec::new();
    let mut orphans = Vec::new();
    let mut current: Option<SleepSession> = None;

    for check in checks {
        match check.kind {
            CheckKind::Start => {
                if let Some(truncated) = current.take() {
                    debug!(
                        "Session started at {} truncated by start {}",
                        truncated.start.timestamp, check.id
                    );
                    sessions.push(truncated);
                }
                current = Some(SleepSession::open(check));
            }
            CheckKind::Check => match current.as_mut() {
                Some(session) => session.checks.push(check),
                None => orphans.push(check),
            },
            CheckKind::Stop => match current.take() {
                Some(mut session) => {
                    session.stop = Some(check);
                    sessions.push(session);
                }
                None => orphans.push(check),
            },
        }
    }

    if let Some(mut open) = current {
        open.is_open = true;
        sessions.push(open);
    }

    SessionGrouping {
        sessions,
        orphans,
        malformed: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 13, 0, 0).unwrap()
    }

    fn event(id: &str, kind: CheckKind, offset_secs: i64, position: &str) -> SleepCheck {
        SleepCheck {
            id: id.to_string(),
            baby_id: "baby-1".to_string(),
            caretaker_id: "staff-1".to_string(),
            timestamp: t0() + Duration::seconds(offset_secs),
            kind,
            position: position.to_string(),
            note: None,
            mood: None,
        }
    }

    fn sample_stream() -> Vec<SleepCheck> {
        vec![
            event("a", CheckKind::Start, 0, "Back"),
            event("b", CheckKind::Check, 300, "Side"),
            event("c", CheckKind::Stop, 700, "Tummy"),
            event("d", CheckKind::Check, 800, "Back"),
            event("e", CheckKind::Start, 1_000, "Back"),
            event("f", CheckKind::Start, 1_050, "Side"),
            event("g", CheckKind::Check, 1_200, "Side"),
        ]
    }

    #[test]
    fn test_start_check_stop_scenario() {
        let mut stop = event("c", CheckKind::Stop, 700, "Tummy");
        stop.mood = Some("happy".to_string());
        let grouping = group_sleep_checks(vec![
            event("a", CheckKind::Start, 0, "Back"),
            event("b", CheckKind::Check, 300, "Side"),
            stop,
        ]);

        assert_eq!(grouping.sessions.len(), 1);
        let session = &grouping.sessions[0];
        assert_eq!(session.total_duration(), Some(Duration::seconds(700)));
        assert!(!session.is_open);

        let steps = session.steps();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].interval, None);
        assert_eq!(steps[1].interval, Some(Duration::seconds(300)));
        assert_eq!(steps[2].interval, Some(Duration::seconds(400)));
        assert_eq!(steps[2].check.mood.as_deref(), Some("happy"));
    }

    #[test]
    fn test_start_while_open_truncates_previous_session() {
        let grouping = group_sleep_checks(vec![
            event("a", CheckKind::Start, 0, "Back"),
            event("b", CheckKind::Start, 50, "Side"),
        ]);

        assert_eq!(grouping.sessions.len(), 2);
        let first = &grouping.sessions[0];
        assert!(first.stop.is_none());
        assert!(!first.is_open);
        assert_eq!(first.total_duration(), None);

        let second = &grouping.sessions[1];
        assert_eq!(second.start.timestamp, t0() + Duration::seconds(50));
        assert!(second.checks.is_empty());
        assert!(second.is_open);
        assert_eq!(grouping.open_session().map(|s| s.start.id.as_str()), Some("b"));
    }

    #[test]
    fn test_at_most_one_open_session() {
        let grouping = group_sleep_checks(sample_stream());
        assert_eq!(grouping.sessions.iter().filter(|s| s.is_open).count(), 1);
        assert_eq!(grouping.sessions.len(), 3);
    }

    #[test]
    fn test_orphans_are_kept_out_of_sessions() {
        let grouping = group_sleep_checks(vec![
            event("x", CheckKind::Check, 0, "Back"),
            event("y", CheckKind::Stop, 10, "Back"),
            event("a", CheckKind::Start, 20, "Back"),
            event("b", CheckKind::Stop, 30, "Back"),
            event("z", CheckKind::Stop, 40, "Back"),
        ]);

        assert_eq!(grouping.sessions.len(), 1);
        let orphan_ids: Vec<&str> = grouping.orphans.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(orphan_ids, vec!["x", "y", "z"]);
        assert!(grouping.open_session().is_none());
    }

    #[test]
    fn test_order_independence() {
        let expected = group_sleep_checks(sample_stream());

        let mut reversed = sample_stream();
        reversed.reverse();
        assert_eq!(group_sleep_checks(reversed), expected);

        let mut rotated = sample_stream();
        rotated.rotate_left(3);
        assert_eq!(group_sleep_checks(rotated), expected);
    }

    #[test]
    fn test_grouping_is_idempotent() {
        let once = group_sleep_checks(sample_stream());
        let twice = group_sleep_checks(sample_stream());
        assert_eq!(once, twice);

        // regrouping the events a grouping produced gives the same grouping
        let flattened: Vec<SleepCheck> = once
            .sessions
            .iter()
            .flat_map(|s| s.events().cloned())
            .chain(once.orphans.iter().cloned())
            .collect();
        assert_eq!(group_sleep_checks(flattened), once);
    }

    #[test]
    fn test_timestamp_ties_are_broken_by_id() {
        let a = group_sleep_checks(vec![
            event("2", CheckKind::Stop, 0, "Back"),
            event("1", CheckKind::Start, 0, "Back"),
        ]);
        let b = group_sleep_checks(vec![
            event("1", CheckKind::Start, 0, "Back"),
            event("2", CheckKind::Stop, 0, "Back"),
        ]);
        assert_eq!(a, b);
        assert_eq!(a.sessions[0].total_duration(), Some(Duration::zero()));
    }

    #[test]
    fn test_group_records_filters_malformed_rows() {
        let valid = |id: &str, kind: &str, ts: &str| SleepCheckRecord {
            id: id.to_string(),
            baby_id: "baby-1".to_string(),
            caretaker_id: "staff-1".to_string(),
            timestamp: Some(ts.to_string()),
            kind: Some(kind.to_string()),
            position: "Back".to_string(),
            note: None,
            mood: None,
        };
        let mut missing_timestamp = valid("m1", "check", "");
        missing_timestamp.timestamp = None;
        let mut missing_kind = valid("m2", "", "2025-03-01T13:02:00Z");
        missing_kind.kind = None;

        let grouping = group_records(vec![
            valid("a", "start", "2025-03-01T13:00:00Z"),
            missing_timestamp,
            valid("m3", "nap", "2025-03-01T13:03:00Z"),
            missing_kind,
            valid("b", "restart", "2025-03-01T13:05:00Z"),
            valid("c", "stop", "2025-03-01T13:10:00Z"),
        ]);

        assert_eq!(grouping.malformed, 3);
        assert_eq!(grouping.sessions.len(), 1);
        let session = &grouping.sessions[0];
        assert_eq!(session.checks.len(), 1);
        assert_eq!(session.total_duration(), Some(Duration::minutes(10)));
    }

    #[test]
    fn test_last_event_of_open_session() {
        let grouping = group_sleep_checks(vec![
            event("a", CheckKind::Start, 0, "Back"),
            event("b", CheckKind::Check, 120, "Side"),
        ]);
        let open = grouping.open_session().unwrap();
        assert_eq!(open.last_event().id, "b");
    }

    #[test]
    fn test_empty_stream() {
        let grouping = group_sleep_checks(Vec::new());
        assert!(grouping.sessions.is_empty());
        assert!(grouping.orphans.is_empty());
        assert!(grouping.open_session().is_none());
    }
}
