//! Per-day views over a baby's logs, used by the archive screen and the
//! daily email report. Days are UTC calendar dates.

use anyhow::Result;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

use crate::domain::care_log_service::CareLogService;
use crate::domain::models::care_log::{BottleLog, DiaperLog, FeedingLog};
use crate::domain::models::sleep_check::SleepCheck;
use crate::domain::models::Timestamped;
use crate::domain::sleep_check_service::SleepCheckService;
use crate::domain::sleep_sessions::SleepSession;

/// Bucket logs by the UTC date of their timestamp. Each bucket keeps the
/// input order.
pub fn group_by_date<T: Timestamped>(logs: impl IntoIterator<Item = T>) -> BTreeMap<NaiveDate, Vec<T>> {
    let mut days: BTreeMap<NaiveDate, Vec<T>> = BTreeMap::new();
    for log in logs {
        days.entry(log.timestamp().date_naive()).or_default().push(log);
    }
    days
}

/// Sessions with at least one event on `date`. Sessions come from grouping
/// the whole stream, so one that crosses midnight shows up on both days
/// with its real start, stop and open state.
pub fn sessions_on(sessions: Vec<SleepSession>, date: NaiveDate) -> Vec<SleepSession> {
    sessions
        .into_iter()
        .filter(|session| session.events().any(|check| check.timestamp.date_naive() == date))
        .collect()
}

/// Everything logged for one baby on one day
#[derive(Debug, Clone, PartialEq)]
pub struct DailyLogs {
    pub date: NaiveDate,
    /// Oldest first
    pub sleep_checks: Vec<SleepCheck>,
    pub diapers: Vec<DiaperLog>,
    pub feedings: Vec<FeedingLog>,
    pub bottles: Vec<BottleLog>,
}

impl DailyLogs {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            sleep_checks: Vec::new(),
            diapers: Vec::new(),
            feedings: Vec::new(),
            bottles: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sleep_checks.is_empty() && self.diapers.is_empty() && self.feedings.is_empty() && self.bottles.is_empty()
    }
}

fn oldest_first<T: Timestamped>(mut logs: Vec<T>) -> Vec<T> {
    logs.sort_by_key(|log| log.timestamp());
    logs
}

#[derive(Clone)]
pub struct DailyLogService {
    sleep_check_service: SleepCheckService,
    diaper_service: CareLogService<DiaperLog>,
    feeding_service: CareLogService<FeedingLog>,
    bottle_service: CareLogService<BottleLog>,
}

impl DailyLogService {
    pub fn new(
        sleep_check_service: SleepCheckService,
        diaper_service: CareLogService<DiaperLog>,
        feeding_service: CareLogService<FeedingLog>,
        bottle_service: CareLogService<BottleLog>,
    ) -> Self {
        Self {
            sleep_check_service,
            diaper_service,
            feeding_service,
            bottle_service,
        }
    }

    /// The archive: one entry per day that has any log, newest day first.
    pub async fn list_days(&self, baby_id: &str) -> Result<Vec<DailyLogs>> {
        let mut sleep_checks = group_by_date(self.sleep_check_service.list_checks(baby_id).await?);
        let mut diapers = group_by_date(self.diaper_service.list_logs(baby_id).await?);
        let mut feedings = group_by_date(self.feeding_service.list_logs(baby_id).await?);
        let mut bottles = group_by_date(self.bottle_service.list_logs(baby_id).await?);

        let dates: BTreeSet<NaiveDate> = sleep_checks
            .keys()
            .chain(diapers.keys())
            .chain(feedings.keys())
            .chain(bottles.keys())
            .copied()
            .collect();

        let days: Vec<DailyLogs> = dates
            .into_iter()
            .rev()
            .map(|date| DailyLogs {
                date,
                sleep_checks: oldest_first(sleep_checks.remove(&date).unwrap_or_default()),
                diapers: oldest_first(diapers.remove(&date).unwrap_or_default()),
                feedings: oldest_first(feedings.remove(&date).unwrap_or_default()),
                bottles: oldest_first(bottles.remove(&date).unwrap_or_default()),
            })
            .collect();

        info!("Found logs on {} days for baby {}", days.len(), baby_id);
        Ok(days)
    }

    /// Sleep sessions touching one day, oldest first.
    pub async fn sessions_for_date(&self, baby_id: &str, date: NaiveDate) -> Result<Vec<SleepSession>> {
        let grouping = self.sleep_check_service.list_sessions(baby_id).await?;
        Ok(sessions_on(grouping.sessions, date))
    }

    /// Logs for a single day. The result is empty when nothing was logged.
    pub async fn for_date(&self, baby_id: &str, date: NaiveDate) -> Result<DailyLogs> {
        let day = self
            .list_days(baby_id)
            .await?
            .into_iter()
            .find(|day| day.date == date)
            .unwrap_or_else(|| DailyLogs::new(date));
        if day.is_empty() {
            warn!("No logs on {} for baby {}", date, baby_id);
        }
        Ok(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    struct Entry(DateTime<Utc>, &'static str);

    impl Timestamped for Entry {
        fn timestamp(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_group_by_date_uses_utc_days() {
        let entries = vec![
            Entry(Utc.with_ymd_and_hms(2025, 3, 1, 23, 59, 59).unwrap(), "late"),
            Entry(Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap(), "midnight"),
            Entry(Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(), "morning"),
        ];

        let days = group_by_date(entries);
        let keys: Vec<String> = days.keys().map(|d| d.format("%Y-%m-%d").to_string()).collect();
        assert_eq!(keys, vec!["2025-03-01", "2025-03-02"]);

        let first: Vec<&str> = days.values().next().unwrap().iter().map(|e| e.1).collect();
        assert_eq!(first, vec!["late", "morning"]);
    }

    #[test]
    fn test_sessions_on_includes_sessions_crossing_midnight() {
        use crate::domain::models::sleep_check::{CheckKind, SleepCheck};
        use crate::domain::sleep_sessions::group_sleep_checks;

        let at = |id: &str, kind, y, m, d, h, min| SleepCheck {
            id: id.to_string(),
            baby_id: "baby-1".to_string(),
            caretaker_id: "staff-1".to_string(),
            timestamp: Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap(),
            kind,
            position: "Back".to_string(),
            note: None,
            mood: None,
        };
        let grouping = group_sleep_checks(vec![
            at("a", CheckKind::Start, 2025, 3, 1, 13, 0),
            at("b", CheckKind::Stop, 2025, 3, 1, 14, 0),
            at("c", CheckKind::Start, 2025, 3, 1, 23, 30),
            at("d", CheckKind::Stop, 2025, 3, 2, 1, 0),
        ]);

        let first = sessions_on(grouping.sessions.clone(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        let starts: Vec<&str> = first.iter().map(|s| s.start.id.as_str()).collect();
        assert_eq!(starts, vec!["a", "c"]);
        assert!(!first[1].is_open);

        let second = sessions_on(grouping.sessions, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].start.id, "c");
    }

    #[test]
    fn test_group_by_date_empty() {
        assert!(group_by_date(Vec::<Entry>::new()).is_empty());
    }
}
