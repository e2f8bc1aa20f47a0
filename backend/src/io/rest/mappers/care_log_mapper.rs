use chrono::Utc;

use crate::domain::commands::care_logs::CreateCareLogCommand;
use crate::domain::daily_logs::DailyLogs as DomainDailyLogs;
use crate::domain::models::care_log::{
    BottleLog as DomainBottleLog, DiaperKind as DomainDiaperKind, DiaperLog as DomainDiaperLog,
    FeedingLog as DomainFeedingLog,
};
use crate::domain::models::sleep_check::{parse_timestamp, SleepCheckValidationError};
use crate::io::rest::mappers::SleepCheckMapper;
use shared::{
    BottleLog as SharedBottleLog, BottleLogListResponse, CreateBottleLogRequest, CreateDiaperLogRequest,
    CreateFeedingLogRequest, DailyLogs as SharedDailyLogs, DailyLogsResponse, DiaperKind as SharedDiaperKind,
    DiaperLog as SharedDiaperLog, DiaperLogListResponse, FeedingLog as SharedFeedingLog, FeedingLogListResponse,
};

/// Mapper for the diaper, feeding and bottle DTOs and the daily archive.
pub struct CareLogMapper;

fn parse_optional_timestamp(raw: Option<String>) -> Result<chrono::DateTime<Utc>, SleepCheckValidationError> {
    match raw {
        Some(raw) => parse_timestamp(&raw),
        None => Ok(Utc::now()),
    }
}

fn trimmed_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

impl CareLogMapper {
    fn diaper_kind_to_domain(kind: SharedDiaperKind) -> DomainDiaperKind {
        match kind {
            SharedDiaperKind::Wet => DomainDiaperKind::Wet,
            SharedDiaperKind::Dirty => DomainDiaperKind::Dirty,
            SharedDiaperKind::Mixed => DomainDiaperKind::Mixed,
            SharedDiaperKind::Dry => DomainDiaperKind::Dry,
        }
    }

    fn diaper_kind_to_dto(kind: DomainDiaperKind) -> SharedDiaperKind {
        match kind {
            DomainDiaperKind::Wet => SharedDiaperKind::Wet,
            DomainDiaperKind::Dirty => SharedDiaperKind::Dirty,
            DomainDiaperKind::Mixed => SharedDiaperKind::Mixed,
            DomainDiaperKind::Dry => SharedDiaperKind::Dry,
        }
    }

    pub fn to_diaper_command(
        baby_id: &str,
        request: CreateDiaperLogRequest,
    ) -> Result<CreateCareLogCommand<DomainDiaperLog>, SleepCheckValidationError> {
        Ok(CreateCareLogCommand {
            baby_id: baby_id.to_string(),
            log: DomainDiaperLog {
                id: String::new(),
                baby_id: baby_id.to_string(),
                kind: Self::diaper_kind_to_domain(request.kind),
                note: trimmed_note(request.note),
                timestamp: parse_optional_timestamp(request.timestamp)?,
            },
        })
    }

    pub fn to_feeding_command(
        baby_id: &str,
        request: CreateFeedingLogRequest,
    ) -> Result<CreateCareLogCommand<DomainFeedingLog>, SleepCheckValidationError> {
        Ok(CreateCareLogCommand {
            baby_id: baby_id.to_string(),
            log: DomainFeedingLog {
                id: String::new(),
                baby_id: baby_id.to_string(),
                food: request.food.trim().to_string(),
                note: trimmed_note(request.note),
                timestamp: parse_optional_timestamp(request.timestamp)?,
            },
        })
    }

    pub fn to_bottle_command(
        baby_id: &str,
        request: CreateBottleLogRequest,
    ) -> Result<CreateCareLogCommand<DomainBottleLog>, SleepCheckValidationError> {
        Ok(CreateCareLogCommand {
            baby_id: baby_id.to_string(),
            log: DomainBottleLog {
                id: String::new(),
                baby_id: baby_id.to_string(),
                amount: request.amount,
                note: trimmed_note(request.note),
                timestamp: parse_optional_timestamp(request.timestamp)?,
            },
        })
    }

    pub fn diaper_to_dto(domain: &DomainDiaperLog) -> SharedDiaperLog {
        SharedDiaperLog {
            id: domain.id.clone(),
            baby_id: domain.baby_id.clone(),
            kind: Self::diaper_kind_to_dto(domain.kind),
            note: domain.note.clone(),
            timestamp: domain.timestamp.to_rfc3339(),
        }
    }

    pub fn feeding_to_dto(domain: &DomainFeedingLog) -> SharedFeedingLog {
        SharedFeedingLog {
            id: domain.id.clone(),
            baby_id: domain.baby_id.clone(),
            food: domain.food.clone(),
            note: domain.note.clone(),
            timestamp: domain.timestamp.to_rfc3339(),
        }
    }

    pub fn bottle_to_dto(domain: &DomainBottleLog) -> SharedBottleLog {
        SharedBottleLog {
            id: domain.id.clone(),
            baby_id: domain.baby_id.clone(),
            amount: domain.amount,
            note: domain.note.clone(),
            timestamp: domain.timestamp.to_rfc3339(),
        }
    }

    pub fn to_diaper_list_dto(logs: &[DomainDiaperLog]) -> DiaperLogListResponse {
        DiaperLogListResponse {
            logs: logs.iter().map(Self::diaper_to_dto).collect(),
        }
    }

    pub fn to_feeding_list_dto(logs: &[DomainFeedingLog]) -> FeedingLogListResponse {
        FeedingLogListResponse {
            logs: logs.iter().map(Self::feeding_to_dto).collect(),
        }
    }

    pub fn to_bottle_list_dto(logs: &[DomainBottleLog]) -> BottleLogListResponse {
        BottleLogListResponse {
            logs: logs.iter().map(Self::bottle_to_dto).collect(),
        }
    }

    pub fn to_daily_logs_dto(days: Vec<DomainDailyLogs>) -> DailyLogsResponse {
        DailyLogsResponse {
            days: days
                .into_iter()
                .map(|day| SharedDailyLogs {
                    date: day.date.format("%Y-%m-%d").to_string(),
                    sleep_checks: day.sleep_checks.iter().map(SleepCheckMapper::to_dto).collect(),
                    diapers: day.diapers.iter().map(Self::diaper_to_dto).collect(),
                    feedings: day.feedings.iter().map(Self::feeding_to_dto).collect(),
                    bottles: day.bottles.iter().map(Self::bottle_to_dto).collect(),
                })
                .collect(),
        }
    }
}
