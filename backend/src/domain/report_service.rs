//! Daily sleep report emailed to a baby's parent.
//!
//! The report lists every sleep check of one UTC day as
//! `HH:MM:SS - KIND - Position: X`, followed by the day's diaper, feeding
//! and bottle logs when there are any, and a summary of the sleep sessions
//! touching that day. A session crossing midnight is reported on both days,
//! with the time on the other day shown with its date.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt::Write;
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::commands::reports::SendReportCommand;
use crate::domain::daily_logs::{DailyLogService, DailyLogs};
use crate::domain::durations::format_duration;
use crate::domain::models::baby::Baby;
use crate::domain::sleep_sessions::SleepSession;
use crate::storage::BabyStorage;

const TIME_FORMAT: &str = "%H:%M:%S";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Time of day, with the date in front when it is not `date`
fn format_moment(timestamp: DateTime<Utc>, date: NaiveDate) -> String {
    if timestamp.date_naive() == date {
        timestamp.format(TIME_FORMAT).to_string()
    } else {
        timestamp.format(DATE_TIME_FORMAT).to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Baby not found: {0}")]
    BabyNotFound(String),
    #[error("Baby {0} has no parent email")]
    MissingParentEmail(String),
    #[error("No sleep logs found for {date}")]
    NoLogs { baby_id: String, date: NaiveDate },
    #[error("Failed to deliver report: {0:#}")]
    DeliveryFailed(#[source] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailReport {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound channel for composed reports
#[async_trait]
pub trait ReportSender: Send + Sync {
    async fn send(&self, report: EmailReport) -> Result<()>;
}

/// Used when no SMTP server is configured: the report is only logged.
pub struct LoggingReportSender;

#[async_trait]
impl ReportSender for LoggingReportSender {
    async fn send(&self, report: EmailReport) -> Result<()> {
        info!(
            "📧 Email disabled, report for {} not sent: {}\n{}",
            report.to, report.subject, report.body
        );
        Ok(())
    }
}

/// Build the email for one day. `sessions` are the sessions touching that
/// day, grouped from the whole stream. Fails if the baby has no parent
/// email or no sleep checks that day.
pub fn compose_report(
    baby: &Baby,
    day: &DailyLogs,
    sessions: &[SleepSession],
) -> Result<EmailReport, ReportError> {
    let to = baby
        .parent_email
        .clone()
        .ok_or_else(|| ReportError::MissingParentEmail(baby.id.clone()))?;
    if day.sleep_checks.is_empty() {
        return Err(ReportError::NoLogs {
            baby_id: baby.id.clone(),
            date: day.date,
        });
    }

    // writing to a String cannot fail
    let mut body = format!("Hello 👋,\n\nHere is the sleep log for {}:\n\n", baby.name);
    for check in &day.sleep_checks {
        let _ = writeln!(
            body,
            "{} - {} - Position: {}",
            check.timestamp.format(TIME_FORMAT),
            check.kind.as_str().to_uppercase(),
            check.position
        );
    }

    if !day.diapers.is_empty() {
        body.push_str("\nDiapers:\n");
        for diaper in &day.diapers {
            let _ = writeln!(body, "{} - {}", diaper.timestamp.format(TIME_FORMAT), diaper.kind);
        }
    }
    if !day.feedings.is_empty() {
        body.push_str("\nFeedings:\n");
        for feeding in &day.feedings {
            let _ = writeln!(body, "{} - {}", feeding.timestamp.format(TIME_FORMAT), feeding.food);
        }
    }
    if !day.bottles.is_empty() {
        body.push_str("\nBottles:\n");
        for bottle in &day.bottles {
            let _ = writeln!(body, "{} - {} oz", bottle.timestamp.format(TIME_FORMAT), bottle.amount);
        }
    }

    if !sessions.is_empty() {
        body.push_str("\nSleep sessions:\n");
        for session in sessions {
            let start = format_moment(session.start.timestamp, day.date);
            let line = match (&session.stop, session.total_duration()) {
                (Some(stop), Some(total)) => format!(
                    "- {} to {} ({})",
                    start,
                    format_moment(stop.timestamp, day.date),
                    format_duration(total)
                ),
                _ if session.is_open => format!("- {} (still sleeping)", start),
                _ => format!("- {} (no stop recorded)", start),
            };
            let _ = writeln!(body, "{}", line);
        }
    }
    body.push_str("\n— Sleep Log App");

    Ok(EmailReport {
        to,
        subject: format!("🛏️ Sleep Log for {} - {}", baby.name, day.date.format("%a %b %d %Y")),
        body,
    })
}

#[derive(Clone)]
pub struct ReportService {
    baby_repository: Arc<dyn BabyStorage>,
    daily_log_service: DailyLogService,
    sender: Arc<dyn ReportSender>,
}

impl ReportService {
    pub fn new(
        baby_repository: Arc<dyn BabyStorage>,
        daily_log_service: DailyLogService,
        sender: Arc<dyn ReportSender>,
    ) -> Self {
        Self {
            baby_repository,
            daily_log_service,
            sender,
        }
    }

    /// Email the day's report to the parent. The day defaults to today (UTC).
    pub async fn send_report(&self, command: SendReportCommand) -> Result<()> {
        let date = command.date.unwrap_or_else(|| Utc::now().date_naive());
        info!("Sending sleep report for baby {} on {}", command.baby_id, date);

        let baby = self
            .baby_repository
            .get_baby(&command.baby_id)
            .await?
            .ok_or_else(|| ReportError::BabyNotFound(command.baby_id.clone()))?;
        let day = self.daily_log_service.for_date(&baby.id, date).await?;
        let sessions = self.daily_log_service.sessions_for_date(&baby.id, date).await?;
        let report = compose_report(&baby, &day, &sessions)?;
        let recipient = report.to.clone();

        if let Err(e) = self.sender.send(report).await {
            error!("Failed to send report to {}: {:#}", recipient, e);
            return Err(ReportError::DeliveryFailed(e).into());
        }

        info!("📨 Report sent to {}", recipient);
        Ok(())
    }
}
