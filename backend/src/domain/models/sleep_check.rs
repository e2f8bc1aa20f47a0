//! Domain model for a sleep check event.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const MAX_POSITION_LENGTH: usize = 50;
const MAX_NOTE_LENGTH: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckKind {
    Start,
    Check,
    Stop,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Start => "start",
            CheckKind::Check => "check",
            CheckKind::Stop => "stop",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckKind {
    type Err = SleepCheckValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(CheckKind::Start),
            // older clients logged checks as "restart"
            "check" | "restart" => Ok(CheckKind::Check),
            "stop" => Ok(CheckKind::Stop),
            "" => Err(SleepCheckValidationError::MissingKind),
            other => Err(SleepCheckValidationError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SleepCheck {
    pub id: String,
    pub baby_id: String,
    pub caretaker_id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: CheckKind,
    pub position: String,
    pub note: Option<String>,
    pub mood: Option<String>,
}

impl SleepCheck {
    pub fn generate_id() -> String {
        format!("sleep::{}", Uuid::new_v4())
    }
}

/// A sleep check row exactly as it sits in storage.
///
/// Rows written by hand or by older clients may lack a timestamp or kind, so
/// both are optional here and only validated when converted to a
/// [`SleepCheck`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepCheckRecord {
    pub id: String,
    pub baby_id: String,
    pub caretaker_id: String,
    pub timestamp: Option<String>,
    pub kind: Option<String>,
    pub position: String,
    pub note: Option<String>,
    pub mood: Option<String>,
}

impl SleepCheckRecord {
    /// Build a validated row for a new event. The id is left empty for the
    /// store to assign.
    pub fn new_event(
        baby_id: &str,
        caretaker_id: &str,
        kind: CheckKind,
        position: &str,
        note: Option<String>,
        mood: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, SleepCheckValidationError> {
        if caretaker_id.trim().is_empty() {
            return Err(SleepCheckValidationError::EmptyCaretaker);
        }
        let position = validate_position(position)?;
        let note = normalize_text(note);
        if note.as_ref().map_or(false, |n| n.len() > MAX_NOTE_LENGTH) {
            return Err(SleepCheckValidationError::NoteTooLong);
        }
        let mood = normalize_text(mood);
        if mood.is_some() && kind != CheckKind::Stop {
            return Err(SleepCheckValidationError::MoodOnlyOnStop);
        }

        Ok(Self {
            id: String::new(),
            baby_id: baby_id.to_string(),
            caretaker_id: caretaker_id.trim().to_string(),
            timestamp: Some(timestamp.to_rfc3339()),
            kind: Some(kind.as_str().to_string()),
            position,
            note,
            mood,
        })
    }
}

impl TryFrom<SleepCheckRecord> for SleepCheck {
    type Error = SleepCheckValidationError;

    fn try_from(record: SleepCheckRecord) -> Result<Self, Self::Error> {
        let raw_timestamp = record
            .timestamp
            .filter(|t| !t.trim().is_empty())
            .ok_or(SleepCheckValidationError::MissingTimestamp)?;
        let timestamp = parse_timestamp(&raw_timestamp)?;
        let kind = record
            .kind
            .ok_or(SleepCheckValidationError::MissingKind)?
            .parse::<CheckKind>()?;

        Ok(SleepCheck {
            id: record.id,
            baby_id: record.baby_id,
            caretaker_id: record.caretaker_id,
            timestamp,
            kind,
            position: record.position,
            note: record.note,
            mood: record.mood,
        })
    }
}

impl From<&SleepCheck> for SleepCheckRecord {
    fn from(check: &SleepCheck) -> Self {
        Self {
            id: check.id.clone(),
            baby_id: check.baby_id.clone(),
            caretaker_id: check.caretaker_id.clone(),
            timestamp: Some(check.timestamp.to_rfc3339()),
            kind: Some(check.kind.as_str().to_string()),
            position: check.position.clone(),
            note: check.note.clone(),
            mood: check.mood.clone(),
        }
    }
}

/// Fields of a stored sleep check that may be edited after the fact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SleepCheckPatch {
    pub position: Option<String>,
    pub note: Option<String>,
    pub mood: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl SleepCheckPatch {
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.note.is_none() && self.mood.is_none() && self.timestamp.is_none()
    }

    /// Apply the patch to a stored row. Mood edits are only allowed on stops.
    pub fn apply_to(&self, record: &mut SleepCheckRecord) -> Result<(), SleepCheckValidationError> {
        if let Some(position) = &self.position {
            record.position = validate_position(position)?;
        }
        if let Some(note) = &self.note {
            if note.trim().len() > MAX_NOTE_LENGTH {
                return Err(SleepCheckValidationError::NoteTooLong);
            }
            record.note = normalize_text(Some(note.clone()));
        }
        if let Some(mood) = &self.mood {
            let is_stop = record
                .kind
                .as_deref()
                .and_then(|k| k.parse::<CheckKind>().ok())
                == Some(CheckKind::Stop);
            if !is_stop {
                return Err(SleepCheckValidationError::MoodOnlyOnStop);
            }
            record.mood = normalize_text(Some(mood.clone()));
        }
        if let Some(timestamp) = self.timestamp {
            record.timestamp = Some(timestamp.to_rfc3339());
        }
        Ok(())
    }
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, SleepCheckValidationError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| SleepCheckValidationError::InvalidTimestamp(raw.to_string()))
}

fn validate_position(position: &str) -> Result<String, SleepCheckValidationError> {
    let position = position.trim();
    if position.is_empty() {
        return Err(SleepCheckValidationError::EmptyPosition);
    }
    if position.len() > MAX_POSITION_LENGTH {
        return Err(SleepCheckValidationError::PositionTooLong);
    }
    Ok(position.to_string())
}

fn normalize_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SleepCheckValidationError {
    #[error("Sleep check is missing a timestamp")]
    MissingTimestamp,
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("Sleep check is missing a kind")]
    MissingKind,
    #[error("Unknown sleep check kind: {0}")]
    UnknownKind(String),
    #[error("Position cannot be empty")]
    EmptyPosition,
    #[error("Position is too long")]
    PositionTooLong,
    #[error("Note is too long")]
    NoteTooLong,
    #[error("Caretaker id cannot be empty")]
    EmptyCaretaker,
    #[error("Mood can only be recorded when the baby wakes up")]
    MoodOnlyOnStop,
}
