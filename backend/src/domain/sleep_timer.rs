//! Live session timer: the elapsed-since-last-check counter and its
//! overdue alarm.
//!
//! [`SleepTimer`] is a plain state machine with no clock of its own. Whoever
//! owns it calls [`SleepTimer::tick`] once per second while a session is open
//! (see `sleep_monitor`), and applies a transition once the matching event
//! has been stored.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::models::sleep_check::CheckKind;

/// Seconds without a check before the overdue alarm fires
pub const ALARM_THRESHOLD_SECS: u64 = 600;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerState {
    pub elapsed_seconds: u64,
    pub running: bool,
    pub alarm_triggered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot {action} while the sleep monitor is {state}")]
pub struct TransitionError {
    pub action: CheckKind,
    pub state: &'static str,
}

#[derive(Debug, Default)]
pub struct SleepTimer {
    state: TimerState,
}

impl SleepTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A timer for a session that is already open, `elapsed_seconds` after
    /// its last event. The alarm is left untriggered so an overdue check
    /// alarms on the next tick.
    pub fn resumed(elapsed_seconds: u64) -> Self {
        Self {
            state: TimerState {
                elapsed_seconds,
                running: true,
                alarm_triggered: false,
            },
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Advance one second. Returns true on the single tick that raises the
    /// alarm.
    pub fn tick(&mut self) -> bool {
        if !self.state.running {
            return false;
        }
        self.state.elapsed_seconds += 1;
        if self.state.elapsed_seconds >= ALARM_THRESHOLD_SECS && !self.state.alarm_triggered {
            self.state.alarm_triggered = true;
            return true;
        }
        false
    }

    /// Check that `action` is legal from the current state without changing
    /// anything. Start is only legal when idle; check and stop only while
    /// running.
    pub fn validate(&self, action: CheckKind) -> Result<(), TransitionError> {
        let legal = match action {
            CheckKind::Start => !self.state.running,
            CheckKind::Check | CheckKind::Stop => self.state.running,
        };
        if legal {
            Ok(())
        } else {
            Err(TransitionError {
                action,
                state: if self.state.running { "running" } else { "idle" },
            })
        }
    }

    /// Apply a transition whose event has been stored. Every transition
    /// resets the counter and clears the alarm.
    pub fn apply(&mut self, action: CheckKind) -> Result<(), TransitionError> {
        self.validate(action)?;
        self.state = TimerState {
            elapsed_seconds: 0,
            running: action != CheckKind::Stop,
            alarm_triggered: false,
        };
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverdueAlert {
    pub baby_id: String,
    pub elapsed_seconds: u64,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl OverdueAlert {
    pub fn new(baby_id: &str, elapsed_seconds: u64) -> Self {
        Self {
            baby_id: baby_id.to_string(),
            elapsed_seconds,
            message: format!(
                "🚨 CHECK THE BABY! {} minutes passed since last check.",
                elapsed_seconds / 60
            ),
            raised_at: Utc::now(),
        }
    }
}

/// Where overdue alarms go: an audible cue and a visible alert.
pub trait AlarmSink: Send + Sync {
    fn play_sound(&self) -> anyhow::Result<()>;

    fn show_alert(&self, alert: &OverdueAlert);
}

/// Deliver an alarm. A failed sound is logged and the alert is shown anyway.
pub fn raise_alarm(sink: &dyn AlarmSink, alert: &OverdueAlert) {
    if let Err(e) = sink.play_sound() {
        warn!("Alarm sound failed for baby {}: {}", alert.baby_id, e);
    }
    sink.show_alert(alert);
}
