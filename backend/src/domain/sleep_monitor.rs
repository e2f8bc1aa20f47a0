//! Live sleep monitoring for one baby.
//!
//! A [`SleepMonitor`] keeps a [`SleepTimer`] in step with the baby's stored
//! sleep check stream, which it follows through the [`SleepCheckFeed`].
//! Checks entered, edited or deleted anywhere else (another caretaker's
//! device, the manual log) move the timer too: it counts from the last event
//! of the open session and goes idle when the stream has no open session.
//!
//! Caretaker actions (start, check, stop) are validated against the current
//! state and appended to the store, and only then reflected in the timer, so
//! a failed append leaves the timer exactly where it was. Only one action
//! may be in flight at a time.
//!
//! [`SleepMonitor::attach`] hooks the monitor to the runtime: a watcher task
//! follows the stream, and a one-second ticker runs while a session is open.
//! Both are aborted by [`SleepMonitor::shutdown`] or when the monitor is
//! dropped.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::models::sleep_check::{CheckKind, SleepCheck, SleepCheckRecord, SleepCheckValidationError};
use crate::domain::models::NotFoundError;
use crate::domain::sleep_sessions::group_sleep_checks;
use crate::domain::sleep_timer::{raise_alarm, AlarmSink, OverdueAlert, SleepTimer, TimerState, TransitionError};
use crate::storage::feed::SleepCheckSnapshot;
use crate::storage::{BabyStorage, SleepCheckFeed, SleepCheckStorage};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
    #[error("Another sleep action is still being saved")]
    ActionInFlight,
    #[error(transparent)]
    InvalidEvent(#[from] SleepCheckValidationError),
    #[error("Failed to record sleep {kind}: {source:#}")]
    AppendFailed {
        kind: CheckKind,
        #[source]
        source: anyhow::Error,
    },
}

/// What the caretaker entered for a start, check or stop.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorAction {
    pub caretaker_id: String,
    pub position: String,
    pub note: Option<String>,
    pub mood: Option<String>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Last event of the open session: the timer counts from it.
type Anchor = (String, DateTime<Utc>);

#[derive(Debug, Default)]
struct LiveState {
    timer: SleepTimer,
    anchor: Option<Anchor>,
}

impl LiveState {
    /// Bring the timer in line with the stream. Ticks and the alarm flag are
    /// kept while the open session's last event is unchanged. Returns true
    /// if the timer was reset.
    fn reconcile(&mut self, records: &[SleepCheckRecord], now: DateTime<Utc>) -> bool {
        // malformed rows are reported by the sessions view, not on every sync
        let checks: Vec<SleepCheck> = records
            .iter()
            .cloned()
            .filter_map(|record| SleepCheck::try_from(record).ok())
            .collect();
        let grouping = group_sleep_checks(checks);

        match grouping.open_session() {
            Some(session) => {
                let last = session.last_event();
                let anchor = (last.id.clone(), last.timestamp);
                if self.timer.is_running() && self.anchor.as_ref() == Some(&anchor) {
                    return false;
                }
                let elapsed = (now - last.timestamp).num_seconds().max(0) as u64;
                self.timer = SleepTimer::resumed(elapsed);
                self.anchor = Some(anchor);
                true
            }
            None => {
                self.anchor = None;
                if !self.timer.is_running() {
                    return false;
                }
                self.timer = SleepTimer::new();
                true
            }
        }
    }

    /// Apply a stored transition directly, for when the feed could not
    /// publish the stream that holds it.
    fn record(&mut self, kind: CheckKind, id: &str, timestamp: DateTime<Utc>) -> Result<(), TransitionError> {
        self.timer.apply(kind)?;
        self.anchor = (kind != CheckKind::Stop).then(|| (id.to_string(), timestamp));
        Ok(())
    }
}

#[derive(Default)]
struct Clock {
    attached: bool,
    ticker: Option<JoinHandle<()>>,
    watcher: Option<JoinHandle<()>>,
}

/// State shared between the monitor and its background tasks.
struct MonitorCore {
    baby_id: String,
    alarm_sink: Arc<dyn AlarmSink>,
    stream: watch::Receiver<SleepCheckSnapshot>,
    live: Mutex<LiveState>,
    clock: Mutex<Clock>,
}

impl MonitorCore {
    fn state(&self) -> TimerState {
        lock(&self.live).timer.state()
    }

    /// One tick: advance the timer and deliver the alarm outside the lock.
    fn tick(&self) -> bool {
        let (fired, state) = {
            let mut live = lock(&self.live);
            let fired = live.timer.tick();
            (fired, live.timer.state())
        };
        if fired {
            warn!("⏰ Sleep check overdue for baby {} ({}s)", self.baby_id, state.elapsed_seconds);
            raise_alarm(self.alarm_sink.as_ref(), &OverdueAlert::new(&self.baby_id, state.elapsed_seconds));
        }
        fired
    }

    /// Reconcile against the newest snapshot the feed has published.
    fn sync(self: &Arc<Self>, now: DateTime<Utc>) {
        let snapshot = self.stream.borrow().clone();
        self.apply_snapshot(&snapshot, now);
    }

    fn apply_snapshot(self: &Arc<Self>, records: &[SleepCheckRecord], now: DateTime<Utc>) {
        let (changed, state) = {
            let mut live = lock(&self.live);
            let changed = live.reconcile(records, now);
            (changed, live.timer.state())
        };
        if changed {
            info!(
                "Sleep monitor for baby {} is now {} ({}s since last check)",
                self.baby_id,
                if state.running { "running" } else { "idle" },
                state.elapsed_seconds
            );
            self.update_clock();
        }
    }

    /// Run the ticker exactly while attached and a session is open.
    fn update_clock(self: &Arc<Self>) {
        let mut clock = lock(&self.clock);
        if !clock.attached {
            return;
        }
        let running = lock(&self.live).timer.is_running();
        let ticking = clock.ticker.as_ref().map_or(false, |handle| !handle.is_finished());

        if running && !ticking {
            clock.ticker = Some(self.spawn_ticker());
            debug!("Started sleep monitor ticker for baby {}", self.baby_id);
        } else if !running {
            if let Some(handle) = clock.ticker.take() {
                handle.abort();
                debug!("Stopped sleep monitor ticker for baby {}", self.baby_id);
            }
        }
    }

    fn spawn_ticker(self: &Arc<Self>) -> JoinHandle<()> {
        let core = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                core.tick();
            }
        })
    }

    fn spawn_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let core = Arc::clone(self);
        let mut stream = self.stream.clone();
        tokio::spawn(async move {
            while stream.changed().await.is_ok() {
                let snapshot = stream.borrow_and_update().clone();
                core.apply_snapshot(&snapshot, Utc::now());
            }
            debug!("Sleep check stream closed for baby {}", core.baby_id);
        })
    }
}

pub struct SleepMonitor {
    core: Arc<MonitorCore>,
    feed: Arc<SleepCheckFeed>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the action finishes, however it finishes.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SleepMonitor {
    /// Subscribe to the baby's stream and pick up where it left off: if it
    /// ends in an open session the monitor is running, `now - last event`
    /// seconds in. Nothing ticks until [`SleepMonitor::attach`] is called.
    pub async fn resume(
        baby_id: &str,
        feed: Arc<SleepCheckFeed>,
        alarm_sink: Arc<dyn AlarmSink>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Self> {
        let stream = feed.subscribe(baby_id).await?;

        let mut live = LiveState::default();
        let snapshot = stream.borrow().clone();
        live.reconcile(&snapshot, now);
        if live.timer.is_running() {
            info!(
                "Resuming open sleep session for baby {} ({}s since last check)",
                baby_id,
                live.timer.state().elapsed_seconds
            );
        }

        Ok(Self {
            core: Arc::new(MonitorCore {
                baby_id: baby_id.to_string(),
                alarm_sink,
                stream,
                live: Mutex::new(live),
                clock: Mutex::new(Clock::default()),
            }),
            feed,
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn baby_id(&self) -> &str {
        &self.core.baby_id
    }

    /// Current timer state, reconciled with the latest stored stream.
    pub fn status(&self) -> TimerState {
        self.core.sync(Utc::now());
        self.core.state()
    }

    /// Running, or saving an action.
    pub fn is_active(&self) -> bool {
        self.status().running || self.in_flight.load(Ordering::Acquire)
    }

    /// Advance the timer by one second. The ticker task calls this; tests may
    /// call it directly instead of waiting on the clock.
    pub fn tick(&self) -> bool {
        self.core.tick()
    }

    /// Follow the stream in the background and tick while a session is
    /// open. Calling it again is a no-op. Must be called from within a tokio
    /// runtime.
    pub fn attach(&self) {
        {
            let mut clock = lock(&self.core.clock);
            if clock.attached {
                return;
            }
            clock.attached = true;
            clock.watcher = Some(self.core.spawn_watcher());
        }
        self.core.update_clock();
        debug!("Attached sleep monitor for baby {}", self.core.baby_id);
    }

    pub fn is_ticking(&self) -> bool {
        lock(&self.core.clock)
            .ticker
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Stop the background tasks. The timer state is kept.
    pub fn shutdown(&self) {
        let mut clock = lock(&self.core.clock);
        let was_attached = clock.attached;
        clock.attached = false;
        for handle in [clock.ticker.take(), clock.watcher.take()].into_iter().flatten() {
            handle.abort();
        }
        if was_attached {
            debug!("Detached sleep monitor for baby {}", self.core.baby_id);
        }
    }

    pub async fn start(&self, action: MonitorAction) -> Result<SleepCheck, MonitorError> {
        self.perform(CheckKind::Start, action).await
    }

    pub async fn check(&self, action: MonitorAction) -> Result<SleepCheck, MonitorError> {
        self.perform(CheckKind::Check, action).await
    }

    pub async fn stop(&self, action: MonitorAction) -> Result<SleepCheck, MonitorError> {
        self.perform(CheckKind::Stop, action).await
    }

    async fn perform(&self, kind: CheckKind, action: MonitorAction) -> Result<SleepCheck, MonitorError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(MonitorError::ActionInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let timestamp = Utc::now();
        self.core.sync(timestamp);
        lock(&self.core.live).timer.validate(kind)?;

        let record = SleepCheckRecord::new_event(
            &self.core.baby_id,
            &action.caretaker_id,
            kind,
            &action.position,
            action.note,
            action.mood,
            timestamp,
        )?;

        let id = match self.feed.append_check(record.clone()).await {
            Ok(id) => id,
            Err(source) => {
                warn!("Failed to record sleep {} for baby {}: {:#}", kind, self.core.baby_id, source);
                return Err(MonitorError::AppendFailed { kind, source });
            }
        };

        // the feed publishes the stream holding the new event before the
        // append returns, unless re-reading the store failed
        let snapshot = self.core.stream.borrow().clone();
        if snapshot.iter().any(|r| r.id == id) {
            self.core.apply_snapshot(&snapshot, Utc::now());
        } else {
            lock(&self.core.live).record(kind, &id, timestamp)?;
            self.core.update_clock();
        }
        info!("🛏️ Sleep {} logged for baby {} ({})", kind, self.core.baby_id, record.position);

        Ok(SleepCheck {
            id,
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

impl Drop for SleepMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Alarm sink that records every alert for later display and rings the
/// terminal bell on stderr.
#[derive(Default)]
pub struct RecordingAlarmSink {
    alerts: Mutex<Vec<OverdueAlert>>,
}

impl RecordingAlarmSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<OverdueAlert> {
        lock(&self.alerts).clone()
    }
}

impl AlarmSink for RecordingAlarmSink {
    fn play_sound(&self) -> anyhow::Result<()> {
        use std::io::Write;
        let mut stderr = std::io::stderr();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }

    fn show_alert(&self, alert: &OverdueAlert) {
        warn!("{} (baby {})", alert.message, alert.baby_id);
        lock(&self.alerts).push(alert.clone());
    }
}

#[derive(Clone)]
pub struct MonitorEntry {
    pub monitor: Arc<SleepMonitor>,
    pub alerts: Arc<RecordingAlarmSink>,
}

/// The live monitors of this server, one per baby, created on first use.
///
/// Idle monitors are evicted whenever another baby's monitor is requested,
/// so the registry holds the running ones plus the most recently viewed.
#[derive(Clone)]
pub struct MonitorRegistry {
    babies: Arc<dyn BabyStorage>,
    feed: Arc<SleepCheckFeed>,
    monitors: Arc<Mutex<HashMap<String, MonitorEntry>>>,
}

impl MonitorRegistry {
    pub fn new(babies: Arc<dyn BabyStorage>, feed: Arc<SleepCheckFeed>) -> Self {
        Self {
            babies,
            feed,
            monitors: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The monitor for a baby, resuming it from the store if needed.
    pub async fn get_or_resume(&self, baby_id: &str) -> anyhow::Result<MonitorEntry> {
        let existing = {
            let mut monitors = lock(&self.monitors);
            monitors.retain(|id, entry| {
                let keep = id == baby_id || entry.monitor.is_active();
                if !keep {
                    debug!("Evicting idle sleep monitor for baby {}", id);
                }
                keep
            });
            monitors.get(baby_id).cloned()
        };
        if let Some(entry) = existing {
            return Ok(entry);
        }

        if self.babies.get_baby(baby_id).await?.is_none() {
            return Err(NotFoundError::Baby(baby_id.to_string()).into());
        }

        let alerts = Arc::new(RecordingAlarmSink::new());
        let sink: Arc<dyn AlarmSink> = alerts.clone();
        let monitor = SleepMonitor::resume(baby_id, Arc::clone(&self.feed), sink, Utc::now()).await?;
        let candidate = MonitorEntry {
            monitor: Arc::new(monitor),
            alerts,
        };

        // another request may have resumed the same baby meanwhile; the
        // loser is never attached and is dropped here
        let entry = lock(&self.monitors)
            .entry(baby_id.to_string())
            .or_insert(candidate)
            .clone();
        entry.monitor.attach();
        Ok(entry)
    }

    /// Number of monitors currently held.
    pub fn monitor_count(&self) -> usize {
        lock(&self.monitors).len()
    }

    /// Tear down a baby's monitor. Returns false if none was open.
    pub fn remove(&self, baby_id: &str) -> bool {
        match lock(&self.monitors).remove(baby_id) {
            Some(entry) => {
                entry.monitor.shutdown();
                info!("Closed sleep monitor for baby {}", baby_id);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::baby::Baby;
    use crate::domain::models::sleep_check::SleepCheckPatch;
    use crate::domain::sleep_timer::ALARM_THRESHOLD_SECS;
    use crate::storage::csv::{BabyRepository, CsvConnection, SleepCheckRepository};
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    fn action(position: &str) -> MonitorAction {
        MonitorAction {
            caretaker_id: "staff-1".to_string(),
            position: position.to_string(),
            note: None,
            mood: None,
        }
    }

    fn event(kind: CheckKind, at: DateTime<Utc>) -> SleepCheckRecord {
        SleepCheckRecord::new_event("baby-1", "staff-2", kind, "Back", None, None, at).unwrap()
    }

    /// Store whose appends can be made to fail or to block until released.
    #[derive(Default)]
    struct ScriptedStore {
        fail_appends: AtomicBool,
        block_appends: AtomicBool,
        release: Notify,
        appended: Mutex<Vec<SleepCheckRecord>>,
        next_id: AtomicUsize,
    }

    #[async_trait]
    impl SleepCheckStorage for ScriptedStore {
        async fn append_check(&self, mut record: SleepCheckRecord) -> anyhow::Result<String> {
            if self.block_appends.load(Ordering::SeqCst) {
                self.release.notified().await;
            }
            if self.fail_appends.load(Ordering::SeqCst) {
                anyhow::bail!("network unreachable");
            }
            record.id = format!("sleep::{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            lock(&self.appended).push(record.clone());
            Ok(record.id)
        }

        async fn get_check(&self, _: &str, check_id: &str) -> anyhow::Result<Option<SleepCheckRecord>> {
            Ok(lock(&self.appended).iter().find(|r| r.id == check_id).cloned())
        }

        async fn list_checks(&self, _: &str) -> anyhow::Result<Vec<SleepCheckRecord>> {
            Ok(lock(&self.appended).clone())
        }

        async fn update_check(
            &self,
            _: &str,
            check_id: &str,
            patch: &SleepCheckPatch,
        ) -> anyhow::Result<Option<SleepCheckRecord>> {
            let mut appended = lock(&self.appended);
            let Some(record) = appended.iter_mut().find(|r| r.id == check_id) else {
                return Ok(None);
            };
            if let Some(timestamp) = patch.timestamp {
                record.timestamp = Some(timestamp.to_rfc3339());
            }
            Ok(Some(record.clone()))
        }

        async fn delete_check(&self, _: &str, check_id: &str) -> anyhow::Result<bool> {
            let mut appended = lock(&self.appended);
            let before = appended.len();
            appended.retain(|r| r.id != check_id);
            Ok(appended.len() < before)
        }
    }

    async fn monitor_with(store: Arc<ScriptedStore>) -> (SleepMonitor, Arc<SleepCheckFeed>, Arc<RecordingAlarmSink>) {
        let feed = Arc::new(SleepCheckFeed::new(store));
        let alerts = Arc::new(RecordingAlarmSink::new());
        let monitor = SleepMonitor::resume("baby-1", Arc::clone(&feed), alerts.clone(), Utc::now())
            .await
            .unwrap();
        (monitor, feed, alerts)
    }

    #[tokio::test]
    async fn test_start_check_stop_cycle() {
        let store = Arc::new(ScriptedStore::default());
        let (monitor, _feed, _) = monitor_with(store.clone()).await;

        let start = monitor.start(action("Back")).await.unwrap();
        assert_eq!(start.kind, CheckKind::Start);
        assert!(monitor.status().running);

        for _ in 0..42 {
            monitor.tick();
        }
        assert_eq!(monitor.status().elapsed_seconds, 42);

        monitor.check(action("Side")).await.unwrap();
        assert_eq!(
            monitor.status(),
            TimerState { elapsed_seconds: 0, running: true, alarm_triggered: false }
        );

        let mut stop_action = action("Tummy");
        stop_action.mood = Some("happy".to_string());
        let stop = monitor.stop(stop_action).await.unwrap();
        assert_eq!(stop.mood.as_deref(), Some("happy"));
        assert_eq!(monitor.status(), TimerState::default());

        let kinds: Vec<Option<String>> = lock(&store.appended).iter().map(|r| r.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![Some("start".to_string()), Some("check".to_string()), Some("stop".to_string())]
        );
    }

    #[tokio::test]
    async fn test_append_failure_during_stop_keeps_timer_running() {
        let store = Arc::new(ScriptedStore::default());
        let (monitor, _feed, _) = monitor_with(store.clone()).await;
        monitor.start(action("Back")).await.unwrap();
        for _ in 0..120 {
            monitor.tick();
        }
        let before = monitor.status();

        store.fail_appends.store(true, Ordering::SeqCst);
        let err = monitor.stop(action("Back")).await.unwrap_err();
        assert!(matches!(err, MonitorError::AppendFailed { kind: CheckKind::Stop, .. }));

        assert_eq!(monitor.status(), before);
        assert!(monitor.status().running);
        assert_eq!(lock(&store.appended).len(), 1);

        // the caretaker can retry once the store is back
        store.fail_appends.store(false, Ordering::SeqCst);
        monitor.stop(action("Back")).await.unwrap();
        assert!(!monitor.status().running);
    }

    #[tokio::test]
    async fn test_invalid_transitions_do_not_touch_the_store() {
        let store = Arc::new(ScriptedStore::default());
        let (monitor, _feed, _) = monitor_with(store.clone()).await;

        assert!(matches!(
            monitor.check(action("Back")).await,
            Err(MonitorError::InvalidTransition(_))
        ));
        assert!(matches!(
            monitor.stop(action("Back")).await,
            Err(MonitorError::InvalidTransition(_))
        ));
        monitor.start(action("Back")).await.unwrap();
        assert!(matches!(
            monitor.start(action("Back")).await,
            Err(MonitorError::InvalidTransition(_))
        ));
        assert_eq!(lock(&store.appended).len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_event_is_rejected_before_append() {
        let store = Arc::new(ScriptedStore::default());
        let (monitor, _feed, _) = monitor_with(store.clone()).await;

        assert!(matches!(
            monitor.start(action("  ")).await,
            Err(MonitorError::InvalidEvent(SleepCheckValidationError::EmptyPosition))
        ));
        assert!(lock(&store.appended).is_empty());
        assert!(!monitor.status().running);
    }

    #[tokio::test]
    async fn test_second_action_rejected_while_append_in_flight() {
        let store = Arc::new(ScriptedStore::default());
        store.block_appends.store(true, Ordering::SeqCst);
        let (monitor, _feed, _) = monitor_with(store.clone()).await;
        let monitor = Arc::new(monitor);

        let pending = {
            let monitor = Arc::clone(&monitor);
            tokio::spawn(async move { monitor.start(action("Back")).await })
        };
        while !monitor.in_flight.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            monitor.start(action("Side")).await,
            Err(MonitorError::ActionInFlight)
        ));
        assert!(monitor.is_active());

        store.release.notify_one();
        pending.await.unwrap().unwrap();
        assert!(monitor.status().running);
        assert!(!monitor.in_flight.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_overdue_alarm_recorded_once() {
        let store = Arc::new(ScriptedStore::default());
        let (monitor, _feed, alerts) = monitor_with(store).await;
        monitor.start(action("Back")).await.unwrap();

        let fired = (0..ALARM_THRESHOLD_SECS + 30).filter(|_| monitor.tick()).count();
        assert_eq!(fired, 1);

        let recorded = alerts.alerts();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].elapsed_seconds, ALARM_THRESHOLD_SECS);
        assert!(monitor.status().alarm_triggered);
    }

    #[tokio::test]
    async fn test_resume_from_open_session() {
        let temp_dir = TempDir::new().unwrap();
        let repo = SleepCheckRepository::new(CsvConnection::new(temp_dir.path()).unwrap());
        let now = Utc::now();
        for (kind, minutes_ago) in [(CheckKind::Start, 30), (CheckKind::Check, 4)] {
            repo.append_check(event(kind, now - ChronoDuration::minutes(minutes_ago)))
                .await
                .unwrap();
        }

        let monitor = SleepMonitor::resume(
            "baby-1",
            Arc::new(SleepCheckFeed::new(Arc::new(repo))),
            Arc::new(RecordingAlarmSink::new()),
            now,
        )
        .await
        .unwrap();

        let status = monitor.core.state();
        assert!(status.running);
        assert_eq!(status.elapsed_seconds, 240);
        assert!(!status.alarm_triggered);
    }

    #[tokio::test]
    async fn test_resume_from_closed_stream_is_idle() {
        let store = Arc::new(ScriptedStore::default());
        let (first, _feed, _) = monitor_with(store.clone()).await;
        first.start(action("Back")).await.unwrap();
        first.stop(action("Back")).await.unwrap();

        let (resumed, _feed, _) = monitor_with(store).await;
        assert_eq!(resumed.status(), TimerState::default());
    }

    #[tokio::test]
    async fn test_stop_recorded_elsewhere_idles_the_monitor() {
        let store = Arc::new(ScriptedStore::default());
        let (monitor, feed, _) = monitor_with(store).await;
        monitor.start(action("Back")).await.unwrap();
        for _ in 0..90 {
            monitor.tick();
        }

        // a second caretaker logs the wake-up from the manual log
        feed.append_check(event(CheckKind::Stop, Utc::now())).await.unwrap();

        assert_eq!(monitor.status(), TimerState::default());
        assert!(matches!(
            monitor.check(action("Back")).await,
            Err(MonitorError::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_check_recorded_elsewhere_resets_elapsed() {
        let store = Arc::new(ScriptedStore::default());
        let (monitor, feed, _) = monitor_with(store).await;
        monitor.start(action("Back")).await.unwrap();
        for _ in 0..ALARM_THRESHOLD_SECS {
            monitor.tick();
        }
        assert!(monitor.status().alarm_triggered);

        feed.append_check(event(CheckKind::Check, Utc::now())).await.unwrap();

        assert_eq!(
            monitor.status(),
            TimerState { elapsed_seconds: 0, running: true, alarm_triggered: false }
        );
    }

    #[tokio::test]
    async fn test_start_recorded_elsewhere_runs_from_its_timestamp() {
        let store = Arc::new(ScriptedStore::default());
        let (monitor, feed, _) = monitor_with(store).await;

        feed.append_check(event(CheckKind::Start, Utc::now() - ChronoDuration::minutes(3)))
            .await
            .unwrap();

        let status = monitor.status();
        assert!(status.running);
        assert!((180..=181).contains(&status.elapsed_seconds));
    }

    #[tokio::test]
    async fn test_editing_the_last_check_moves_the_count() {
        let store = Arc::new(ScriptedStore::default());
        let (monitor, feed, _) = monitor_with(store).await;
        let start = monitor.start(action("Back")).await.unwrap();

        let patch = SleepCheckPatch {
            timestamp: Some(Utc::now() - ChronoDuration::minutes(5)),
            ..Default::default()
        };
        feed.update_check("baby-1", &start.id, &patch).await.unwrap();
        assert!((300..=301).contains(&monitor.status().elapsed_seconds));

        feed.delete_check("baby-1", &start.id).await.unwrap();
        assert!(!monitor.status().running);
    }

    #[tokio::test]
    async fn test_ticker_runs_only_while_a_session_is_open() {
        let store = Arc::new(ScriptedStore::default());
        let (monitor, _feed, _) = monitor_with(store).await;

        monitor.attach();
        assert!(!monitor.is_ticking());

        monitor.start(action("Back")).await.unwrap();
        assert!(monitor.is_ticking());

        monitor.stop(action("Back")).await.unwrap();
        assert!(!monitor.is_ticking());

        monitor.shutdown();
        monitor.start(action("Back")).await.unwrap();
        assert!(!monitor.is_ticking());
    }

    #[tokio::test]
    async fn test_watcher_stops_the_ticker_on_a_stop_from_elsewhere() {
        let store = Arc::new(ScriptedStore::default());
        let (monitor, feed, _) = monitor_with(store).await;
        monitor.attach();
        monitor.start(action("Back")).await.unwrap();
        assert!(monitor.is_ticking());

        feed.append_check(event(CheckKind::Stop, Utc::now())).await.unwrap();

        // no status read here: the background watcher has to notice
        tokio::time::timeout(Duration::from_secs(5), async {
            while monitor.is_ticking() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("ticker still running after the stop");
        assert!(!monitor.core.state().running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_advances_with_the_clock_and_stops_on_shutdown() {
        let store = Arc::new(ScriptedStore::default());
        let (monitor, _feed, _) = monitor_with(store).await;
        monitor.start(action("Back")).await.unwrap();
        monitor.attach();

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(monitor.core.state().elapsed_seconds, 5);

        monitor.shutdown();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(monitor.core.state().elapsed_seconds, 5);
    }

    async fn registry_with(babies: &[&str]) -> (TempDir, MonitorRegistry) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        let repo = Arc::new(BabyRepository::new(connection.clone()));
        for id in babies {
            repo.store_baby(&Baby {
                id: id.to_string(),
                name: id.to_string(),
                dob: None,
                parent_email: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        }
        let feed = Arc::new(SleepCheckFeed::new(Arc::new(SleepCheckRepository::new(connection))));
        (temp_dir, MonitorRegistry::new(repo, feed))
    }

    #[tokio::test]
    async fn test_registry_evicts_idle_monitors() {
        let (_dir, registry) = registry_with(&["baby-a", "baby-b", "baby-c"]).await;

        let a = registry.get_or_resume("baby-a").await.unwrap();
        a.monitor.start(action("Back")).await.unwrap();
        let b = registry.get_or_resume("baby-b").await.unwrap();
        assert!(!b.monitor.is_ticking());
        drop(b);

        // a is running and stays, idle b makes room for c
        registry.get_or_resume("baby-c").await.unwrap();
        assert_eq!(registry.monitor_count(), 2);
        let again = registry.get_or_resume("baby-a").await.unwrap();
        assert!(Arc::ptr_eq(&again.monitor, &a.monitor));

        assert!(registry.remove("baby-a"));
        assert!(!registry.remove("baby-a"));
        assert!(!a.monitor.is_ticking());
    }

    #[tokio::test]
    async fn test_registry_rejects_unknown_baby() {
        let (_dir, registry) = registry_with(&[]).await;
        let err = registry.get_or_resume("baby-ghost").await.err().unwrap();
        assert!(matches!(err.downcast_ref::<NotFoundError>(), Some(NotFoundError::Baby(_))));
        assert_eq!(registry.monitor_count(), 0);
    }
}
