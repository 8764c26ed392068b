use std::{sync::Arc, time::Duration};

use anyhow::{bail, Result};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time,
};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::audio::Notifier;
use crate::{log_info, log_warn};

use super::state::{PhaseCompletion, PhaseDurations, TickOutcome, TimerMode, TimerSnapshot, TimerState};

const ENABLE_LOGS: bool = true;

pub type SessionCompleteCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct TimerConfig {
    pub durations: PhaseDurations,
    pub tick_interval: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            durations: PhaseDurations::default(),
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl TimerConfig {
    pub fn with_durations(durations: PhaseDurations) -> Self {
        Self {
            durations,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.durations.work_secs == 0 {
            bail!("work duration must be greater than zero");
        }
        if self.durations.break_secs == 0 {
            bail!("break duration must be greater than zero");
        }
        if self.tick_interval.is_zero() {
            bail!("tick interval must be greater than zero");
        }
        Ok(())
    }
}

/// Shared handle to a running focus timer.
///
/// The countdown task exists only while the timer runs. It is aborted when the
/// timer pauses (toggle, reset, phase boundary), on [`TimerController::shutdown`],
/// and when the last clone of the controller is dropped.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
    notifier: Arc<dyn Notifier>,
    on_session_complete: SessionCompleteCallback,
    snapshots: Arc<watch::Sender<TimerSnapshot>>,
    teardown: CancellationToken,
    _teardown_guard: Arc<DropGuard>,
}

impl TimerController {
    pub fn new<F>(config: TimerConfig, notifier: Arc<dyn Notifier>, on_session_complete: F) -> Result<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        config.validate()?;

        let state = TimerState::new(config.durations);
        let (snapshots, _) = watch::channel(state.snapshot());
        let teardown = CancellationToken::new();

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: config.tick_interval,
            notifier,
            on_session_complete: Arc::new(on_session_complete),
            snapshots: Arc::new(snapshots),
            _teardown_guard: Arc::new(teardown.clone().drop_guard()),
            teardown,
        })
    }

    pub async fn get_state(&self) -> TimerState {
        self.state.lock().await.clone()
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Receives a fresh snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.subscribe()
    }

    /// Starts or pauses the countdown. Returns the new running flag.
    pub async fn toggle(&self) -> Result<bool> {
        if self.teardown.is_cancelled() {
            bail!("timer has been shut down");
        }

        let mut guard = self.state.lock().await;
        let running = guard.toggle();
        if running {
            self.spawn_ticker().await;
            log_info!("Timer started: {} {}", guard.mode.as_str(), guard.snapshot().formatted);
        } else {
            self.cancel_ticker().await;
            log_info!("Timer paused at {}", guard.snapshot().formatted);
        }
        self.snapshots.send_replace(guard.snapshot());
        Ok(running)
    }

    /// Pauses and rewinds the current phase. Mode and rounds are kept.
    pub async fn reset(&self) -> TimerSnapshot {
        let mut guard = self.state.lock().await;
        self.cancel_ticker().await;
        guard.reset();
        let snapshot = guard.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        snapshot
    }

    /// Stops the countdown for good; later toggles are rejected.
    pub async fn shutdown(&self) {
        self.teardown.cancel();
        let mut guard = self.state.lock().await;
        self.cancel_ticker().await;
        guard.is_running = false;
        self.snapshots.send_replace(guard.snapshot());
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let tick_interval = self.tick_interval;
        let notifier = self.notifier.clone();
        let on_session_complete = self.on_session_complete.clone();
        let snapshots = self.snapshots.clone();
        let teardown = self.teardown.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + tick_interval, tick_interval);
            loop {
                tokio::select! {
                    _ = teardown.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let mut guard = state.lock().await;
                match guard.tick() {
                    TickOutcome::Idle => break,
                    TickOutcome::Counting { .. } => {
                        snapshots.send_replace(guard.snapshot());
                    }
                    TickOutcome::PhaseComplete(done) => {
                        on_phase_complete(done, notifier.as_ref(), on_session_complete.as_ref());
                        snapshots.send_replace(guard.snapshot());
                        break;
                    }
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

/// Side effects of a finished phase. Runs with the state lock held so a
/// concurrent toggle cannot observe the transition half-applied.
fn on_phase_complete(done: PhaseCompletion, notifier: &dyn Notifier, on_session_complete: &(dyn Fn() + Send + Sync)) {
    if let Err(err) = notifier.notify(done.finished) {
        log_warn!("Phase notification failed: {}", err);
    }

    if done.finished == TimerMode::Work {
        on_session_complete();
        log_info!("Focus round {} complete", done.rounds);
    } else {
        log_info!("Break over, back to work");
    }
}
