use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, RwLock,
};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::api::{BrainApi, HttpBrainApi};
use crate::audio::{notifier_for, Notifier};
use crate::models::{ConnectionDetails, Device, SessionData};
use crate::segmentation::{segment_samples, FocusInterval, FocusSummary};
use crate::settings::{AppSettings, SettingsStore};
use crate::timer::{TimerConfig, TimerController};

/// A finished work phase, as recorded by the completion callback.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedRound {
    pub id: String,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedDevice {
    pub device: Device,
    pub battery: u8,
}

/// Everything the results view renders for one session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub intervals: Vec<FocusInterval>,
    pub summary: FocusSummary,
    pub data: SessionData,
}

impl SessionReport {
    pub fn from_data(data: SessionData) -> Self {
        let intervals = segment_samples(&data.scores);
        let summary = FocusSummary::new(&data.scores, &intervals);
        Self {
            intervals,
            summary,
            data,
        }
    }
}

/// Wires the timer, device registration and session results together.
pub struct FocusHost {
    timer: TimerController,
    api: Arc<dyn BrainApi>,
    lookback_minutes: u32,
    has_completed_session: Arc<AtomicBool>,
    rounds: Arc<Mutex<Vec<CompletedRound>>>,
    device: RwLock<Option<ConnectedDevice>>,
}

impl FocusHost {
    pub fn new(
        config: TimerConfig,
        lookback_minutes: u32,
        api: Arc<dyn BrainApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let has_completed_session = Arc::new(AtomicBool::new(false));
        let rounds = Arc::new(Mutex::new(Vec::new()));

        let on_session_complete = {
            let has_completed_session = has_completed_session.clone();
            let rounds = rounds.clone();
            move || {
                has_completed_session.store(true, Ordering::SeqCst);
                let round = CompletedRound {
                    id: Uuid::new_v4().to_string(),
                    finished_at: Utc::now(),
                };
                rounds
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(round);
            }
        };

        let timer = TimerController::new(config, notifier, on_session_complete)?;

        Ok(Self {
            timer,
            api,
            lookback_minutes,
            has_completed_session,
            rounds,
            device: RwLock::new(None),
        })
    }

    /// Builds the host against the HTTP backend described by `settings`.
    pub fn from_settings(settings: &AppSettings) -> Result<Self> {
        let api = HttpBrainApi::new(&settings.api)?;
        info!("Using BCI backend at {}", api.base_url());
        Self::new(
            TimerConfig::with_durations(settings.timer.durations()),
            settings.session_lookback_minutes,
            Arc::new(api),
            notifier_for(&settings.notification),
        )
    }

    /// Like [`FocusHost::from_settings`], with environment overrides applied.
    pub fn from_store(store: &SettingsStore) -> Result<Self> {
        Self::from_settings(&store.effective())
    }

    pub fn timer(&self) -> &TimerController {
        &self.timer
    }

    /// True once any work phase has run out; unlocks the results view.
    pub fn has_completed_session(&self) -> bool {
        self.has_completed_session.load(Ordering::SeqCst)
    }

    pub fn completed_rounds(&self) -> Vec<CompletedRound> {
        self.rounds
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn connected_device(&self) -> Option<ConnectedDevice> {
        self.device
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn battery_level(&self) -> Option<u8> {
        self.connected_device().map(|d| d.battery)
    }

    /// Registers the headset. The stored battery level only changes when the
    /// backend reports the device as connected.
    pub async fn register_device(&self, device: Device) -> Result<ConnectionDetails> {
        let device = device.validated()?;
        let details = match self.api.register_device(&device).await {
            Ok(details) => details,
            Err(err) => {
                warn!("Device registration failed for {}: {:#}", device.serial_number, err);
                return Err(err);
            }
        };

        if !details.connected {
            warn!("Device {} did not connect", device.serial_number);
            bail!("device {} did not connect", device.serial_number);
        }

        let battery = details.battery_percent();
        info!("Device {} connected, battery {}%", device.serial_number, battery);
        *self
            .device
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(ConnectedDevice { device, battery });

        Ok(details)
    }

    /// Fetches the recent session and segments its focus scores.
    pub async fn session_results(&self) -> Result<SessionReport> {
        if !self.has_completed_session() {
            bail!("no focus session has been completed yet");
        }

        let data = self.api.last_session(self.lookback_minutes).await?;
        if data.is_empty() {
            warn!("No samples recorded in the last {} minutes", self.lookback_minutes);
        }
        let report = SessionReport::from_data(data);
        info!(
            "Session report: {} intervals, {}% focus",
            report.intervals.len(),
            report.summary.focus_percentage
        );
        Ok(report)
    }

    /// Reachability check against the backend root.
    pub async fn backend_available(&self) -> bool {
        match self.api.health().await {
            Ok(_) => true,
            Err(err) => {
                warn!("BCI backend unreachable: {:#}", err);
                false
            }
        }
    }

    pub async fn shutdown(&self) {
        self.timer.shutdown().await;
    }
}
