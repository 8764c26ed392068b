use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};

use pomodoro_brain_lib::timer::PhaseDurations;
use pomodoro_brain_lib::{
    BrainApi, ConnectionDetails, Device, DeviceModel, FocusHost, FocusSample, LogNotifier,
    SessionData, TimerConfig, TimerMode,
};

struct FakeApi {
    connection: ConnectionDetails,
    session: SessionData,
    requested_minutes: AtomicU32,
}

impl FakeApi {
    fn new(connection: ConnectionDetails, session: SessionData) -> Self {
        Self {
            connection,
            session,
            requested_minutes: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl BrainApi for FakeApi {
    async fn health(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({ "message": "Hello World" }))
    }

    async fn register_device(&self, device: &Device) -> Result<ConnectionDetails> {
        if device.serial_number == "offline" {
            bail!("backend error: http 500");
        }
        Ok(self.connection)
    }

    async fn last_session(&self, minutes: u32) -> Result<SessionData> {
        self.requested_minutes.store(minutes, Ordering::SeqCst);
        Ok(self.session.clone())
    }
}

fn at(secs: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 11, 23)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
        + ChronoDuration::seconds(secs)
}

fn scores(pattern: &[bool]) -> Vec<FocusSample> {
    pattern
        .iter()
        .enumerate()
        .map(|(i, &is_focused)| FocusSample {
            timestamp: at(10 * i as i64),
            coef_min: 0.1,
            coef_max: 0.5,
            coef_avg: if is_focused { 0.4 } else { 0.2 },
            is_focused,
        })
        .collect()
}

fn build_host(api: Arc<FakeApi>) -> FocusHost {
    let config = TimerConfig::with_durations(PhaseDurations {
        work_secs: 2,
        break_secs: 3,
    });
    FocusHost::new(config, 340, api, Arc::new(LogNotifier)).unwrap()
}

#[tokio::test(start_paused = true)]
async fn results_unlock_after_first_work_phase() {
    let api = Arc::new(FakeApi::new(
        ConnectionDetails {
            connected: true,
            battery: 27,
        },
        SessionData {
            scores: scores(&[false, false, true, true, false]),
            raw: Vec::new(),
        },
    ));
    let host = build_host(api.clone());

    assert!(host.backend_available().await);
    assert!(!host.has_completed_session());
    assert!(host.session_results().await.is_err());

    host.timer().toggle().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert!(host.has_completed_session());
    assert_eq!(host.completed_rounds().len(), 1);
    let snapshot = host.timer().snapshot().await;
    assert_eq!(snapshot.mode, TimerMode::Break);
    assert!(!snapshot.is_running);
    assert_eq!(snapshot.rounds, 1);

    let report = host.session_results().await.unwrap();
    assert_eq!(api.requested_minutes.load(Ordering::SeqCst), 340);
    assert_eq!(report.intervals.len(), 3);
    assert_eq!(report.intervals[0].end_timestamp, at(10));
    assert!(report.intervals[1].is_focused);
    assert_eq!(report.intervals[2].start_timestamp, at(40));
    assert_eq!(report.intervals[2].end_timestamp, at(40));
    assert_eq!(report.summary.focus_percentage, 40);

    host.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn break_completion_adds_no_round() {
    let api = Arc::new(FakeApi::new(
        ConnectionDetails {
            connected: true,
            battery: 80,
        },
        SessionData::default(),
    ));
    let host = build_host(api);

    host.timer().toggle().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    host.timer().toggle().await.unwrap();
    tokio::time::sleep(Duration::from_millis(3500)).await;

    let snapshot = host.timer().snapshot().await;
    assert_eq!(snapshot.mode, TimerMode::Work);
    assert_eq!(snapshot.rounds, 1);
    assert_eq!(host.completed_rounds().len(), 1);

    let report = host.session_results().await.unwrap();
    assert!(report.intervals.is_empty());
    assert_eq!(report.summary.focus_percentage, 0);
}

#[tokio::test]
async fn registration_sets_battery_only_when_connected() {
    let connected = Arc::new(FakeApi::new(
        ConnectionDetails {
            connected: true,
            battery: 27,
        },
        SessionData::default(),
    ));
    let host = build_host(connected);
    assert_eq!(host.battery_level(), None);

    assert!(host
        .register_device(Device::new("  ", DeviceModel::BrainAccessMini))
        .await
        .is_err());
    assert!(host
        .register_device(Device::new("offline", DeviceModel::BrainAccessMini))
        .await
        .is_err());
    assert_eq!(host.battery_level(), None);

    let details = host
        .register_device(Device::new("BA-0042", DeviceModel::BrainAccessMini))
        .await
        .unwrap();
    assert!(details.connected);
    assert_eq!(host.battery_level(), Some(27));
    assert_eq!(
        host.connected_device().unwrap().device.serial_number,
        "BA-0042"
    );

    let refused = Arc::new(FakeApi::new(
        ConnectionDetails {
            connected: false,
            battery: 90,
        },
        SessionData::default(),
    ));
    let host = build_host(refused);
    assert!(host
        .register_device(Device::new("BA-0043", DeviceModel::BrainAccessMini))
        .await
        .is_err());
    assert_eq!(host.battery_level(), None);
}
