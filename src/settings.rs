use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::timer::{PhaseDurations, DEFAULT_BREAK_SECS, DEFAULT_WORK_SECS};

pub const API_URL_ENV: &str = "POMODORO_BRAIN_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOOKBACK_MINUTES: u32 = 340;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimerSettings {
    pub work_secs: u32,
    pub break_secs: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_secs: DEFAULT_WORK_SECS,
            break_secs: DEFAULT_BREAK_SECS,
        }
    }
}

impl TimerSettings {
    pub fn durations(&self) -> PhaseDurations {
        PhaseDurations {
            work_secs: self.work_secs,
            break_secs: self.break_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub volume: f32,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub timer: TimerSettings,
    pub api: ApiSettings,
    pub session_lookback_minutes: u32,
    pub notification: NotificationSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            timer: TimerSettings::default(),
            api: ApiSettings::default(),
            session_lookback_minutes: DEFAULT_LOOKBACK_MINUTES,
            notification: NotificationSettings::default(),
        }
    }
}

impl AppSettings {
    /// Applies `POMODORO_BRAIN_API_URL` if it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
        self
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring unreadable settings at {}: {}",
                    path.display(),
                    err
                );
                AppSettings::default()
            })
        } else {
            AppSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn settings(&self) -> AppSettings {
        self.read().clone()
    }

    /// Stored settings with environment overrides applied.
    pub fn effective(&self) -> AppSettings {
        self.settings().with_env_overrides()
    }

    pub fn update_timer(&self, timer: TimerSettings) -> Result<()> {
        self.update(|settings| settings.timer = timer)
    }

    pub fn update_notification(&self, notification: NotificationSettings) -> Result<()> {
        self.update(|settings| settings.notification = notification)
    }

    pub fn update_api(&self, api: ApiSettings) -> Result<()> {
        self.update(|settings| settings.api = api)
    }

    fn update(&self, apply: impl FnOnce(&mut AppSettings)) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        apply(&mut guard);
        self.persist(&guard)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, AppSettings> {
        self.data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, data: &AppSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: AppSettings = serde_json::from_str(&contents)?;
        let mut guard = self
            .data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = data;
        Ok(())
    }
}
