//! Core of the Pomodoro Brain focus app: a Work/Break countdown that pauses
//! at every phase boundary, and segmentation of recorded BCI focus scores
//! into focused and distracted intervals for the post-session chart.

pub mod api;
pub mod audio;
pub mod host;
pub mod models;
pub mod segmentation;
pub mod settings;
pub mod timer;
pub mod utils;

pub use api::{BrainApi, HttpBrainApi};
pub use audio::{LogNotifier, Notifier};
pub use host::{CompletedRound, ConnectedDevice, FocusHost, SessionReport};
pub use models::{ConnectionDetails, Device, DeviceModel, FocusSample, RawSignalSample, SessionData};
pub use segmentation::{focus_percentage, segment_samples, FocusInterval, FocusSummary};
pub use settings::{AppSettings, SettingsStore};
pub use timer::{TimerConfig, TimerController, TimerMode, TimerSnapshot, TimerState};
pub use utils::init_logging;
