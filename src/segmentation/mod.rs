pub mod algorithm;
pub mod config;
pub mod scoring;
pub mod summary;

pub use algorithm::{segment_samples, FocusInterval};
pub use config::ScoringConfig;
pub use scoring::{band_power, engagement_index, score_window, Spectrum};
pub use summary::{focus_percentage, FocusSummary};
