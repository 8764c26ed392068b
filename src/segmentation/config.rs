/// Tunables for turning raw EEG windows into focus samples.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Headset sampling rate
    pub sample_rate_hz: f64,

    /// Length of the trailing window scored per sample
    pub window_secs: u32,

    /// Average engagement index above which a window counts as focused
    pub focus_threshold: f64,

    /// Frequency bands, inclusive on both edges
    pub theta_hz: (f64, f64),
    pub alpha_hz: (f64, f64),
    pub beta_hz: (f64, f64),
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 250.0,
            window_secs: 10,
            focus_threshold: 0.26,
            theta_hz: (4.0, 8.0),
            alpha_hz: (8.0, 13.0),
            beta_hz: (13.0, 32.0),
        }
    }
}

impl ScoringConfig {
    pub fn window_len(&self) -> usize {
        (self.sample_rate_hz * self.window_secs as f64).round() as usize
    }

    pub(crate) fn max_band_hz(&self) -> f64 {
        self.theta_hz.1.max(self.alpha_hz.1).max(self.beta_hz.1)
    }
}
