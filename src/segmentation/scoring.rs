use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use std::f64::consts::PI;

use crate::models::FocusSample;
use crate::segmentation::config::ScoringConfig;

/// Single-sided amplitude spectrum on an evenly spaced frequency grid.
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub freqs: Vec<f64>,
    pub amplitudes: Vec<f64>,
}

impl Spectrum {
    /// DFT bins `k < N/2` with amplitude `2/N * |X_k|`, stopping after `max_hz`.
    pub fn compute(signal: &[f64], sample_rate_hz: f64, max_hz: f64) -> Self {
        let n = signal.len();
        if n == 0 || sample_rate_hz <= 0.0 {
            return Self {
                freqs: Vec::new(),
                amplitudes: Vec::new(),
            };
        }

        let highest_bin = (max_hz.max(0.0) * n as f64 / sample_rate_hz).floor() as usize;
        let bins = (n / 2).min(highest_bin + 1);

        let mut freqs = Vec::with_capacity(bins);
        let mut amplitudes = Vec::with_capacity(bins);
        for k in 0..bins {
            let (mut re, mut im) = (0.0, 0.0);
            for (i, x) in signal.iter().enumerate() {
                let angle = 2.0 * PI * (k * i % n) as f64 / n as f64;
                re += x * angle.cos();
                im -= x * angle.sin();
            }
            freqs.push(k as f64 * sample_rate_hz / n as f64);
            amplitudes.push(2.0 / n as f64 * (re * re + im * im).sqrt());
        }

        Self { freqs, amplitudes }
    }

    /// Integrated squared amplitude over `[low_hz, high_hz]`.
    pub fn band_power(&self, low_hz: f64, high_hz: f64) -> f64 {
        let (xs, ys): (Vec<f64>, Vec<f64>) = self
            .freqs
            .iter()
            .zip(&self.amplitudes)
            .filter(|(f, _)| **f >= low_hz && **f <= high_hz)
            .map(|(f, a)| (*f, a * a))
            .unzip();
        simpson(&xs, &ys)
    }
}

/// Composite Simpson's rule on an even grid; a trailing odd interval is
/// closed with the trapezoid rule.
fn simpson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    if n == 2 {
        return (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0;
    }

    let simpson_points = if n % 2 == 1 { n } else { n - 1 };
    let h = (xs[simpson_points - 1] - xs[0]) / (simpson_points - 1) as f64;
    let mut total = ys[0] + ys[simpson_points - 1];
    for (i, y) in ys.iter().enumerate().take(simpson_points - 1).skip(1) {
        total += if i % 2 == 1 { 4.0 * y } else { 2.0 * y };
    }
    let mut area = total * h / 3.0;

    if simpson_points < n {
        area += (xs[n - 1] - xs[n - 2]) * (ys[n - 2] + ys[n - 1]) / 2.0;
    }
    area
}

pub fn band_power(signal: &[f64], sample_rate_hz: f64, low_hz: f64, high_hz: f64) -> f64 {
    Spectrum::compute(signal, sample_rate_hz, high_hz).band_power(low_hz, high_hz)
}

/// `beta / (alpha + theta)`; 0 when there is no alpha or theta power.
pub fn engagement_index(signal: &[f64], config: &ScoringConfig) -> f64 {
    let spectrum = Spectrum::compute(signal, config.sample_rate_hz, config.max_band_hz());
    let beta = spectrum.band_power(config.beta_hz.0, config.beta_hz.1);
    let alpha = spectrum.band_power(config.alpha_hz.0, config.alpha_hz.1);
    let theta = spectrum.band_power(config.theta_hz.0, config.theta_hz.1);

    let denominator = alpha + theta;
    if denominator <= f64::EPSILON || !denominator.is_finite() {
        return 0.0;
    }
    beta / denominator
}

/// Scores one multi-channel window. Only the trailing `window_len` samples of
/// each channel are used.
pub fn score_window<S: AsRef<[f64]>>(
    channels: &[S],
    timestamp: NaiveDateTime,
    config: &ScoringConfig,
) -> Result<FocusSample> {
    if channels.is_empty() {
        bail!("cannot score a window without channels");
    }

    let window_len = config.window_len();
    let mut indices = Vec::with_capacity(channels.len());
    for (idx, channel) in channels.iter().enumerate() {
        let signal = channel.as_ref();
        if signal.is_empty() {
            bail!("channel {} has no samples", idx);
        }
        let tail = &signal[signal.len().saturating_sub(window_len)..];
        indices.push(engagement_index(tail, config));
    }

    let coef_min = indices.iter().copied().fold(f64::INFINITY, f64::min);
    let coef_max = indices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let coef_avg = indices.iter().sum::<f64>() / indices.len() as f64;

    Ok(FocusSample {
        timestamp,
        coef_min,
        coef_max,
        coef_avg,
        is_focused: coef_avg > config.focus_threshold,
    })
}
