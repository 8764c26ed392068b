use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

use crate::timer::TimerMode;

/// Short decaying two-partial bell tone played at a phase boundary.
pub struct Chime {
    freq: f32,
    sample_rate: u32,
    num_sample: usize,
    total_samples: usize,
    amplitude: f32,
}

impl Chime {
    const LENGTH_MS: u64 = 900;

    pub fn new(freq: f32) -> Self {
        let sample_rate = 44100;
        Self {
            freq,
            sample_rate,
            num_sample: 0,
            total_samples: (sample_rate as u64 * Self::LENGTH_MS / 1000) as usize,
            amplitude: 0.3,
        }
    }

    /// Work ending rings higher than break ending.
    pub fn for_finished(mode: TimerMode) -> Self {
        match mode {
            TimerMode::Work => Self::new(880.0),
            TimerMode::Break => Self::new(660.0),
        }
    }
}

impl Iterator for Chime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }
        self.num_sample += 1;

        let t = self.num_sample as f32 / self.sample_rate as f32;
        let envelope = (-4.0 * t).exp();
        let tone = (2.0 * PI * self.freq * t).sin() + 0.4 * (2.0 * PI * self.freq * 2.0 * t).sin();

        Some(tone * envelope * self.amplitude / 1.4)
    }
}

impl Source for Chime {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples - self.num_sample)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(Self::LENGTH_MS))
    }
}
