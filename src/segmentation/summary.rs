use serde::{Deserialize, Serialize};

use crate::models::FocusSample;

use super::algorithm::FocusInterval;

/// Share of focused samples as a whole percentage, 0 for no samples.
pub fn focus_percentage(samples: &[FocusSample]) -> u8 {
    if samples.is_empty() {
        return 0;
    }
    let focused = samples.iter().filter(|s| s.is_focused).count();
    (100.0 * focused as f64 / samples.len() as f64).round() as u8
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FocusSummary {
    pub focus_percentage: u8,
    pub focused_samples: usize,
    pub total_samples: usize,
    pub interval_count: usize,
    pub focused_seconds: i64,
    pub distracted_seconds: i64,
}

impl FocusSummary {
    pub fn new(samples: &[FocusSample], intervals: &[FocusInterval]) -> Self {
        let (focused_seconds, distracted_seconds) =
            intervals.iter().fold((0, 0), |(focused, distracted), interval| {
                if interval.is_focused {
                    (focused + interval.duration_secs(), distracted)
                } else {
                    (focused, distracted + interval.duration_secs())
                }
            });

        Self {
            focus_percentage: focus_percentage(samples),
            focused_samples: samples.iter().filter(|s| s.is_focused).count(),
            total_samples: samples.len(),
            interval_count: intervals.len(),
            focused_seconds,
            distracted_seconds,
        }
    }

    /// Longest focused stretch, in seconds.
    pub fn longest_focus_secs(intervals: &[FocusInterval]) -> i64 {
        intervals
            .iter()
            .filter(|i| i.is_focused)
            .map(FocusInterval::duration_secs)
            .max()
            .unwrap_or(0)
    }
}
