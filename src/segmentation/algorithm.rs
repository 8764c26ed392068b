use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::FocusSample;

/// A maximal run of consecutive samples sharing one focus classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FocusInterval {
    pub start_timestamp: NaiveDateTime,
    pub end_timestamp: NaiveDateTime,
    pub is_focused: bool,
    pub sample_count: usize,
}

impl FocusInterval {
    fn open(sample: &FocusSample) -> Self {
        Self {
            start_timestamp: sample.timestamp,
            end_timestamp: sample.timestamp,
            is_focused: sample.is_focused,
            sample_count: 1,
        }
    }

    pub fn duration_secs(&self) -> i64 {
        (self.end_timestamp - self.start_timestamp).num_seconds()
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start_timestamp <= timestamp && timestamp <= self.end_timestamp
    }
}

/// Split samples into alternating focused/distracted intervals.
///
/// Each interval runs from the first to the last sample of its run, so the
/// final interval ends exactly on the last sample. Input that is not ordered
/// by timestamp is stably sorted first; equal timestamps keep input order.
pub fn segment_samples(samples: &[FocusSample]) -> Vec<FocusInterval> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut ordered: Vec<&FocusSample> = samples.iter().collect();
    if !ordered.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp) {
        ordered.sort_by_key(|sample| sample.timestamp);
    }

    let mut intervals = Vec::new();
    let mut current: Option<FocusInterval> = None;

    for sample in ordered {
        match &mut current {
            Some(interval) if interval.is_focused == sample.is_focused => {
                interval.end_timestamp = sample.timestamp;
                interval.sample_count += 1;
            }
            _ => {
                if let Some(interval) = current.take() {
                    intervals.push(interval);
                }
                current = Some(FocusInterval::open(sample));
            }
        }
    }

    if let Some(interval) = current {
        intervals.push(interval);
    }

    intervals
}
