use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Electrode positions reported by the headset, in wire order.
pub const EEG_CHANNELS: [&str; 8] = ["f3", "f4", "c3", "c4", "p3", "p4", "o1", "o2"];

/// One engagement classification as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FocusSample {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub coef_min: f64,
    pub coef_max: f64,
    pub coef_avg: f64,
    pub is_focused: bool,
}

/// Latest reading of every channel at one instant, in µV.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawSignalSample {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub f3: f64,
    pub f4: f64,
    pub c3: f64,
    pub c4: f64,
    pub p3: f64,
    pub p4: f64,
    pub o1: f64,
    pub o2: f64,
}

impl RawSignalSample {
    /// Channel values in [`EEG_CHANNELS`] order.
    pub fn channels(&self) -> [f64; 8] {
        [
            self.f3, self.f4, self.c3, self.c4, self.p3, self.p4, self.o1, self.o2,
        ]
    }
}

/// Response body of `GET /last/session/{minutes}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionData {
    #[serde(default)]
    pub scores: Vec<FocusSample>,
    #[serde(default)]
    pub raw: Vec<RawSignalSample>,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty() && self.raw.is_empty()
    }
}

/// The backend writes naive local timestamps; an explicit offset is accepted
/// too and dropped after conversion to the naive UTC instant.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Ok(naive);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.naive_utc())
        .map_err(|err| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn decodes_backend_payload() {
        let body = r#"{
            "scores": [
                {"timestamp": "2024-11-23T14:05:01.250000", "coef_min": 0.1, "coef_max": 0.5,
                 "coef_avg": 0.3, "is_focused": true}
            ],
            "raw": [
                {"timestamp": "2024-11-23T14:05:01", "f4": 1.0, "f3": 2.0, "c4": 3.0, "c3": 4.0,
                 "p4": 5.0, "p3": 6.0, "o1": 7.0, "o2": 8.0}
            ]
        }"#;

        let data: SessionData = serde_json::from_str(body).unwrap();
        assert_eq!(data.scores.len(), 1);
        assert!(data.scores[0].is_focused);
        assert_eq!(
            data.scores[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 11, 23)
                .unwrap()
                .and_hms_milli_opt(14, 5, 1, 250)
                .unwrap()
        );
        assert_eq!(data.raw[0].channels(), [2.0, 1.0, 4.0, 3.0, 6.0, 5.0, 7.0, 8.0]);
    }

    #[test]
    fn accepts_offset_timestamps() {
        let body = r#"{"timestamp": "2024-11-23T14:05:01+02:00", "coef_min": 0.0,
                       "coef_max": 0.0, "coef_avg": 0.0, "is_focused": false}"#;
        let sample: FocusSample = serde_json::from_str(body).unwrap();
        assert_eq!(
            sample.timestamp,
            NaiveDate::from_ymd_opt(2024, 11, 23)
                .unwrap()
                .and_hms_opt(12, 5, 1)
                .unwrap()
        );
    }

    #[test]
    fn rejects_garbage_timestamps() {
        let body = r#"{"timestamp": "yesterday", "coef_min": 0.0,
                       "coef_max": 0.0, "coef_avg": 0.0, "is_focused": false}"#;
        assert!(serde_json::from_str::<FocusSample>(body).is_err());
    }
}
