use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeviceModel {
    #[serde(rename = "BrainAccess_Mini")]
    BrainAccessMini,
}

impl Default for DeviceModel {
    fn default() -> Self {
        DeviceModel::BrainAccessMini
    }
}

impl DeviceModel {
    pub fn display_name(&self) -> &'static str {
        match self {
            DeviceModel::BrainAccessMini => "BrainAccess Mini",
        }
    }
}

/// Registration form payload for `POST /register/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub serial_number: String,
    pub model: DeviceModel,
}

impl Device {
    pub fn new(serial_number: impl Into<String>, model: DeviceModel) -> Self {
        Self {
            serial_number: serial_number.into(),
            model,
        }
    }

    /// Trims the serial number and rejects a blank one.
    pub fn validated(mut self) -> Result<Self> {
        let trimmed = self.serial_number.trim();
        if trimmed.is_empty() {
            bail!("serial number is required");
        }
        self.serial_number = trimmed.to_string();
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionDetails {
    pub connected: bool,
    pub battery: u8,
}

impl ConnectionDetails {
    pub fn battery_percent(&self) -> u8 {
        self.battery.min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_uses_backend_field_names() {
        let device = Device::new("BA-0042", DeviceModel::BrainAccessMini);
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["serialNumber"], "BA-0042");
        assert_eq!(json["model"], "BrainAccess_Mini");
    }

    #[test]
    fn blank_serial_is_rejected() {
        assert!(Device::new("   ", DeviceModel::BrainAccessMini)
            .validated()
            .is_err());
        let device = Device::new("  BA-1 ", DeviceModel::BrainAccessMini)
            .validated()
            .unwrap();
        assert_eq!(device.serial_number, "BA-1");
    }

    #[test]
    fn battery_is_capped() {
        let details: ConnectionDetails =
            serde_json::from_str(r#"{"connected": true, "battery": 140}"#).unwrap();
        assert_eq!(details.battery_percent(), 100);
    }
}
