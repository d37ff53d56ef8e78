//! Device — a vendor-controlled thing with a free-form status.
//!
//! Devices are owned by the device store. The engine only reads snapshots
//! and writes back the state a vendor reports after a dispatched action.

use serde::{Deserialize, Serialize};

use crate::error::{TrygrError, ValidationError};
use crate::id::DeviceId;
use crate::time::{Timestamp, now};

/// A physical or virtual device exposed by a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    /// Vendor tag used to resolve the capability implementation.
    pub vendor: String,
    /// Vendor model or device class, e.g. `"HS103"`.
    #[serde(rename = "type", default)]
    pub device_type: String,
    /// Free-form status, e.g. `"on"`, `"off"`, `"fault"`.
    pub status: String,
    #[serde(rename = "onACPower", default)]
    pub on_ac_power: bool,
    #[serde(default)]
    pub has_brightness: bool,
    #[serde(default)]
    pub has_volume: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
    /// Seconds the device has been powered on, as reported by the vendor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default = "now")]
    pub last_updated: Timestamp,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TrygrError::Validation`] when:
    /// - `id` is empty ([`ValidationError::EmptyDeviceId`])
    /// - `vendor` is empty ([`ValidationError::EmptyVendor`])
    /// - `brightness` is set without `has_brightness` ([`ValidationError::UnexpectedBrightness`])
    /// - `volume` is set without `has_volume` ([`ValidationError::UnexpectedVolume`])
    pub fn validate(&self) -> Result<(), TrygrError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyDeviceId.into());
        }
        if self.vendor.is_empty() {
            return Err(ValidationError::EmptyVendor.into());
        }
        if self.brightness.is_some() && !self.has_brightness {
            return Err(ValidationError::UnexpectedBrightness.into());
        }
        if self.volume.is_some() && !self.has_volume {
            return Err(ValidationError::UnexpectedVolume.into());
        }
        Ok(())
    }

    /// Replace the status and stamp `last_updated`.
    pub fn update_status(&mut self, status: impl Into<String>, at: Timestamp) {
        self.status = status.into();
        self.last_updated = at;
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    vendor: Option<String>,
    device_type: Option<String>,
    status: Option<String>,
    on_ac_power: bool,
    brightness: Option<u8>,
    volume: Option<u8>,
    ip: Option<String>,
    port: Option<u16>,
    last_updated: Option<Timestamp>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<DeviceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    #[must_use]
    pub fn device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = Some(device_type.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    #[must_use]
    pub fn on_ac_power(mut self, on_ac_power: bool) -> Self {
        self.on_ac_power = on_ac_power;
        self
    }

    /// Declare brightness support with an initial level.
    #[must_use]
    pub fn brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Declare volume support with an initial level.
    #[must_use]
    pub fn volume(mut self, volume: u8) -> Self {
        self.volume = Some(volume);
        self
    }

    #[must_use]
    pub fn address(mut self, ip: impl Into<String>, port: u16) -> Self {
        self.ip = Some(ip.into());
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn last_updated(mut self, ts: Timestamp) -> Self {
        self.last_updated = Some(ts);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`TrygrError::Validation`] if required fields are missing or empty.
    pub fn build(self) -> Result<Device, TrygrError> {
        let id = self.id.unwrap_or_else(|| DeviceId::new(""));
        let device = Device {
            name: self.name.unwrap_or_else(|| id.to_string()),
            id,
            vendor: self.vendor.unwrap_or_default(),
            device_type: self.device_type.unwrap_or_default(),
            status: self.status.unwrap_or_else(|| "off".to_string()),
            on_ac_power: self.on_ac_power,
            has_brightness: self.brightness.is_some(),
            has_volume: self.volume.is_some(),
            brightness: self.brightness,
            volume: self.volume,
            on_time: None,
            ip: self.ip,
            port: self.port,
            last_updated: self.last_updated.unwrap_or_else(now),
        };
        device.validate()?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plug() -> Device {
        Device::builder()
            .id("d1")
            .name("Porch Plug")
            .vendor("kasa")
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_device_with_defaults() {
        let device = plug();
        assert_eq!(device.id.as_str(), "d1");
        assert_eq!(device.status, "off");
        assert!(!device.has_brightness);
        assert!(device.brightness.is_none());
    }

    #[test]
    fn should_default_name_to_id() {
        let device = Device::builder().id("d9").vendor("kasa").build().unwrap();
        assert_eq!(device.name, "d9");
    }

    #[test]
    fn should_flag_brightness_support_when_level_given() {
        let device = Device::builder()
            .id("lamp")
            .vendor("kasa")
            .brightness(80)
            .build()
            .unwrap();
        assert!(device.has_brightness);
        assert_eq!(device.brightness, Some(80));
    }

    #[test]
    fn should_return_validation_error_when_id_is_empty() {
        let result = Device::builder().vendor("kasa").build();
        assert!(matches!(
            result,
            Err(TrygrError::Validation(ValidationError::EmptyDeviceId))
        ));
    }

    #[test]
    fn should_return_validation_error_when_vendor_is_empty() {
        let result = Device::builder().id("d1").build();
        assert!(matches!(
            result,
            Err(TrygrError::Validation(ValidationError::EmptyVendor))
        ));
    }

    #[test]
    fn should_reject_volume_without_capability() {
        let mut device = plug();
        device.volume = Some(3);
        assert!(matches!(
            device.validate(),
            Err(TrygrError::Validation(ValidationError::UnexpectedVolume))
        ));
    }

    #[test]
    fn should_update_status_and_timestamp() {
        let mut device = plug();
        let at = crate::time::now();
        device.update_status("on", at);
        assert_eq!(device.status, "on");
        assert_eq!(device.last_updated, at);
    }

    #[test]
    fn should_use_camel_case_wire_names() {
        let json = serde_json::to_value(plug()).unwrap();
        assert!(json.get("onACPower").is_some());
        assert!(json.get("hasBrightness").is_some());
        assert!(json.get("lastUpdated").is_some());
        assert!(json.get("brightness").is_none());
    }

    #[test]
    fn should_deserialize_minimal_wire_device() {
        let json = serde_json::json!({
            "id": "d2",
            "name": "Heater",
            "vendor": "virtual",
            "status": "on"
        });
        let device: Device = serde_json::from_value(json).unwrap();
        assert_eq!(device.status, "on");
        assert!(!device.on_ac_power);
    }
}
