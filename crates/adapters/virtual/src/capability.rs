//! Virtual device capability — applies actions to the device snapshot in memory.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use trygr_app::ports::DeviceCapability;
use trygr_domain::action::ActionResult;
use trygr_domain::device::Device;
use trygr_domain::error::{ActionError, TrygrError};
use trygr_domain::id::DeviceId;
use trygr_domain::time::now;
use trygr_domain::value::Value;

const DEFAULT_VENDOR: &str = "virtual";

/// A simulated vendor. Every action is computed from the device snapshot
/// it is handed; nothing leaves the process.
///
/// Devices can be marked offline to simulate an unreachable vendor.
pub struct VirtualCapability {
    vendor: String,
    offline: Mutex<HashSet<DeviceId>>,
}

impl Default for VirtualCapability {
    fn default() -> Self {
        Self::new(DEFAULT_VENDOR)
    }
}

impl VirtualCapability {
    /// Create a capability answering for `vendor`.
    #[must_use]
    pub fn new(vendor: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            offline: Mutex::new(HashSet::new()),
        }
    }

    /// Mark a device unreachable (or reachable again).
    pub fn set_offline(&self, id: impl Into<DeviceId>, offline: bool) {
        let id = id.into();
        let mut set = self.offline.lock().unwrap_or_else(PoisonError::into_inner);
        if offline {
            set.insert(id);
        } else {
            set.remove(&id);
        }
    }

    fn is_offline(&self, id: &DeviceId) -> bool {
        self.offline
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    fn apply(
        &self,
        device: &Device,
        action: &str,
        value: &Value,
    ) -> Result<ActionResult, TrygrError> {
        if self.is_offline(&device.id) {
            return Err(failure(device, action, "device unreachable"));
        }
        match action {
            "turnOn" => Ok(set_status(device, "on")),
            "turnOff" => Ok(set_status(device, "off")),
            "toggle" => {
                let target = if device.status == "on" { "off" } else { "on" };
                Ok(set_status(device, target))
            }
            "setStatus" => Ok(set_status(device, &value.as_text())),
            "setBrightness" if device.has_brightness => {
                let level = level(device, action, value)?;
                if device.brightness == Some(level) {
                    return Ok(ActionResult::no_op(format!(
                        "{} brightness already {level}",
                        device.name
                    )));
                }
                let mut updated = device.clone();
                updated.brightness = Some(level);
                updated.last_updated = now();
                Ok(ActionResult::changed(
                    format!("{} brightness set to {level}", device.name),
                    updated,
                ))
            }
            "setVolume" if device.has_volume => {
                let level = level(device, action, value)?;
                if device.volume == Some(level) {
                    return Ok(ActionResult::no_op(format!(
                        "{} volume already {level}",
                        device.name
                    )));
                }
                let mut updated = device.clone();
                updated.volume = Some(level);
                updated.last_updated = now();
                Ok(ActionResult::changed(
                    format!("{} volume set to {level}", device.name),
                    updated,
                ))
            }
            "setBrightness" | "setVolume" => {
                Err(failure(device, action, "not supported by device"))
            }
            "report" => Ok(ActionResult::performed(format!(
                "{} is {}",
                device.name, device.status
            ))),
            _ => Err(failure(device, action, "unknown action")),
        }
    }
}

impl DeviceCapability for VirtualCapability {
    fn vendor(&self) -> &str {
        &self.vendor
    }

    fn perform_action(
        &self,
        device: &Device,
        action: &str,
        value: &Value,
    ) -> impl Future<Output = Result<ActionResult, TrygrError>> + Send {
        let result = self.apply(device, action, value);
        match &result {
            Ok(r) => {
                tracing::debug!(device = %device.id, action, no_op = r.no_op, "virtual action");
            }
            Err(err) => {
                tracing::debug!(device = %device.id, action, %err, "virtual action failed");
            }
        }
        async { result }
    }
}

fn set_status(device: &Device, status: &str) -> ActionResult {
    if device.status == status {
        return ActionResult::no_op(format!("{} already {status}", device.name));
    }
    let mut updated = device.clone();
    updated.update_status(status, now());
    ActionResult::changed(format!("{} turned {status}", device.name), updated)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn level(device: &Device, action: &str, value: &Value) -> Result<u8, TrygrError> {
    let n = value
        .as_number()
        .map_err(|err| failure(device, action, &err.to_string()))?;
    Ok(n.round().clamp(0.0, 100.0) as u8)
}

fn failure(device: &Device, action: &str, reason: &str) -> TrygrError {
    ActionError {
        device_id: device.id.to_string(),
        action: action.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp(status: &str) -> Device {
        Device::builder()
            .id("lamp")
            .name("Desk Lamp")
            .vendor("virtual")
            .status(status)
            .brightness(40)
            .build()
            .unwrap()
    }

    async fn perform(
        cap: &VirtualCapability,
        device: &Device,
        action: &str,
        value: Value,
    ) -> Result<ActionResult, TrygrError> {
        cap.perform_action(device, action, &value).await
    }

    #[test]
    fn should_answer_for_virtual_vendor_by_default() {
        assert_eq!(VirtualCapability::default().vendor(), "virtual");
        assert_eq!(VirtualCapability::new("kasa").vendor(), "kasa");
    }

    #[tokio::test]
    async fn should_turn_on_and_report_new_snapshot_when_device_is_off() {
        let cap = VirtualCapability::default();

        let result = perform(&cap, &lamp("off"), "turnOn", Value::from("")).await.unwrap();

        assert!(!result.no_op);
        assert_eq!(result.device.unwrap().status, "on");
        assert_eq!(result.result_text, "Desk Lamp turned on");
    }

    #[tokio::test]
    async fn should_return_no_op_when_device_already_in_target_state() {
        let cap = VirtualCapability::default();

        let result = perform(&cap, &lamp("off"), "turnOff", Value::from("")).await.unwrap();

        assert!(result.no_op);
        assert!(result.device.is_none());
    }

    #[tokio::test]
    async fn should_flip_status_when_toggled() {
        let cap = VirtualCapability::default();

        let result = perform(&cap, &lamp("on"), "toggle", Value::from("")).await.unwrap();

        assert_eq!(result.device.unwrap().status, "off");
    }

    #[tokio::test]
    async fn should_set_status_from_action_value() {
        let cap = VirtualCapability::default();

        let result = perform(&cap, &lamp("off"), "setStatus", Value::from("fault"))
            .await
            .unwrap();

        assert_eq!(result.device.unwrap().status, "fault");
    }

    #[tokio::test]
    async fn should_clamp_brightness_when_value_out_of_range() {
        let cap = VirtualCapability::default();

        let result = perform(&cap, &lamp("on"), "setBrightness", Value::from(150))
            .await
            .unwrap();

        assert_eq!(result.device.unwrap().brightness, Some(100));
    }

    #[tokio::test]
    async fn should_fail_when_brightness_value_is_not_a_number() {
        let cap = VirtualCapability::default();

        let result = perform(&cap, &lamp("on"), "setBrightness", Value::from("bright")).await;

        assert!(matches!(result, Err(TrygrError::ActionFailed(_))));
    }

    #[tokio::test]
    async fn should_fail_when_device_has_no_volume() {
        let cap = VirtualCapability::default();

        let result = perform(&cap, &lamp("on"), "setVolume", Value::from(10)).await;

        assert!(matches!(result, Err(TrygrError::ActionFailed(_))));
    }

    #[tokio::test]
    async fn should_report_status_without_snapshot() {
        let cap = VirtualCapability::default();

        let result = perform(&cap, &lamp("on"), "report", Value::from("")).await.unwrap();

        assert!(!result.no_op);
        assert!(result.device.is_none());
        assert_eq!(result.result_text, "Desk Lamp is on");
    }

    #[tokio::test]
    async fn should_fail_when_action_is_unknown() {
        let cap = VirtualCapability::default();

        let result = perform(&cap, &lamp("on"), "explode", Value::from("")).await;

        assert!(matches!(result, Err(TrygrError::ActionFailed(_))));
    }

    #[tokio::test]
    async fn should_fail_when_device_is_offline() {
        let cap = VirtualCapability::default();
        cap.set_offline("lamp", true);

        let offline = perform(&cap, &lamp("off"), "turnOn", Value::from("")).await;
        cap.set_offline("lamp", false);
        let online = perform(&cap, &lamp("off"), "turnOn", Value::from("")).await;

        assert!(matches!(offline, Err(TrygrError::ActionFailed(_))));
        assert!(online.is_ok());
    }
}
