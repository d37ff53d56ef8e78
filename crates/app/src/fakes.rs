//! In-memory port implementations shared by the unit tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use trygr_domain::action::ActionResult;
use trygr_domain::device::Device;
use trygr_domain::error::{ActionError, TrygrError};
use trygr_domain::event::Event;
use trygr_domain::id::{DeviceId, PostalCode};
use trygr_domain::location::Location;
use trygr_domain::value::Value;

use crate::ports::{DeviceCapability, DeviceStore, EventPublisher, LocationStore, Notifier};

// ── Device store ───────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryDeviceStore {
    devices: Mutex<HashMap<DeviceId, Device>>,
    upserts: Mutex<usize>,
}

impl InMemoryDeviceStore {
    pub fn with(devices: Vec<Device>) -> Self {
        let map = devices.into_iter().map(|d| (d.id.clone(), d)).collect();
        Self {
            devices: Mutex::new(map),
            upserts: Mutex::new(0),
        }
    }

    pub fn get(&self, id: &str) -> Option<Device> {
        self.devices.lock().unwrap().get(&DeviceId::new(id)).cloned()
    }

    pub fn upsert_count(&self) -> usize {
        *self.upserts.lock().unwrap()
    }
}

impl DeviceStore for InMemoryDeviceStore {
    fn get_by_id(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, TrygrError>> + Send {
        let result = self.devices.lock().unwrap().get(id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, TrygrError>> + Send {
        let mut result: Vec<Device> = self.devices.lock().unwrap().values().cloned().collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        async { Ok(result) }
    }

    fn upsert(&self, device: Device) -> impl Future<Output = Result<Device, TrygrError>> + Send {
        self.devices
            .lock()
            .unwrap()
            .insert(device.id.clone(), device.clone());
        *self.upserts.lock().unwrap() += 1;
        async { Ok(device) }
    }
}

// ── Location store ─────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryLocationStore {
    locations: Mutex<HashMap<PostalCode, Location>>,
}

impl InMemoryLocationStore {
    pub fn with(locations: Vec<Location>) -> Self {
        let map = locations
            .into_iter()
            .map(|l| (l.postal_code.clone(), l))
            .collect();
        Self {
            locations: Mutex::new(map),
        }
    }
}

impl LocationStore for InMemoryLocationStore {
    fn get_by_postal_code(
        &self,
        postal_code: &PostalCode,
    ) -> impl Future<Output = Result<Option<Location>, TrygrError>> + Send {
        let result = self.locations.lock().unwrap().get(postal_code).cloned();
        async { Ok(result) }
    }

    fn upsert(
        &self,
        location: Location,
    ) -> impl Future<Output = Result<Location, TrygrError>> + Send {
        self.locations
            .lock()
            .unwrap()
            .insert(location.postal_code.clone(), location.clone());
        async { Ok(location) }
    }
}

// ── Capability ─────────────────────────────────────────────────────

/// Records every call. `report` changes nothing observable, `fail` errors,
/// any other action sets the status to the action value's text.
pub struct RecordingCapability {
    vendor: String,
    calls: Mutex<Vec<(DeviceId, String, Value)>>,
}

impl RecordingCapability {
    pub fn new(vendor: &str) -> Self {
        Self {
            vendor: vendor.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(DeviceId, String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl DeviceCapability for RecordingCapability {
    fn vendor(&self) -> &str {
        &self.vendor
    }

    fn perform_action(
        &self,
        device: &Device,
        action: &str,
        value: &Value,
    ) -> impl Future<Output = Result<ActionResult, TrygrError>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push((device.id.clone(), action.to_string(), value.clone()));
        let target = value.as_text();
        let result = match action {
            "report" => Ok(ActionResult::performed(format!(
                "{} is {}",
                device.name, device.status
            ))),
            "fail" => Err(ActionError {
                device_id: device.id.to_string(),
                action: action.to_string(),
                reason: "device unreachable".to_string(),
            }
            .into()),
            _ if device.status == target => {
                Ok(ActionResult::no_op(format!("{} already {target}", device.name)))
            }
            _ => {
                let mut updated = device.clone();
                updated.status.clone_from(&target);
                Ok(ActionResult::changed(
                    format!("{} set to {target}", device.name),
                    updated,
                ))
            }
        };
        async { result }
    }
}

// ── Notifier ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(Vec<String>, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(Vec<String>, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(
        &self,
        recipients: &[String],
        body: &str,
    ) -> impl Future<Output = Result<(), TrygrError>> + Send {
        let result = if self.fail {
            Err(TrygrError::NotificationFailed("mailbox unreachable".into()))
        } else {
            self.sent
                .lock()
                .unwrap()
                .push((recipients.to_vec(), body.to_string()));
            Ok(())
        };
        async { result }
    }
}

// ── Publisher ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct SpyPublisher {
    events: Mutex<Vec<Event>>,
}

impl SpyPublisher {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventPublisher for SpyPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), TrygrError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}
