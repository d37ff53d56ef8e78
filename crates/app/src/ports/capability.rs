//! Device capability port — the contract every vendor implementation satisfies.

use std::future::Future;
use std::sync::Arc;

use trygr_domain::action::ActionResult;
use trygr_domain::device::Device;
use trygr_domain::error::TrygrError;
use trygr_domain::value::Value;

/// Controls the devices of one vendor.
///
/// Implementations live in adapter crates (e.g. `trygr-adapter-virtual`) and are
/// registered by vendor tag in a
/// [`CapabilityRegistry`](crate::capability_registry::CapabilityRegistry).
pub trait DeviceCapability: Send + Sync {
    /// Vendor tag matched against [`Device::vendor`].
    fn vendor(&self) -> &str;

    /// Perform a named action with a value on a device.
    ///
    /// A valid action that changes nothing returns a result with `no_op`
    /// set. An unknown action or a vendor failure is an error, usually
    /// [`TrygrError::ActionFailed`].
    fn perform_action(
        &self,
        device: &Device,
        action: &str,
        value: &Value,
    ) -> impl Future<Output = Result<ActionResult, TrygrError>> + Send;
}

impl<T: DeviceCapability> DeviceCapability for Arc<T> {
    fn vendor(&self) -> &str {
        (**self).vendor()
    }

    fn perform_action(
        &self,
        device: &Device,
        action: &str,
        value: &Value,
    ) -> impl Future<Output = Result<ActionResult, TrygrError>> + Send {
        (**self).perform_action(device, action, value)
    }
}
