//! Action results reported by vendor capabilities.

use serde::{Deserialize, Serialize};

use crate::device::Device;

/// Outcome of one action invocation on one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    /// Human-readable summary, used as the notification body.
    pub result_text: String,
    /// The action was valid but changed nothing (device already in target state).
    pub no_op: bool,
    /// Device snapshot after the action, when the vendor reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
}

impl ActionResult {
    /// A result that changed the device, carrying its new snapshot.
    #[must_use]
    pub fn changed(result_text: impl Into<String>, device: Device) -> Self {
        Self {
            result_text: result_text.into(),
            no_op: false,
            device: Some(device),
        }
    }

    /// A result that left the device untouched.
    #[must_use]
    pub fn no_op(result_text: impl Into<String>) -> Self {
        Self {
            result_text: result_text.into(),
            no_op: true,
            device: None,
        }
    }

    /// A result that performed something observable without a new snapshot.
    #[must_use]
    pub fn performed(result_text: impl Into<String>) -> Self {
        Self {
            result_text: result_text.into(),
            no_op: false,
            device: None,
        }
    }
}
