//! Action dispatcher — performs a fired trigger's action and its chain hop.

use trygr_domain::action::ActionResult;
use trygr_domain::error::{NotFoundError, TrygrError};
use trygr_domain::id::DeviceId;
use trygr_domain::trigger::Trigger;
use trygr_domain::value::Value;

use crate::capability_registry::CapabilityRegistry;
use crate::ports::{DeviceCapability, DeviceStore};

/// Outcome of dispatching one fired trigger.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The trigger has no target device; only its notification runs.
    NotifyOnly,
    /// The primary action ran; `chained` is set when a chain hop was attempted.
    Completed {
        primary: ActionResult,
        chained: Option<Result<ActionResult, TrygrError>>,
    },
    /// Lookup, vendor resolution or the primary action failed.
    Failed(TrygrError),
}

impl DispatchOutcome {
    /// The primary result, when the primary action ran.
    #[must_use]
    pub fn primary(&self) -> Option<&ActionResult> {
        match self {
            Self::Completed { primary, .. } => Some(primary),
            Self::NotifyOnly | Self::Failed(_) => None,
        }
    }
}

/// Resolves target devices, invokes their vendor capability and persists
/// the state they report.
pub struct ActionDispatcher<DS, C> {
    devices: DS,
    registry: CapabilityRegistry<C>,
}

impl<DS, C> ActionDispatcher<DS, C>
where
    DS: DeviceStore + Sync,
    C: DeviceCapability,
{
    pub fn new(devices: DS, registry: CapabilityRegistry<C>) -> Self {
        Self { devices, registry }
    }

    /// The device store used for lookups and write-back.
    pub fn devices(&self) -> &DS {
        &self.devices
    }

    /// Run the trigger's action on its affected device, then at most one
    /// chained action with the same name and value.
    ///
    /// The chain hop only runs after a primary action that succeeded and
    /// changed something. A chain id equal to the affected id is dispatched
    /// as an independent second action.
    #[tracing::instrument(skip_all, fields(trigger = %trigger))]
    pub async fn dispatch(&self, trigger: &Trigger, action_value: &Value) -> DispatchOutcome {
        let Some(target) = &trigger.affected_device_id else {
            return DispatchOutcome::NotifyOnly;
        };
        let primary = match self.perform(target, &trigger.action, action_value).await {
            Ok(result) => result,
            Err(err) => return DispatchOutcome::Failed(err),
        };
        let chained = match &trigger.chain_device_id {
            Some(chain_id) if !primary.no_op => {
                Some(self.perform(chain_id, &trigger.action, action_value).await)
            }
            _ => None,
        };
        DispatchOutcome::Completed { primary, chained }
    }

    async fn perform(
        &self,
        device_id: &DeviceId,
        action: &str,
        value: &Value,
    ) -> Result<ActionResult, TrygrError> {
        let device = self
            .devices
            .get_by_id(device_id)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "Device",
                id: device_id.to_string(),
            })?;
        let capability = self.registry.resolve(&device.vendor)?;
        let result = capability.perform_action(&device, action, value).await?;
        tracing::info!(device = %device_id, action, no_op = result.no_op, "action performed");

        if !result.no_op
            && let Some(snapshot) = &result.device
            && let Err(err) = self.devices.upsert(snapshot.clone()).await
        {
            tracing::warn!(%err, device = %device_id, "failed to persist device state after action");
        }
        Ok(result)
    }
}
