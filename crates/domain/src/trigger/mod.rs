//! Trigger — a declarative rule binding a condition to an action.
//!
//! A trigger watches one kind of fact (a device status, the current
//! temperature, or the clock) and names the action to perform on its
//! affected device, an optional chained device, and who to notify.

mod evaluate;
mod schedule;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{TrygrError, ValidationError};
use crate::id::{DeviceId, TriggerKey};
use crate::value::Value;

pub use evaluate::{Evaluation, Occurrence};
pub use schedule::{RelativeReference, parse_time_of_day};

/// Which kind of fact a trigger watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerType {
    /// A device's status equals the trigger value.
    Device,
    /// The local time of day reaches the trigger value.
    AbsoluteTime,
    /// Sunrise, sunset or load time plus an offset is reached.
    RelativeTime,
    /// The temperature drops below the trigger value.
    MinTemp,
    /// The temperature rises above the trigger value.
    MaxTemp,
}

impl TriggerType {
    /// Level conditions fire on the rising edge; the rest fire once per occurrence.
    #[must_use]
    pub fn is_level(self) -> bool {
        matches!(self, Self::Device | Self::MinTemp | Self::MaxTemp)
    }

    /// Whether the trigger is driven by the scheduler clock.
    #[must_use]
    pub fn is_scheduled(self) -> bool {
        !self.is_level()
    }

    /// Wire name of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::AbsoluteTime => "absoluteTime",
            Self::RelativeTime => "relativeTime",
            Self::MinTemp => "minTemp",
            Self::MaxTemp => "maxTemp",
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declarative rule: condition, action, optional chain and recipients.
///
/// Triggers are immutable once loaded; the owning collection is replaced
/// wholesale when it is refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    /// Device watched by `device` triggers and targeted by the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_device_id: Option<DeviceId>,
    pub trigger_type: TriggerType,
    pub trigger_value: Value,
    /// Minutes added to the reference instant of a `relativeTime` trigger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_offset: Option<i32>,
    pub action: String,
    pub action_value: Value,
    /// Device that receives the same action after a successful primary action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_device_id: Option<DeviceId>,
    /// Notification recipients; empty means no notification.
    #[serde(default)]
    pub notify: Vec<String>,
}

impl Trigger {
    /// Create a builder for a trigger of the given type.
    #[must_use]
    pub fn builder(trigger_type: TriggerType) -> TriggerBuilder {
        TriggerBuilder::new(trigger_type)
    }

    /// Identity used by the dedup tracker.
    ///
    /// Derived from every field, so identical triggers share one identity
    /// and a refreshed collection keeps the keys of unchanged triggers.
    #[must_use]
    pub fn key(&self) -> TriggerKey {
        let mut hasher = DefaultHasher::new();
        self.affected_device_id.hash(&mut hasher);
        self.trigger_type.hash(&mut hasher);
        hash_value(&self.trigger_value, &mut hasher);
        self.trigger_offset.hash(&mut hasher);
        self.action.hash(&mut hasher);
        hash_value(&self.action_value, &mut hasher);
        self.chain_device_id.hash(&mut hasher);
        self.notify.hash(&mut hasher);
        TriggerKey::from_raw(hasher.finish())
    }

    /// Whether the action has no target device and only notifies.
    #[must_use]
    pub fn is_notify_only(&self) -> bool {
        self.affected_device_id.is_none()
    }

    /// Check that the trigger can be evaluated.
    ///
    /// # Errors
    ///
    /// Returns [`TrygrError::Validation`] when:
    /// - `action` is empty ([`ValidationError::EmptyAction`])
    /// - a `device` trigger has no affected device ([`ValidationError::MissingAffectedDevice`])
    /// - the trigger value cannot be coerced for its type ([`ValidationError::InvalidTriggerValue`])
    pub fn validate(&self) -> Result<(), TrygrError> {
        if self.action.trim().is_empty() {
            return Err(ValidationError::EmptyAction.into());
        }
        match self.trigger_type {
            TriggerType::Device => {
                if self.affected_device_id.as_ref().is_none_or(DeviceId::is_empty) {
                    return Err(ValidationError::MissingAffectedDevice.into());
                }
            }
            TriggerType::MinTemp | TriggerType::MaxTemp => {
                self.trigger_value
                    .as_number()
                    .map_err(ValidationError::from)?;
            }
            TriggerType::AbsoluteTime => {
                parse_time_of_day(&self.trigger_value.as_text()).map_err(ValidationError::from)?;
            }
            TriggerType::RelativeTime => {
                RelativeReference::parse(&self.trigger_value).map_err(ValidationError::from)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.trigger_type)?;
        if let Some(device_id) = &self.affected_device_id {
            write!(f, "({device_id})")?;
        }
        write!(f, " {} -> {}", self.trigger_value, self.action)
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Number(n) => {
            0u8.hash(state);
            n.to_bits().hash(state);
        }
        Value::Text(s) => {
            1u8.hash(state);
            s.hash(state);
        }
    }
}

/// Step-by-step builder for [`Trigger`].
#[derive(Debug)]
pub struct TriggerBuilder {
    trigger: Trigger,
}

impl TriggerBuilder {
    fn new(trigger_type: TriggerType) -> Self {
        Self {
            trigger: Trigger {
                affected_device_id: None,
                trigger_type,
                trigger_value: Value::Text(String::new()),
                trigger_offset: None,
                action: String::new(),
                action_value: Value::Text(String::new()),
                chain_device_id: None,
                notify: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn affected_device(mut self, id: impl Into<DeviceId>) -> Self {
        self.trigger.affected_device_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.trigger.trigger_value = value.into();
        self
    }

    #[must_use]
    pub fn offset(mut self, minutes: i32) -> Self {
        self.trigger.trigger_offset = Some(minutes);
        self
    }

    /// Set the action name and the value passed to it.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>, value: impl Into<Value>) -> Self {
        self.trigger.action = action.into();
        self.trigger.action_value = value.into();
        self
    }

    #[must_use]
    pub fn chain(mut self, id: impl Into<DeviceId>) -> Self {
        self.trigger.chain_device_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn notify(mut self, recipient: impl Into<String>) -> Self {
        self.trigger.notify.push(recipient.into());
        self
    }

    /// Consume the builder, validate, and return a [`Trigger`].
    ///
    /// # Errors
    ///
    /// Returns [`TrygrError::Validation`] as described in [`Trigger::validate`].
    pub fn build(self) -> Result<Trigger, TrygrError> {
        self.trigger.validate()?;
        Ok(self.trigger)
    }
}
