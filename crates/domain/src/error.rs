//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`TrygrError`]
//! via `From`. The variants mirror how the engine reacts to a failure:
//! `NotFound` and `UnsupportedVendor` skip the trigger, `ActionFailed` still
//! notifies, `NotificationFailed` is logged only, `MalformedTrigger` makes the
//! trigger non-matching for the current pass.

/// Top-level error type shared by the domain, application and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum TrygrError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A device or location does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// No capability implementation is registered for a vendor tag.
    #[error("unsupported vendor {0:?}")]
    UnsupportedVendor(String),

    /// A vendor capability rejected or failed to perform an action.
    #[error(transparent)]
    ActionFailed(#[from] ActionError),

    /// The notification transport failed to deliver a message.
    #[error("notification failed")]
    NotificationFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A trigger value could not be coerced to the type its trigger needs.
    #[error(transparent)]
    MalformedTrigger(#[from] MalformedTriggerError),

    /// A storage backend failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("device id must not be empty")]
    EmptyDeviceId,
    #[error("vendor must not be empty")]
    EmptyVendor,
    #[error("postal code must not be empty")]
    EmptyPostalCode,
    #[error("action must not be empty")]
    EmptyAction,
    #[error("device trigger requires an affected device id")]
    MissingAffectedDevice,
    #[error("brightness set on a device without brightness support")]
    UnexpectedBrightness,
    #[error("volume set on a device without volume support")]
    UnexpectedVolume,
    #[error("invalid trigger value: {0}")]
    InvalidTriggerValue(#[from] MalformedTriggerError),
}

/// A referenced device or location is absent from its store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A vendor capability failed to perform an action on a device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("action {action:?} failed on device {device_id}: {reason}")]
pub struct ActionError {
    pub device_id: String,
    pub action: String,
    pub reason: String,
}

/// A polymorphic trigger or action value has the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedTriggerError {
    #[error("expected a number, got {0:?}")]
    NotANumber(String),
    #[error("expected a time of day (HH:MM or HH:MM:SS), got {0:?}")]
    NotATimeOfDay(String),
    #[error("expected sunrise, sunset, now or a number of minutes, got {0:?}")]
    UnknownReference(String),
}
