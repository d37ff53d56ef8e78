//! # trygr-adapter-virtual
//!
//! Virtual/demo vendor that simulates devices in memory, for testing and
//! demonstration purposes.
//!
//! ## Provided adapters
//!
//! | Adapter | Port | Behaviour |
//! |---------|------|-----------|
//! | [`VirtualCapability`] | `DeviceCapability` | Responds to `turnOn` / `turnOff` / `toggle` / `setStatus` / `setBrightness` / `setVolume` / `report` |
//! | [`VirtualMailbox`] | `Notifier` | Logs and records every message instead of sending mail |
//!
//! ## Dependency rule
//!
//! Depends on `trygr-app` (port traits) and `trygr-domain` only.

mod capability;
mod mailbox;

pub use capability::VirtualCapability;
pub use mailbox::{Delivery, VirtualMailbox};
