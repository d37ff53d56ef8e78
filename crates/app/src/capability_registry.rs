//! Capability registry — vendor tag to capability implementation.

use std::collections::HashMap;

use trygr_domain::error::TrygrError;

use crate::ports::DeviceCapability;

/// Registry of vendor capabilities, filled once at startup.
pub struct CapabilityRegistry<C> {
    by_vendor: HashMap<String, C>,
}

impl<C> Default for CapabilityRegistry<C> {
    fn default() -> Self {
        Self {
            by_vendor: HashMap::new(),
        }
    }
}

impl<C: DeviceCapability> CapabilityRegistry<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under its own vendor tag.
    ///
    /// Returns the capability previously registered for that tag, if any.
    pub fn register(&mut self, capability: C) -> Option<C> {
        let vendor = capability.vendor().to_string();
        tracing::debug!(%vendor, "registered device capability");
        self.by_vendor.insert(vendor, capability)
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, capability: C) -> Self {
        self.register(capability);
        self
    }

    /// Find the capability for a vendor tag.
    ///
    /// # Errors
    ///
    /// Returns [`TrygrError::UnsupportedVendor`] when no capability is registered.
    pub fn resolve(&self, vendor: &str) -> Result<&C, TrygrError> {
        self.by_vendor
            .get(vendor)
            .ok_or_else(|| TrygrError::UnsupportedVendor(vendor.to_string()))
    }

    /// Registered vendor tags, sorted.
    #[must_use]
    pub fn vendors(&self) -> Vec<&str> {
        let mut vendors: Vec<&str> = self.by_vendor.keys().map(String::as_str).collect();
        vendors.sort_unstable();
        vendors
    }
}
