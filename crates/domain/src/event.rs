//! Domain events — state writes pushed from the stores to the engine.

use crate::device::Device;
use crate::fact::EvaluationFact;
use crate::location::Location;

/// A state change recorded by one of the cache services.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DeviceUpdated(Device),
    LocationUpdated(Location),
}

impl From<Event> for EvaluationFact {
    fn from(event: Event) -> Self {
        match event {
            Event::DeviceUpdated(device) => Self::Device(device),
            Event::LocationUpdated(location) => Self::Weather(location),
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceUpdated(d) => write!(f, "device_updated({})", d.id),
            Self::LocationUpdated(l) => write!(f, "location_updated({})", l.postal_code),
        }
    }
}
