//! Event bus port — how cache writes reach the trigger engine.

use std::future::Future;

use trygr_domain::error::TrygrError;
use trygr_domain::event::Event;

/// Announces device and location updates after they are cached.
///
/// The cache services publish through this port; the trigger engine listens
/// on the other end and evaluates each update as a fact. Publishing must
/// not wait on evaluation.
pub trait EventPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), TrygrError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), TrygrError>> + Send {
        (**self).publish(event)
    }
}
