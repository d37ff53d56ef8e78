//! In-process event bus feeding cache updates to the trigger engine.

use std::future::Future;

use tokio::sync::broadcast;

use trygr_domain::error::TrygrError;
use trygr_domain::event::Event;

use crate::ports::EventPublisher;

/// Fan-out of [`Event`]s over a tokio [`broadcast`] channel.
///
/// Updates published before the engine subscribes are dropped; the
/// scheduler heartbeat re-offers cached state, so nothing is lost for good.
/// A listener that falls more than `capacity` events behind skips the
/// oldest ones and is told how many.
#[derive(Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// A receiver for every update published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), TrygrError>> + Send {
        match self.sender.send(event) {
            Ok(listeners) => tracing::trace!(listeners, "update published"),
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(%event, "no listener, update dropped");
            }
        }
        async { Ok(()) }
    }
}
