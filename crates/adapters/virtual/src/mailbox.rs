//! Virtual mailbox — a notification transport that logs instead of mailing.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use trygr_app::ports::Notifier;
use trygr_domain::error::TrygrError;

/// One message as the mailbox received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipients: Vec<String>,
    pub body: String,
}

/// Records every message and emits it as an `info` log line.
#[derive(Default)]
pub struct VirtualMailbox {
    deliveries: Mutex<Vec<Delivery>>,
}

impl VirtualMailbox {
    /// Snapshot of all messages received so far, oldest first.
    #[must_use]
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for VirtualMailbox {
    fn send(
        &self,
        recipients: &[String],
        body: &str,
    ) -> impl Future<Output = Result<(), TrygrError>> + Send {
        tracing::info!(to = %recipients.join(","), body, "notification");
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Delivery {
                recipients: recipients.to_vec(),
                body: body.to_string(),
            });
        async { Ok(()) }
    }
}
