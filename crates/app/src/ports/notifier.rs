//! Notification transport port — outbound messages to people.

use std::future::Future;
use std::sync::Arc;

use trygr_domain::error::TrygrError;

/// Sends one message to a list of recipients.
pub trait Notifier {
    /// Deliver `body` to every recipient in a single request.
    ///
    /// Transport failures are reported as [`TrygrError::NotificationFailed`].
    fn send(
        &self,
        recipients: &[String],
        body: &str,
    ) -> impl Future<Output = Result<(), TrygrError>> + Send;
}

impl<T: Notifier + Send + Sync> Notifier for Arc<T> {
    fn send(
        &self,
        recipients: &[String],
        body: &str,
    ) -> impl Future<Output = Result<(), TrygrError>> + Send {
        (**self).send(recipients, body)
    }
}
