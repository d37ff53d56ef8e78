//! Notification fanout — one message per trigger firing.

use crate::ports::Notifier;

/// What happened to a firing's notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStatus {
    Sent,
    /// The trigger lists no recipients; the transport was not called.
    NoRecipients,
    /// A no-op result under a policy that does not notify no-ops.
    Suppressed,
    /// The dispatch outcome has nothing to report (missing device, unknown vendor).
    NotApplicable,
    /// The transport failed; the action is not rolled back.
    Failed(String),
}

/// Sends a firing's message to all of its recipients in one request.
pub struct NotificationFanout<N> {
    notifier: N,
}

impl<N: Notifier + Sync> NotificationFanout<N> {
    pub fn new(notifier: N) -> Self {
        Self { notifier }
    }

    /// Send `message` to `recipients`, once.
    ///
    /// Returns immediately when `recipients` is empty. Transport failures are
    /// logged and reported in the status, never retried.
    pub async fn notify(&self, recipients: &[String], message: &str) -> NotificationStatus {
        if recipients.is_empty() {
            return NotificationStatus::NoRecipients;
        }
        match self.notifier.send(recipients, message).await {
            Ok(()) => {
                tracing::debug!(recipients = recipients.len(), "notification sent");
                NotificationStatus::Sent
            }
            Err(err) => {
                tracing::warn!(%err, recipients = recipients.len(), "notification failed");
                NotificationStatus::Failed(err.to_string())
            }
        }
    }
}
