//! Notification dispatch — the boundary to the external delivery system.
//!
//! The engine constructs [`NotificationIntent`]s and hands them to a
//! dispatcher; what happens after the dispatcher accepts one (email, push,
//! retry queues) is not the engine's concern. Dispatch failures are logged
//! and isolated at every call site — they never fail the operation that
//! produced the intent.

use std::future::Future;

use provenant_core::notification::NotificationIntent;
use thiserror::Error;

/// The dispatcher declined or failed to accept a notification request.
#[derive(Debug, Error)]
#[error("notification dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// Accepts notification intents for delivery. Acceptance is all the engine
/// ever waits for; delivery confirmation does not exist at this boundary.
pub trait NotificationDispatcher: Send + Sync {
  fn send<'a>(
    &'a self,
    intent: &'a NotificationIntent,
  ) -> impl Future<Output = Result<(), DispatchError>> + Send + 'a;
}

/// A dispatcher that only records intents in the log. Useful as a default
/// when no delivery system is wired up.
#[derive(Debug, Clone, Default)]
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
  async fn send(&self, intent: &NotificationIntent) -> Result<(), DispatchError> {
    tracing::info!(
      recipient = %intent.recipient,
      kind = ?intent.kind,
      priority = ?intent.priority,
      related_item = %intent.related_item,
      "notification: {}",
      intent.title,
    );
    Ok(())
  }
}
