//! Notification intents — fan-out artifacts handed to an external dispatcher.
//!
//! The core only constructs notification content; delivery (email, push,
//! in-app) belongs to the dispatcher trait in `provenant-engine`. Modelling
//! intents as plain data keeps delivery failures structurally separate from
//! the correctness of the operation that produced them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why the recipient is being notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
  Match,
  Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
  Normal,
  High,
}

/// A single notification to be delivered to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationIntent {
  pub recipient:    Uuid,
  pub kind:         NotificationKind,
  pub title:        String,
  pub message:      String,
  /// The item this notification is about, from the recipient's perspective.
  pub related_item: Uuid,
  /// For match notifications, the item on the other side of the match.
  pub matched_item: Option<Uuid>,
  pub priority:     Priority,
  /// Opaque navigation target for the consuming UI, e.g. `items/<uuid>`.
  pub action_ref:   Option<String>,
}
