//! Item — the physical object being tracked.
//!
//! An item owns its identity (serial number or VIN plus descriptive
//! attributes) and a small amount of mutable state: the status and the
//! current-owner pointer. Everything that ever happened to the item lives in
//! its append-only ledger, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

/// The current registry status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
  Active,
  Stolen,
  Lost,
  Found,
  Forgotten,
  Sold,
  Damaged,
}

impl ItemStatus {
  /// True for the statuses that make an item a cross-match candidate —
  /// somebody is looking for it, or somebody is holding it.
  pub fn is_open_report(self) -> bool {
    matches!(self, Self::Stolen | Self::Lost | Self::Forgotten)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Stolen => "stolen",
      Self::Lost => "lost",
      Self::Found => "found",
      Self::Forgotten => "forgotten",
      Self::Sold => "sold",
      Self::Damaged => "damaged",
    }
  }
}

impl std::fmt::Display for ItemStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Which unique identifier a lookup refers to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
  #[default]
  SerialNumber,
  Vin,
}

// ─── Item ────────────────────────────────────────────────────────────────────

/// A registered physical item.
///
/// `status` and `current_owner` are the only mutable fields; both are only
/// ever changed through the store's transactional operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
  pub item_id:       Uuid,
  pub serial_number: Option<String>,
  pub vin:           Option<String>,
  pub category:      String,
  pub brand:         Option<String>,
  pub model:         Option<String>,
  pub color:         Option<String>,
  pub status:        ItemStatus,
  pub current_owner: Uuid,
  /// Server-assigned at registration; never changes.
  pub registered_at: DateTime<Utc>,
}

impl Item {
  /// The strongest unique identifier this item carries, if any.
  /// VIN takes priority over serial number.
  pub fn identifier(&self) -> Option<(IdentifierKind, &str)> {
    if let Some(vin) = self.vin.as_deref() {
      return Some((IdentifierKind::Vin, vin));
    }
    self
      .serial_number
      .as_deref()
      .map(|sn| (IdentifierKind::SerialNumber, sn))
  }

  /// The ownership-free view returned to unprivileged verification callers.
  pub fn summary(&self) -> ItemSummary {
    ItemSummary {
      item_id:       self.item_id,
      serial_number: self.serial_number.clone(),
      vin:           self.vin.clone(),
      category:      self.category.clone(),
      brand:         self.brand.clone(),
      model:         self.model.clone(),
      color:         self.color.clone(),
      status:        self.status,
    }
  }
}

// ─── NewItem ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::RegistryStore::register_item`].
/// `item_id`, `registered_at` and the initial `Active` status are assigned
/// by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
  pub serial_number: Option<String>,
  pub vin:           Option<String>,
  pub category:      String,
  pub brand:         Option<String>,
  pub model:         Option<String>,
  pub color:         Option<String>,
  pub owner:         Uuid,
}

// ─── ItemSummary ─────────────────────────────────────────────────────────────

/// Identity and status of an item with ownership details omitted.
/// Whether a caller may see more than this is a concern of the layer above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
  pub item_id:       Uuid,
  pub serial_number: Option<String>,
  pub vin:           Option<String>,
  pub category:      String,
  pub brand:         Option<String>,
  pub model:         Option<String>,
  pub color:         Option<String>,
  pub status:        ItemStatus,
}
