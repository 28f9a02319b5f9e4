//! Provenance events — the fundamental unit of the item ledger.
//!
//! An event is an immutable fact about an item at a point in time. Events are
//! never updated or deleted; the ledger for an item is a strictly
//! time-ordered, append-only sequence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, classification::Classification, item::ItemStatus};

// ─── Actor ───────────────────────────────────────────────────────────────────

/// Who performed or reported an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
  User,
  Admin,
  Police,
  System,
}

/// The acting party attached to every ledger entry. System-originated events
/// (verification audits) carry no id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub id:   Option<Uuid>,
  pub kind: ActorKind,
}

impl Actor {
  pub fn user(id: Uuid) -> Self {
    Self { id: Some(id), kind: ActorKind::User }
  }

  pub fn police(id: Uuid) -> Self {
    Self { id: Some(id), kind: ActorKind::Police }
  }

  pub fn system() -> Self {
    Self { id: None, kind: ActorKind::System }
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// A supporting document attached to a transfer (receipt, invoice, contract).
/// Documents enter the ledger unverified; an admin or police review flips the
/// flag on a later, corrected transfer event — never in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  /// Free-text document kind, e.g. "receipt" or "sale_contract".
  pub kind:     String,
  #[serde(default)]
  pub verified: bool,
}

// ─── EventDetails ────────────────────────────────────────────────────────────

/// The typed payload of a provenance event. The variant name serves as the
/// `event_type` discriminant stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventDetails {
  // ── Lifecycle ───────────────────────────────────────────────────────────
  Creation,
  Purchase,
  Sale,

  // ── Incident reports ────────────────────────────────────────────────────
  Theft {
    #[serde(default)]
    location: Option<String>,
  },
  Loss {
    #[serde(default)]
    location: Option<String>,
  },
  Found {
    #[serde(default)]
    location: Option<String>,
  },

  // ── Registry activity ───────────────────────────────────────────────────
  Verification {
    classification: Classification,
    notes:          String,
  },
  Transfer {
    previous_owner: Uuid,
    new_owner:      Uuid,
    #[serde(default)]
    documents:      Vec<Document>,
  },
  PoliceCheck {
    #[serde(default)]
    reference: Option<String>,
  },
}

impl EventDetails {
  /// The discriminant string stored in the `event_type` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Creation => "creation",
      Self::Purchase => "purchase",
      Self::Sale => "sale",
      Self::Theft { .. } => "theft",
      Self::Loss { .. } => "loss",
      Self::Found { .. } => "found",
      Self::Verification { .. } => "verification",
      Self::Transfer { .. } => "transfer",
      Self::PoliceCheck { .. } => "police_check",
    }
  }

  /// Serialise the inner payload (without the type tag) for the `details_json`
  /// database column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    // The full serialised form is `{"type": "...", "data": <payload>}`.
    // We want only the payload.
    let full = serde_json::to_value(self)?;
    Ok(full.get("data").cloned().unwrap_or(serde_json::Value::Null))
  }

  /// Deserialise from the discriminant string and JSON payload stored in the
  /// database.
  pub fn from_parts(
    discriminant: &str,
    data: serde_json::Value,
  ) -> Result<Self> {
    let wrapped = serde_json::json!({ "type": discriminant, "data": data });
    Ok(serde_json::from_value(wrapped)?)
  }

  /// The item status a report event implies, if any. Used by the store's
  /// transactional report intake so a status change and its ledger entry can
  /// never disagree.
  pub fn implied_status(&self) -> Option<ItemStatus> {
    match self {
      Self::Theft { .. } => Some(ItemStatus::Stolen),
      Self::Loss { .. } => Some(ItemStatus::Lost),
      Self::Found { .. } => Some(ItemStatus::Found),
      Self::Sale => Some(ItemStatus::Sold),
      _ => None,
    }
  }
}

// ─── ProvenanceEvent ─────────────────────────────────────────────────────────

/// One ledger entry. Once written, no field is ever updated; later facts are
/// recorded as later entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceEvent {
  pub event_id:    Uuid,
  pub item_id:     Uuid,
  pub details:     EventDetails,
  /// Assigned by the store on append unless the writer supplied one.
  pub recorded_at: DateTime<Utc>,
  pub actor:       Actor,
}

// ─── NewEvent ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::RegistryStore::append_event`].
///
/// All ledger writers — report intake, the transfer coordinator, the
/// verification engine — go through this one append contract.
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub item_id:     Uuid,
  pub details:     EventDetails,
  pub actor:       Actor,
  /// Explicit event time for backdated reports; `None` means "now",
  /// assigned by the store.
  pub recorded_at: Option<DateTime<Utc>>,
}

impl NewEvent {
  pub fn new(item_id: Uuid, details: EventDetails, actor: Actor) -> Self {
    Self { item_id, details, actor, recorded_at: None }
  }

  pub fn recorded_at(mut self, at: DateTime<Utc>) -> Self {
    self.recorded_at = Some(at);
    self
  }
}
