//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Event payloads are stored
//! as compact JSON next to their discriminant column. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use provenant_core::{
  event::{Actor, ActorKind, EventDetails, ProvenanceEvent},
  item::{Item, ItemStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── ItemStatus ──────────────────────────────────────────────────────────────

pub fn encode_item_status(s: ItemStatus) -> &'static str {
  match s {
    ItemStatus::Active => "active",
    ItemStatus::Stolen => "stolen",
    ItemStatus::Lost => "lost",
    ItemStatus::Found => "found",
    ItemStatus::Forgotten => "forgotten",
    ItemStatus::Sold => "sold",
    ItemStatus::Damaged => "damaged",
  }
}

pub fn decode_item_status(s: &str) -> Result<ItemStatus> {
  match s {
    "active" => Ok(ItemStatus::Active),
    "stolen" => Ok(ItemStatus::Stolen),
    "lost" => Ok(ItemStatus::Lost),
    "found" => Ok(ItemStatus::Found),
    "forgotten" => Ok(ItemStatus::Forgotten),
    "sold" => Ok(ItemStatus::Sold),
    "damaged" => Ok(ItemStatus::Damaged),
    other => Err(Error::Decode(format!("unknown item status: {other:?}"))),
  }
}

// ─── ActorKind ───────────────────────────────────────────────────────────────

pub fn encode_actor_kind(k: ActorKind) -> &'static str {
  match k {
    ActorKind::User => "user",
    ActorKind::Admin => "admin",
    ActorKind::Police => "police",
    ActorKind::System => "system",
  }
}

pub fn decode_actor_kind(s: &str) -> Result<ActorKind> {
  match s {
    "user" => Ok(ActorKind::User),
    "admin" => Ok(ActorKind::Admin),
    "police" => Ok(ActorKind::Police),
    "system" => Ok(ActorKind::System),
    other => Err(Error::Decode(format!("unknown actor kind: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `items` row.
pub struct RawItem {
  pub item_id:       String,
  pub serial_number: Option<String>,
  pub vin:           Option<String>,
  pub category:      String,
  pub brand:         Option<String>,
  pub model:         Option<String>,
  pub color:         Option<String>,
  pub status:        String,
  pub current_owner: String,
  pub registered_at: String,
}

impl RawItem {
  pub fn into_item(self) -> Result<Item> {
    Ok(Item {
      item_id:       decode_uuid(&self.item_id)?,
      serial_number: self.serial_number,
      vin:           self.vin,
      category:      self.category,
      brand:         self.brand,
      model:         self.model,
      color:         self.color,
      status:        decode_item_status(&self.status)?,
      current_owner: decode_uuid(&self.current_owner)?,
      registered_at: decode_dt(&self.registered_at)?,
    })
  }
}

/// Raw strings read directly from an `events` row.
pub struct RawEvent {
  pub event_id:     String,
  pub item_id:      String,
  pub event_type:   String,
  pub details_json: String,
  pub recorded_at:  String,
  pub actor_id:     Option<String>,
  pub actor_kind:   String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<ProvenanceEvent> {
    let data: serde_json::Value = serde_json::from_str(&self.details_json)?;
    let details = EventDetails::from_parts(&self.event_type, data)
      .map_err(Error::Core)?;

    Ok(ProvenanceEvent {
      event_id:    decode_uuid(&self.event_id)?,
      item_id:     decode_uuid(&self.item_id)?,
      details,
      recorded_at: decode_dt(&self.recorded_at)?,
      actor:       Actor {
        id:   self.actor_id.as_deref().map(decode_uuid).transpose()?,
        kind: decode_actor_kind(&self.actor_kind)?,
      },
    })
  }
}
