//! Test doubles shared by the engine's unit tests: an in-memory
//! [`RegistryStore`] with failure injection and a dispatcher that records
//! every intent it accepts.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::Utc;
use provenant_core::{
  Error,
  event::{Actor, EventDetails, NewEvent, ProvenanceEvent},
  item::{IdentifierKind, Item, ItemStatus, NewItem},
  notification::NotificationIntent,
  store::{CandidateFilter, CandidateQuery, RegistryStore},
};
use uuid::Uuid;

use crate::dispatch::{DispatchError, NotificationDispatcher};

// ─── Item fixtures ───────────────────────────────────────────────────────────

pub fn item_with_status(status: ItemStatus) -> Item {
  Item {
    item_id:       Uuid::new_v4(),
    serial_number: Some("SN-0001".into()),
    vin:           None,
    category:      "electronics".into(),
    brand:         Some("Acme".into()),
    model:         Some("X1".into()),
    color:         Some("black".into()),
    status,
    current_owner: Uuid::new_v4(),
    registered_at: Utc::now(),
  }
}

/// Turn raw inputs into stored-shape events, preserving order.
pub fn ledger_from(events: Vec<NewEvent>) -> Vec<ProvenanceEvent> {
  events
    .into_iter()
    .map(|e| ProvenanceEvent {
      event_id:    Uuid::new_v4(),
      item_id:     e.item_id,
      details:     e.details,
      recorded_at: e.recorded_at.unwrap_or_else(Utc::now),
      actor:       e.actor,
    })
    .collect()
}

// ─── MemoryStore ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
  items:  HashMap<Uuid, Item>,
  events: Vec<ProvenanceEvent>,
}

/// In-memory [`RegistryStore`] double. Both writes of a transactional
/// operation happen under one lock, so the double has the same atomicity the
/// real backend guarantees.
#[derive(Default)]
pub struct MemoryStore {
  inner:           Mutex<Inner>,
  poisoned_lookup: Mutex<Option<String>>,
  fail_writes:     AtomicBool,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Make every lookup for this identifier value fail with a storage error.
  pub fn poison_identifier(&self, value: &str) {
    *self.poisoned_lookup.lock().unwrap() = Some(value.to_owned());
  }

  /// Make every subsequent write fail with a storage error.
  pub fn fail_writes(&self, fail: bool) {
    self.fail_writes.store(fail, Ordering::SeqCst);
  }

  /// Place a fully-specified item directly, bypassing registration.
  pub fn insert_item(&self, item: Item) {
    self.inner.lock().unwrap().items.insert(item.item_id, item);
  }

  pub fn stored_events(&self, item_id: Uuid) -> Vec<ProvenanceEvent> {
    self
      .inner
      .lock()
      .unwrap()
      .events
      .iter()
      .filter(|e| e.item_id == item_id)
      .cloned()
      .collect()
  }

  fn write_guard(&self) -> Result<(), Error> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(Error::Storage("injected write failure".into()));
    }
    Ok(())
  }
}

impl RegistryStore for MemoryStore {
  type Error = Error;

  async fn register_item(&self, input: NewItem) -> Result<Item, Error> {
    self.write_guard()?;
    let item = Item {
      item_id:       Uuid::new_v4(),
      serial_number: input.serial_number,
      vin:           input.vin,
      category:      input.category,
      brand:         input.brand,
      model:         input.model,
      color:         input.color,
      status:        ItemStatus::Active,
      current_owner: input.owner,
      registered_at: Utc::now(),
    };

    let mut inner = self.inner.lock().unwrap();
    inner.events.push(ProvenanceEvent {
      event_id:    Uuid::new_v4(),
      item_id:     item.item_id,
      details:     EventDetails::Creation,
      recorded_at: item.registered_at,
      actor:       Actor::user(item.current_owner),
    });
    inner.items.insert(item.item_id, item.clone());
    Ok(item)
  }

  async fn get_item(&self, id: Uuid) -> Result<Option<Item>, Error> {
    Ok(self.inner.lock().unwrap().items.get(&id).cloned())
  }

  async fn find_by_identifier(
    &self,
    value: &str,
    kind: IdentifierKind,
  ) -> Result<Option<Item>, Error> {
    if self.poisoned_lookup.lock().unwrap().as_deref() == Some(value) {
      return Err(Error::Storage("injected lookup failure".into()));
    }

    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .items
        .values()
        .find(|item| match kind {
          IdentifierKind::SerialNumber => {
            item.serial_number.as_deref() == Some(value)
          }
          IdentifierKind::Vin => item.vin.as_deref() == Some(value),
        })
        .cloned(),
    )
  }

  async fn find_candidates(
    &self,
    query: &CandidateQuery,
  ) -> Result<Vec<Item>, Error> {
    let inner = self.inner.lock().unwrap();
    let matches = inner
      .items
      .values()
      .filter(|item| query.statuses.contains(&item.status))
      .filter(|item| Some(item.item_id) != query.exclude)
      .filter(|item| match &query.filter {
        CandidateFilter::Vin(vin) => item.vin.as_deref() == Some(vin),
        CandidateFilter::SerialNumber(sn) => {
          item.serial_number.as_deref() == Some(sn)
        }
        CandidateFilter::Fuzzy {
          category,
          brand,
          model,
          color,
          registered_after,
        } => {
          item.category == *category
            && item.registered_at >= *registered_after
            && ((brand.is_some() && item.brand == *brand)
              || (model.is_some() && item.model == *model)
              || (color.is_some() && item.color == *color))
        }
      })
      .take(query.limit.unwrap_or(usize::MAX))
      .cloned()
      .collect();
    Ok(matches)
  }

  async fn append_event(
    &self,
    input: NewEvent,
  ) -> Result<ProvenanceEvent, Error> {
    self.write_guard()?;
    let mut inner = self.inner.lock().unwrap();
    if !inner.items.contains_key(&input.item_id) {
      return Err(Error::ItemNotFound(input.item_id));
    }

    let event = ProvenanceEvent {
      event_id:    Uuid::new_v4(),
      item_id:     input.item_id,
      details:     input.details,
      recorded_at: input.recorded_at.unwrap_or_else(Utc::now),
      actor:       input.actor,
    };
    inner.events.push(event.clone());
    Ok(event)
  }

  async fn history(&self, item_id: Uuid) -> Result<Vec<ProvenanceEvent>, Error> {
    let inner = self.inner.lock().unwrap();
    let mut indexed: Vec<(usize, ProvenanceEvent)> = inner
      .events
      .iter()
      .enumerate()
      .filter(|(_, e)| e.item_id == item_id)
      .map(|(i, e)| (i, e.clone()))
      .collect();
    // Newest first, insertion order breaking ties.
    indexed.sort_by(|(ia, a), (ib, b)| {
      b.recorded_at.cmp(&a.recorded_at).then(ib.cmp(ia))
    });
    Ok(indexed.into_iter().map(|(_, e)| e).collect())
  }

  async fn apply_transfer(
    &self,
    input: NewEvent,
  ) -> Result<ProvenanceEvent, Error> {
    self.write_guard()?;
    let (previous_owner, new_owner) = match &input.details {
      EventDetails::Transfer { previous_owner, new_owner, .. } => {
        (*previous_owner, *new_owner)
      }
      other => {
        return Err(Error::InvalidEvent(format!(
          "apply_transfer requires transfer details, got {:?}",
          other.discriminant()
        )));
      }
    };

    let mut inner = self.inner.lock().unwrap();
    let Some(item) = inner.items.get(&input.item_id) else {
      return Err(Error::ItemNotFound(input.item_id));
    };
    if item.current_owner != previous_owner {
      return Err(Error::OwnerConflict(input.item_id));
    }

    let event = ProvenanceEvent {
      event_id:    Uuid::new_v4(),
      item_id:     input.item_id,
      details:     input.details,
      recorded_at: input.recorded_at.unwrap_or_else(Utc::now),
      actor:       input.actor,
    };
    inner.events.push(event.clone());
    if let Some(item) = inner.items.get_mut(&event.item_id) {
      item.current_owner = new_owner;
    }
    Ok(event)
  }

  async fn apply_report(
    &self,
    input: NewEvent,
    status: ItemStatus,
  ) -> Result<ProvenanceEvent, Error> {
    self.write_guard()?;
    let mut inner = self.inner.lock().unwrap();
    if !inner.items.contains_key(&input.item_id) {
      return Err(Error::ItemNotFound(input.item_id));
    }

    let event = ProvenanceEvent {
      event_id:    Uuid::new_v4(),
      item_id:     input.item_id,
      details:     input.details,
      recorded_at: input.recorded_at.unwrap_or_else(Utc::now),
      actor:       input.actor,
    };
    inner.events.push(event.clone());
    if let Some(item) = inner.items.get_mut(&event.item_id) {
      item.status = status;
    }
    Ok(event)
  }
}

// ─── RecordingDispatcher ─────────────────────────────────────────────────────

/// Records every accepted intent; can be told to reject one recipient.
#[derive(Default)]
pub struct RecordingDispatcher {
  sent:           Mutex<Vec<NotificationIntent>>,
  fail_recipient: Mutex<Option<Uuid>>,
}

impl RecordingDispatcher {
  pub fn new() -> Self { Self::default() }

  pub fn reject_recipient(&self, recipient: Uuid) {
    *self.fail_recipient.lock().unwrap() = Some(recipient);
  }

  pub fn sent(&self) -> Vec<NotificationIntent> {
    self.sent.lock().unwrap().clone()
  }
}

impl NotificationDispatcher for RecordingDispatcher {
  async fn send(
    &self,
    intent: &NotificationIntent,
  ) -> Result<(), DispatchError> {
    if *self.fail_recipient.lock().unwrap() == Some(intent.recipient) {
      return Err(DispatchError("recipient rejected".into()));
    }
    self.sent.lock().unwrap().push(intent.clone());
    Ok(())
  }
}
