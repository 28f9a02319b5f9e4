//! The transfer coordinator: record an ownership change as one consistent
//! unit and tell both parties about it.

use std::sync::Arc;

use provenant_core::{
  event::{Actor, Document, EventDetails, NewEvent, ProvenanceEvent},
  notification::{NotificationIntent, NotificationKind, Priority},
  store::RegistryStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  dispatch::NotificationDispatcher,
  error::{EngineError, Result},
};

/// What a completed transfer returns to the caller: the ledger entry and the
/// intents that were handed to the dispatcher (delivered or not).
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
  pub event:         ProvenanceEvent,
  pub notifications: Vec<NotificationIntent>,
}

/// Records ownership changes. The ledger append and the owner-pointer update
/// are one transaction inside the store; this coordinator's job is the
/// before-write existence check and the fan-out afterwards.
pub struct TransferCoordinator<S, D> {
  store:      Arc<S>,
  dispatcher: Arc<D>,
}

impl<S, D> TransferCoordinator<S, D>
where
  S: RegistryStore,
  S::Error: Into<provenant_core::Error>,
  D: NotificationDispatcher,
{
  pub fn new(store: Arc<S>, dispatcher: Arc<D>) -> Self {
    Self { store, dispatcher }
  }

  /// Record a transfer of `item_id` from `previous_owner` to `new_owner`.
  ///
  /// Fails with not-found before any write if the item does not exist. The
  /// store rejects the whole unit if the current owner no longer matches
  /// `previous_owner`, so a stale request cannot half-apply. Notification
  /// failures are logged and never fail a committed transfer.
  pub async fn record_transfer(
    &self,
    item_id: Uuid,
    previous_owner: Uuid,
    new_owner: Uuid,
    documents: Vec<Document>,
    actor: Actor,
  ) -> Result<TransferReceipt> {
    self
      .store
      .get_item(item_id)
      .await
      .map_err(EngineError::store)?
      .ok_or(provenant_core::Error::ItemNotFound(item_id))?;

    let event = self
      .store
      .apply_transfer(NewEvent::new(
        item_id,
        EventDetails::Transfer { previous_owner, new_owner, documents },
        actor,
      ))
      .await
      .map_err(EngineError::store)?;

    tracing::info!(
      item = %item_id,
      from = %previous_owner,
      to = %new_owner,
      "ownership transfer recorded",
    );

    let notifications = transfer_intents(item_id, previous_owner, new_owner);
    for intent in &notifications {
      if let Err(e) = self.dispatcher.send(intent).await {
        tracing::warn!(
          recipient = %intent.recipient,
          item = %item_id,
          error = %e,
          "transfer notification not accepted",
        );
      }
    }

    Ok(TransferReceipt { event, notifications })
  }
}

fn transfer_intents(
  item_id: Uuid,
  previous_owner: Uuid,
  new_owner: Uuid,
) -> Vec<NotificationIntent> {
  let action_ref = Some(format!("items/{item_id}"));
  vec![
    NotificationIntent {
      recipient:    previous_owner,
      kind:         NotificationKind::Transfer,
      title:        "Ownership transferred".into(),
      message:      "Your item has been transferred to its new owner.".into(),
      related_item: item_id,
      matched_item: None,
      priority:     Priority::Normal,
      action_ref:   action_ref.clone(),
    },
    NotificationIntent {
      recipient:    new_owner,
      kind:         NotificationKind::Transfer,
      title:        "Ownership received".into(),
      message:      "An item has been transferred to you.".into(),
      related_item: item_id,
      matched_item: None,
      priority:     Priority::Normal,
      action_ref,
    },
  ]
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use provenant_core::item::NewItem;

  use super::*;
  use crate::testing::{MemoryStore, RecordingDispatcher};

  fn new_item(owner: Uuid) -> NewItem {
    NewItem {
      serial_number: Some("SN-T".into()),
      vin:           None,
      category:      "watch".into(),
      brand:         None,
      model:         None,
      color:         None,
      owner,
    }
  }

  fn coordinator(
    store: Arc<MemoryStore>,
    dispatcher: Arc<RecordingDispatcher>,
  ) -> TransferCoordinator<MemoryStore, RecordingDispatcher> {
    TransferCoordinator::new(store, dispatcher)
  }

  #[tokio::test]
  async fn transfer_updates_owner_and_ledger_together() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let item = store.register_item(new_item(alice)).await.unwrap();

    let receipt = coordinator(store.clone(), dispatcher)
      .record_transfer(item.item_id, alice, bob, vec![], Actor::user(alice))
      .await
      .unwrap();

    let stored = store.get_item(item.item_id).await.unwrap().unwrap();
    assert_eq!(stored.current_owner, bob);

    let history = store.history(item.item_id).await.unwrap();
    assert!(matches!(
      &history[0].details,
      EventDetails::Transfer { previous_owner, new_owner, .. }
        if *previous_owner == alice && *new_owner == bob
    ));
    assert_eq!(history[0].event_id, receipt.event.event_id);
  }

  #[tokio::test]
  async fn missing_item_fails_before_any_write() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let ghost = Uuid::new_v4();

    let err = coordinator(store.clone(), dispatcher.clone())
      .record_transfer(
        ghost,
        Uuid::new_v4(),
        Uuid::new_v4(),
        vec![],
        Actor::system(),
      )
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      EngineError::Registry(provenant_core::Error::ItemNotFound(id)) if id == ghost
    ));
    assert!(store.stored_events(ghost).is_empty());
    assert!(dispatcher.sent().is_empty());
  }

  #[tokio::test]
  async fn stale_previous_owner_leaves_no_partial_state() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let alice = Uuid::new_v4();
    let item = store.register_item(new_item(alice)).await.unwrap();

    let err = coordinator(store.clone(), dispatcher.clone())
      .record_transfer(
        item.item_id,
        Uuid::new_v4(), // not the current owner
        Uuid::new_v4(),
        vec![],
        Actor::system(),
      )
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      EngineError::Registry(provenant_core::Error::OwnerConflict(_))
    ));

    // Owner untouched, no transfer event retained, nobody notified.
    let stored = store.get_item(item.item_id).await.unwrap().unwrap();
    assert_eq!(stored.current_owner, alice);
    assert_eq!(store.stored_events(item.item_id).len(), 1); // creation only
    assert!(dispatcher.sent().is_empty());
  }

  #[tokio::test]
  async fn both_parties_are_notified() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let item = store.register_item(new_item(alice)).await.unwrap();

    coordinator(store, dispatcher.clone())
      .record_transfer(item.item_id, alice, bob, vec![], Actor::user(alice))
      .await
      .unwrap();

    let sent = dispatcher.sent();
    assert_eq!(sent.len(), 2);
    let recipients: Vec<Uuid> = sent.iter().map(|s| s.recipient).collect();
    assert!(recipients.contains(&alice));
    assert!(recipients.contains(&bob));
    assert!(sent.iter().all(|s| s.kind == NotificationKind::Transfer));
  }

  #[tokio::test]
  async fn dispatch_failure_does_not_fail_the_transfer() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = Arc::new(RecordingDispatcher::new());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let item = store.register_item(new_item(alice)).await.unwrap();
    dispatcher.reject_recipient(alice);

    let receipt = coordinator(store.clone(), dispatcher.clone())
      .record_transfer(item.item_id, alice, bob, vec![], Actor::user(alice))
      .await
      .unwrap();

    // The transfer committed and the intent list still names both parties.
    assert_eq!(receipt.notifications.len(), 2);
    let stored = store.get_item(item.item_id).await.unwrap().unwrap();
    assert_eq!(stored.current_owner, bob);

    // Only bob's intent was accepted.
    let sent = dispatcher.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, bob);
  }
}
