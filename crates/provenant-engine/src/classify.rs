//! Ledger classification — an ordered, first-match-wins rule list.
//!
//! Classification is a pure function of the item record, the ledger snapshot,
//! and the evaluation instant: same input, same verdict. Keeping each rule a
//! named function makes the precedence order auditable and testable rule by
//! rule.

use chrono::{DateTime, Utc};
use provenant_core::{
  classification::{Classification, Verdict},
  event::{EventDetails, ProvenanceEvent},
  item::{Item, ItemStatus},
};

use crate::EngineConfig;

/// Everything a rule may look at.
pub struct ClassifyInput<'a> {
  pub item:   &'a Item,
  /// The full ledger snapshot, any order — rules count and search, they do
  /// not rely on ordering.
  pub ledger: &'a [ProvenanceEvent],
  /// The evaluation instant, passed in rather than read from the clock so
  /// verdicts are repeatable.
  pub now:    DateTime<Utc>,
  pub config: &'a EngineConfig,
}

type Rule = fn(&ClassifyInput<'_>) -> Option<Verdict>;

/// Precedence order. The first rule to return a verdict wins.
const RULES: &[Rule] = &[
  status_stolen,
  rapid_transfers,
  prior_theft,
  unverified_documents,
];

/// Classify an item against its ledger snapshot.
pub fn classify(input: &ClassifyInput<'_>) -> Verdict {
  RULES
    .iter()
    .find_map(|rule| rule(input))
    .unwrap_or_else(|| {
      Verdict::new(Classification::Clean, "no anomalies detected")
    })
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// Rule 1: the record itself says stolen. Nothing else matters.
fn status_stolen(input: &ClassifyInput<'_>) -> Option<Verdict> {
  (input.item.status == ItemStatus::Stolen).then(|| {
    Verdict::new(Classification::Stolen, "reported as stolen")
  })
}

/// Rule 2: more transfers than the threshold while the creation event is
/// still inside the configured window.
fn rapid_transfers(input: &ClassifyInput<'_>) -> Option<Verdict> {
  let transfers = input
    .ledger
    .iter()
    .filter(|e| matches!(e.details, EventDetails::Transfer { .. }))
    .count();
  if transfers <= input.config.rapid_transfer_threshold {
    return None;
  }

  let created_at = input
    .ledger
    .iter()
    .find(|e| matches!(e.details, EventDetails::Creation))
    .map(|e| e.recorded_at)?;

  (input.now - created_at < input.config.rapid_transfer_window()).then(|| {
    Verdict::new(
      Classification::Suspicious,
      "frequent ownership changes shortly after registration",
    )
  })
}

/// Rule 3: a theft report anywhere in history, however old.
fn prior_theft(input: &ClassifyInput<'_>) -> Option<Verdict> {
  input
    .ledger
    .iter()
    .any(|e| matches!(e.details, EventDetails::Theft { .. }))
    .then(|| Verdict::new(Classification::Reported, "previously reported stolen"))
}

/// Rule 4: transfers exist but none of them carries a verified document.
/// An item that has never changed hands has nothing to document and is not
/// penalised here.
fn unverified_documents(input: &ClassifyInput<'_>) -> Option<Verdict> {
  let mut transfers = input.ledger.iter().filter_map(|e| match &e.details {
    EventDetails::Transfer { documents, .. } => Some(documents),
    _ => None,
  });

  let mut any = false;
  for documents in transfers.by_ref() {
    any = true;
    if documents.iter().any(|d| d.verified) {
      return None;
    }
  }

  any.then(|| {
    Verdict::new(Classification::Suspicious, "no verified supporting documents")
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Duration;
  use provenant_core::event::{Actor, Document, NewEvent};
  use uuid::Uuid;

  use super::*;
  use crate::testing::{item_with_status, ledger_from};

  fn input<'a>(
    item: &'a Item,
    ledger: &'a [ProvenanceEvent],
    now: DateTime<Utc>,
    config: &'a EngineConfig,
  ) -> ClassifyInput<'a> {
    ClassifyInput { item, ledger, now, config }
  }

  fn transfer_event(
    item_id: Uuid,
    at: DateTime<Utc>,
    documents: Vec<Document>,
  ) -> NewEvent {
    NewEvent::new(
      item_id,
      EventDetails::Transfer {
        previous_owner: Uuid::new_v4(),
        new_owner: Uuid::new_v4(),
        documents,
      },
      Actor::user(Uuid::new_v4()),
    )
    .recorded_at(at)
  }

  fn creation_event(item_id: Uuid, at: DateTime<Utc>) -> NewEvent {
    NewEvent::new(item_id, EventDetails::Creation, Actor::user(Uuid::new_v4()))
      .recorded_at(at)
  }

  #[test]
  fn stolen_status_wins_over_everything() {
    let now = Utc::now();
    let item = item_with_status(ItemStatus::Stolen);
    // A ledger that would trip every other rule.
    let ledger = ledger_from(vec![
      creation_event(item.item_id, now - Duration::days(2)),
      transfer_event(item.item_id, now - Duration::days(1), vec![]),
      transfer_event(item.item_id, now - Duration::days(1), vec![]),
      transfer_event(item.item_id, now, vec![]),
      transfer_event(item.item_id, now, vec![]),
      NewEvent::new(
        item.item_id,
        EventDetails::Theft { location: None },
        Actor::user(Uuid::new_v4()),
      )
      .recorded_at(now),
    ]);

    let v = classify(&input(&item, &ledger, now, &EngineConfig::default()));
    assert_eq!(v.classification, Classification::Stolen);
    assert_eq!(v.rationale, "reported as stolen");
  }

  #[test]
  fn four_transfers_five_days_after_creation_is_suspicious() {
    let now = Utc::now();
    let item = item_with_status(ItemStatus::Active);
    let mut events = vec![creation_event(item.item_id, now - Duration::days(5))];
    for _ in 0..4 {
      events.push(transfer_event(
        item.item_id,
        now - Duration::days(1),
        vec![Document { kind: "receipt".into(), verified: true }],
      ));
    }
    let ledger = ledger_from(events);

    let v = classify(&input(&item, &ledger, now, &EngineConfig::default()));
    assert_eq!(v.classification, Classification::Suspicious);
    assert_eq!(
      v.rationale,
      "frequent ownership changes shortly after registration"
    );
  }

  #[test]
  fn four_transfers_forty_days_after_creation_does_not_trip_the_rule() {
    let now = Utc::now();
    let item = item_with_status(ItemStatus::Active);
    let mut events =
      vec![creation_event(item.item_id, now - Duration::days(40))];
    for _ in 0..4 {
      events.push(transfer_event(
        item.item_id,
        now - Duration::days(1),
        vec![Document { kind: "receipt".into(), verified: true }],
      ));
    }
    let ledger = ledger_from(events);

    // Falls through rule 2 and, with verified documents, lands on clean.
    let v = classify(&input(&item, &ledger, now, &EngineConfig::default()));
    assert_eq!(v.classification, Classification::Clean);
  }

  #[test]
  fn exactly_threshold_transfers_is_not_frequent() {
    let now = Utc::now();
    let item = item_with_status(ItemStatus::Active);
    let mut events = vec![creation_event(item.item_id, now - Duration::days(2))];
    for _ in 0..3 {
      events.push(transfer_event(
        item.item_id,
        now - Duration::days(1),
        vec![Document { kind: "receipt".into(), verified: true }],
      ));
    }
    let ledger = ledger_from(events);

    let v = classify(&input(&item, &ledger, now, &EngineConfig::default()));
    assert_eq!(v.classification, Classification::Clean);
  }

  #[test]
  fn old_theft_event_classifies_as_reported() {
    let now = Utc::now();
    let item = item_with_status(ItemStatus::Found);
    let ledger = ledger_from(vec![
      creation_event(item.item_id, now - Duration::days(400)),
      NewEvent::new(
        item.item_id,
        EventDetails::Theft { location: Some("Lyon".into()) },
        Actor::police(Uuid::new_v4()),
      )
      .recorded_at(now - Duration::days(300)),
      NewEvent::new(
        item.item_id,
        EventDetails::Found { location: Some("Lyon".into()) },
        Actor::user(Uuid::new_v4()),
      )
      .recorded_at(now - Duration::days(1)),
    ]);

    let v = classify(&input(&item, &ledger, now, &EngineConfig::default()));
    assert_eq!(v.classification, Classification::Reported);
    assert_eq!(v.rationale, "previously reported stolen");
  }

  #[test]
  fn all_documents_unverified_is_suspicious() {
    let now = Utc::now();
    let item = item_with_status(ItemStatus::Active);
    let ledger = ledger_from(vec![
      creation_event(item.item_id, now - Duration::days(100)),
      transfer_event(
        item.item_id,
        now - Duration::days(10),
        vec![Document { kind: "receipt".into(), verified: false }],
      ),
    ]);

    let v = classify(&input(&item, &ledger, now, &EngineConfig::default()));
    assert_eq!(v.classification, Classification::Suspicious);
    assert_eq!(v.rationale, "no verified supporting documents");
  }

  #[test]
  fn one_verified_document_flips_to_clean() {
    let now = Utc::now();
    let item = item_with_status(ItemStatus::Active);
    let ledger = ledger_from(vec![
      creation_event(item.item_id, now - Duration::days(100)),
      transfer_event(
        item.item_id,
        now - Duration::days(10),
        vec![
          Document { kind: "receipt".into(), verified: false },
          Document { kind: "sale_contract".into(), verified: true },
        ],
      ),
    ]);

    let v = classify(&input(&item, &ledger, now, &EngineConfig::default()));
    assert_eq!(v.classification, Classification::Clean);
  }

  #[test]
  fn never_transferred_item_is_clean() {
    let now = Utc::now();
    let item = item_with_status(ItemStatus::Active);
    let ledger =
      ledger_from(vec![creation_event(item.item_id, now - Duration::days(1))]);

    let v = classify(&input(&item, &ledger, now, &EngineConfig::default()));
    assert_eq!(v.classification, Classification::Clean);
    assert_eq!(v.rationale, "no anomalies detected");
  }

  #[test]
  fn same_input_same_verdict() {
    let now = Utc::now();
    let item = item_with_status(ItemStatus::Active);
    let ledger = ledger_from(vec![
      creation_event(item.item_id, now - Duration::days(3)),
      transfer_event(item.item_id, now - Duration::days(1), vec![]),
    ]);

    let cfg = EngineConfig::default();
    let first = classify(&input(&item, &ledger, now, &cfg));
    let second = classify(&input(&item, &ledger, now, &cfg));
    assert_eq!(first, second);
  }
}
