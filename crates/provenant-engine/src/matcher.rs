//! The cross-match engine: given a freshly reported item, find other records
//! plausibly describing the same physical object and alert both sides.

use std::sync::Arc;

use chrono::Utc;
use provenant_core::{
  item::{IdentifierKind, Item, ItemStatus},
  notification::{NotificationIntent, NotificationKind, Priority},
  store::{CandidateFilter, CandidateQuery, RegistryStore},
};
use serde::Serialize;

use crate::{
  EngineConfig,
  dispatch::NotificationDispatcher,
  error::{EngineError, Result},
};

/// Statuses worth cross-referencing: somebody reported this object missing
/// or left behind.
const OPEN_REPORT_STATUSES: [ItemStatus; 3] =
  [ItemStatus::Stolen, ItemStatus::Lost, ItemStatus::Forgotten];

/// The result of a match run: the matched records and the intents that were
/// handed to the dispatcher.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
  pub matches:       Vec<Item>,
  pub notifications: Vec<NotificationIntent>,
}

/// Scans open reports for records corresponding to a triggering item.
/// Never mutates item state — status changes stay with report intake.
pub struct CrossMatchEngine<S, D> {
  store:      Arc<S>,
  dispatcher: Arc<D>,
  config:     EngineConfig,
}

impl<S, D> CrossMatchEngine<S, D>
where
  S: RegistryStore,
  S::Error: Into<provenant_core::Error>,
  D: NotificationDispatcher,
{
  pub fn new(store: Arc<S>, dispatcher: Arc<D>, config: EngineConfig) -> Self {
    Self { store, dispatcher, config }
  }

  /// Find open reports matching `item` and notify both owners per match.
  ///
  /// Exact identifiers beat fuzzy attributes: a VIN matches only on VIN, a
  /// serial number only on serial number. Fuzzy matching applies only to
  /// items carrying no identifier at all, and only against candidates
  /// registered inside the configured window. Dispatch failures are logged
  /// per intent and never stop the remaining candidates from being
  /// evaluated.
  pub async fn find_matches(&self, item: &Item) -> Result<MatchOutcome> {
    let filter = match item.identifier() {
      Some((IdentifierKind::Vin, vin)) => CandidateFilter::Vin(vin.to_owned()),
      Some((IdentifierKind::SerialNumber, sn)) => {
        CandidateFilter::SerialNumber(sn.to_owned())
      }
      None => CandidateFilter::Fuzzy {
        category:         item.category.clone(),
        brand:            item.brand.clone(),
        model:            item.model.clone(),
        color:            item.color.clone(),
        registered_after: Utc::now() - self.config.fuzzy_match_window(),
      },
    };

    let query = CandidateQuery {
      filter,
      statuses: OPEN_REPORT_STATUSES.to_vec(),
      exclude:  Some(item.item_id),
      limit:    None,
    };

    let candidates = self
      .store
      .find_candidates(&query)
      .await
      .map_err(EngineError::store)?;

    let mut notifications = Vec::with_capacity(candidates.len() * 2);
    let mut matches = Vec::with_capacity(candidates.len());

    for candidate in candidates {
      // The store query already excludes the trigger; guard anyway so a
      // buggy backend cannot make an item match itself.
      if candidate.item_id == item.item_id {
        continue;
      }

      tracing::debug!(
        trigger = %item.item_id,
        matched = %candidate.item_id,
        status = %candidate.status,
        "cross-match found",
      );

      for intent in match_intents(item, &candidate) {
        if let Err(e) = self.dispatcher.send(&intent).await {
          tracing::warn!(
            recipient = %intent.recipient,
            trigger = %item.item_id,
            error = %e,
            "match notification not accepted",
          );
        }
        notifications.push(intent);
      }
      matches.push(candidate);
    }

    Ok(MatchOutcome { matches, notifications })
  }
}

/// One intent per side of a match, both high priority.
fn match_intents(trigger: &Item, matched: &Item) -> Vec<NotificationIntent> {
  vec![
    NotificationIntent {
      recipient:    matched.current_owner,
      kind:         NotificationKind::Match,
      title:        "Possible match for your report".into(),
      message:      "A corresponding report has appeared for an item you \
                     reported."
        .into(),
      related_item: matched.item_id,
      matched_item: Some(trigger.item_id),
      priority:     Priority::High,
      action_ref:   Some(format!("items/{}", matched.item_id)),
    },
    NotificationIntent {
      recipient:    trigger.current_owner,
      kind:         NotificationKind::Match,
      title:        "Your item matches an open report".into(),
      message:      format!(
        "This item corresponds to a reported item with status {}.",
        matched.status
      ),
      related_item: trigger.item_id,
      matched_item: Some(matched.item_id),
      priority:     Priority::High,
      action_ref:   Some(format!("items/{}", trigger.item_id)),
    },
  ]
}

// ─── Tests ───────────────────────────────────────────────────────────────────
