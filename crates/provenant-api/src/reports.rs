//! Handlers for report intake — the external append contract.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/items/:id/events` | Body: [`ReportBody`]; appends + cross-matches |
//! | `POST` | `/items/:id/matches` | Re-run cross-matching on demand |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use provenant_core::{
  event::{Actor, EventDetails, NewEvent, ProvenanceEvent},
  item::Item,
  store::RegistryStore,
};
use provenant_engine::{dispatch::NotificationDispatcher, matcher::MatchOutcome};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Record ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /items/:id/events`.
#[derive(Debug, Deserialize)]
pub struct ReportBody {
  pub details: EventDetails,
  pub actor:   Actor,
}

/// Response: the stored ledger entry plus any open reports the item now
/// matches.
#[derive(Debug, Serialize)]
pub struct ReportOutcome {
  pub event:   ProvenanceEvent,
  pub matches: Vec<Item>,
}

/// `POST /items/:id/events` — append a report event to the ledger.
///
/// Events that imply a status (theft, loss, found, sale) set it in the same
/// storage transaction. Transfer and verification events are rejected here;
/// they have dedicated flows that carry their side effects.
pub async fn record<S, D>(
  State(state): State<ApiState<S, D>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ReportBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore,
  S::Error: Into<provenant_core::Error>,
  D: NotificationDispatcher,
{
  match body.details {
    EventDetails::Transfer { .. } => {
      return Err(ApiError::BadRequest(
        "transfers must go through /items/:id/transfer".into(),
      ));
    }
    EventDetails::Verification { .. } => {
      return Err(ApiError::BadRequest(
        "verification events are recorded by /verify".into(),
      ));
    }
    _ => {}
  }

  let input = NewEvent::new(id, body.details, body.actor);
  let event = match input.details.implied_status() {
    Some(status) => state.store.apply_report(input, status).await,
    None => state.store.append_event(input).await,
  }
  .map_err(|e| ApiError::from(e.into()))?;

  // The report has committed; cross-matching runs best-effort on the
  // refreshed record.
  let matches = match state.store.get_item(id).await {
    Ok(Some(item)) => match state.matcher.find_matches(&item).await {
      Ok(outcome) => outcome.matches,
      Err(e) => {
        tracing::warn!(item = %id, error = %e, "match scan failed");
        Vec::new()
      }
    },
    Ok(None) => Vec::new(),
    Err(e) => {
      let e: provenant_core::Error = e.into();
      tracing::warn!(item = %id, error = %e, "item re-read failed");
      Vec::new()
    }
  };

  Ok((StatusCode::CREATED, Json(ReportOutcome { event, matches })))
}

// ─── Rematch ──────────────────────────────────────────────────────────────────

/// `POST /items/:id/matches` — run cross-matching for an existing item.
pub async fn rematch<S, D>(
  State(state): State<ApiState<S, D>>,
  Path(id): Path<Uuid>,
) -> Result<Json<MatchOutcome>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<provenant_core::Error>,
  D: NotificationDispatcher,
{
  let item = state
    .store
    .get_item(id)
    .await
    .map_err(|e| ApiError::from(e.into()))?
    .ok_or_else(|| ApiError::NotFound(format!("item {id} not found")))?;

  let outcome = state.matcher.find_matches(&item).await?;
  Ok(Json(outcome))
}
