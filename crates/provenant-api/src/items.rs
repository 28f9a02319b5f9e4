//! Handlers for `/items` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/items` | Body: [`NewItem`]; returns 201 + item + initial matches |
//! | `GET`  | `/items/:id` | 404 if not found |
//! | `GET`  | `/items/:id/history` | Full ledger, newest-first; empty if no events |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use provenant_core::{
  event::ProvenanceEvent,
  item::{Item, NewItem},
  store::RegistryStore,
};
use provenant_engine::dispatch::NotificationDispatcher;
use serde::Serialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// Registration response: the stored item plus any open reports it matched
/// on the spot.
#[derive(Debug, Serialize)]
pub struct RegistrationOutcome {
  pub item:    Item,
  pub matches: Vec<Item>,
}

/// `POST /items` — register an item and cross-match it against open reports.
pub async fn create<S, D>(
  State(state): State<ApiState<S, D>>,
  Json(body): Json<NewItem>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistryStore,
  S::Error: Into<provenant_core::Error>,
  D: NotificationDispatcher,
{
  let item = state
    .store
    .register_item(body)
    .await
    .map_err(|e| ApiError::from(e.into()))?;

  // Registration has committed; a match-scan failure must not undo that.
  let matches = match state.matcher.find_matches(&item).await {
    Ok(outcome) => outcome.matches,
    Err(e) => {
      tracing::warn!(item = %item.item_id, error = %e, "match scan failed");
      Vec::new()
    }
  };

  Ok((StatusCode::CREATED, Json(RegistrationOutcome { item, matches })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /items/:id`
pub async fn get_one<S, D>(
  State(state): State<ApiState<S, D>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Item>, ApiError>
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
  Ok(Json(item))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /items/:id/history` — the full ledger, newest-first. An id with no
/// events yields an empty list, not a 404.
pub async fn history<S, D>(
  State(state): State<ApiState<S, D>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ProvenanceEvent>>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<provenant_core::Error>,
  D: NotificationDispatcher,
{
  let events = state
    .store
    .history(id)
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  Ok(Json(events))
}
