//! Handler for `POST /items/:id/transfer`.

use axum::{
  Json,
  extract::{Path, State},
};
use provenant_core::{
  event::{Actor, Document},
  store::RegistryStore,
};
use provenant_engine::{
  dispatch::NotificationDispatcher, transfer::TransferReceipt,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// JSON body accepted by `POST /items/:id/transfer`.
#[derive(Debug, Deserialize)]
pub struct TransferBody {
  pub previous_owner: Uuid,
  pub new_owner:      Uuid,
  #[serde(default)]
  pub documents:      Vec<Document>,
}

/// `POST /items/:id/transfer` — record an ownership change.
///
/// Fully succeeds or fails with no partial effect: 404 for an unknown item,
/// 409 when the current owner no longer matches `previous_owner`.
pub async fn record<S, D>(
  State(state): State<ApiState<S, D>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TransferBody>,
) -> Result<Json<TransferReceipt>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<provenant_core::Error>,
  D: NotificationDispatcher,
{
  let receipt = state
    .transfers
    .record_transfer(
      id,
      body.previous_owner,
      body.new_owner,
      body.documents,
      Actor::user(body.previous_owner),
    )
    .await?;
  Ok(Json(receipt))
}
