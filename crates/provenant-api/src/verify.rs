//! Handlers for `/verify` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/verify` | Body: [`VerifyRequest`]; always a structured result |
//! | `POST` | `/verify/batch` | Body: `{"identifiers":[...]}`; one slot per input |

use axum::{
  Json,
  extract::State,
};
use provenant_core::store::RegistryStore;
use provenant_engine::{
  dispatch::NotificationDispatcher,
  verify::{BatchEntry, VerificationReport, VerifyRequest},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

/// `POST /verify` — classify one identifier. An unknown identifier is a
/// normal 200 with an `unknown` verdict, not a 404.
pub async fn one<S, D>(
  State(state): State<ApiState<S, D>>,
  Json(body): Json<VerifyRequest>,
) -> Result<Json<VerificationReport>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<provenant_core::Error>,
  D: NotificationDispatcher,
{
  let report = state.verifier.verify(&body.identifier, body.kind).await?;
  Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
  pub identifiers: Vec<VerifyRequest>,
}

/// `POST /verify/batch` — classify many identifiers; per-identifier failures
/// come back as error slots, never as a failed request.
pub async fn batch<S, D>(
  State(state): State<ApiState<S, D>>,
  Json(body): Json<BatchBody>,
) -> Result<Json<Vec<BatchEntry>>, ApiError>
where
  S: RegistryStore,
  S::Error: Into<provenant_core::Error>,
  D: NotificationDispatcher,
{
  let entries = state.verifier.verify_batch(body.identifiers).await;
  Ok(Json(entries))
}
