//! JSON REST API for the Provenant registry.
//!
//! Exposes an axum [`Router`] over any
//! [`provenant_core::store::RegistryStore`] and
//! [`provenant_engine::dispatch::NotificationDispatcher`]. Auth, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", provenant_api::api_router(state.clone()))
//! ```

pub mod error;
pub mod items;
pub mod reports;
pub mod transfers;
pub mod verify;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use provenant_core::store::RegistryStore;
use provenant_engine::{
  dispatch::NotificationDispatcher, matcher::CrossMatchEngine,
  transfer::TransferCoordinator, verify::VerificationEngine,
};

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers: the store plus the three
/// constructed engine services.
pub struct ApiState<S, D> {
  pub store:     Arc<S>,
  pub verifier:  Arc<VerificationEngine<S>>,
  pub transfers: Arc<TransferCoordinator<S, D>>,
  pub matcher:   Arc<CrossMatchEngine<S, D>>,
}

// Manual impl: a derive would demand `S: Clone` and `D: Clone`, which the
// `Arc`s make unnecessary.
impl<S, D> Clone for ApiState<S, D> {
  fn clone(&self) -> Self {
    Self {
      store:     self.store.clone(),
      verifier:  self.verifier.clone(),
      transfers: self.transfers.clone(),
      matcher:   self.matcher.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, D>(state: ApiState<S, D>) -> Router<()>
where
  S: RegistryStore + 'static,
  S::Error: Into<provenant_core::Error>,
  D: NotificationDispatcher + 'static,
{
  Router::new()
    // Items and their ledgers
    .route("/items", post(items::create::<S, D>))
    .route("/items/{id}", get(items::get_one::<S, D>))
    .route("/items/{id}/history", get(items::history::<S, D>))
    // Report intake (the external append contract)
    .route("/items/{id}/events", post(reports::record::<S, D>))
    .route("/items/{id}/matches", post(reports::rematch::<S, D>))
    // Ownership transfer
    .route("/items/{id}/transfer", post(transfers::record::<S, D>))
    // Verification
    .route("/verify", post(verify::one::<S, D>))
    .route("/verify/batch", post(verify::batch::<S, D>))
    .with_state(state)
}
