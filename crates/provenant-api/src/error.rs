//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use provenant_engine::EngineError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store lookup timed out")]
  Timeout,

  #[error("store error: {0}")]
  Store(String),
}

impl From<provenant_core::Error> for ApiError {
  fn from(e: provenant_core::Error) -> Self {
    use provenant_core::Error as E;
    match e {
      E::ItemNotFound(id) => ApiError::NotFound(format!("item {id} not found")),
      E::InvalidEvent(m) => ApiError::BadRequest(m),
      E::OwnerConflict(_) => ApiError::Conflict(e.to_string()),
      E::Serialization(e) => ApiError::BadRequest(e.to_string()),
      E::Storage(m) => ApiError::Store(m),
    }
  }
}

impl From<EngineError> for ApiError {
  fn from(e: EngineError) -> Self {
    match e {
      EngineError::Registry(inner) => inner.into(),
      EngineError::Timeout => ApiError::Timeout,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Timeout => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
      ApiError::Store(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
