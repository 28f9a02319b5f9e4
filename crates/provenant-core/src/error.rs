//! Error types for `provenant-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("item not found: {0}")]
  ItemNotFound(Uuid),

  #[error("invalid event: {0}")]
  InvalidEvent(String),

  #[error("owner pointer for item {0} changed concurrently")]
  OwnerConflict(Uuid),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Backend failure with no finer classification. Store crates map their
  /// native errors into this taxonomy so callers above the store trait never
  /// see backend types.
  #[error("storage error: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
