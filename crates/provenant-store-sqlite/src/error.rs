//! Error type for `provenant-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] provenant_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("stored value could not be decoded: {0}")]
  Decode(String),

  #[error("item not found: {0}")]
  ItemNotFound(uuid::Uuid),

  /// The optimistic owner guard on a transfer found a different current
  /// owner than the transfer event claims — a concurrent transfer won.
  #[error("owner pointer for item {0} changed concurrently")]
  OwnerConflict(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fold backend-specific errors into the shared taxonomy so layers above the
/// store trait can match on `provenant_core::Error` alone.
impl From<Error> for provenant_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      Error::ItemNotFound(id) => provenant_core::Error::ItemNotFound(id),
      Error::OwnerConflict(id) => provenant_core::Error::OwnerConflict(id),
      other => provenant_core::Error::Storage(other.to_string()),
    }
  }
}
