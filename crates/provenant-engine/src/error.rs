//! Error type for `provenant-engine`.
//!
//! Store backends fold their native errors into `provenant_core::Error`
//! (every `RegistryStore` used here is bound by
//! `S::Error: Into<provenant_core::Error>`), so the engine never names a
//! backend type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error(transparent)]
  Registry(#[from] provenant_core::Error),

  #[error("store lookup timed out")]
  Timeout,
}

impl EngineError {
  /// Shorthand for lifting a store error into the shared taxonomy.
  pub(crate) fn store<E: Into<provenant_core::Error>>(e: E) -> Self {
    Self::Registry(e.into())
  }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
