//! Verification, ownership transfer, and cross-matching services for the
//! Provenant item registry.
//!
//! Each service is an explicit, constructed instance holding its store (and,
//! where it fans out, its notification dispatcher) — no ambient state, so
//! every collaborator can be replaced by a test double.

pub mod classify;
pub mod dispatch;
pub mod error;
pub mod matcher;
pub mod transfer;
pub mod verify;

#[cfg(test)]
mod testing;

pub use error::EngineError;

use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Engine tunables. The defaults reproduce the registry's established
/// heuristics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// A ledger with more than this many transfer events counts as "frequent
  /// ownership changes" when the item is also freshly registered.
  pub rapid_transfer_threshold:   usize,
  /// How recent the item's creation event must be for the frequent-transfer
  /// rule to apply, in days.
  pub rapid_transfer_window_days: i64,
  /// How far back fuzzy cross-matching will consider candidates, in days.
  pub fuzzy_match_window_days:    i64,
  /// Per-identifier budget for batch verification, in seconds.
  pub lookup_timeout_secs:        u64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      rapid_transfer_threshold:   3,
      rapid_transfer_window_days: 30,
      fuzzy_match_window_days:    30,
      lookup_timeout_secs:        10,
    }
  }
}

impl EngineConfig {
  pub fn rapid_transfer_window(&self) -> chrono::Duration {
    chrono::Duration::days(self.rapid_transfer_window_days)
  }

  pub fn fuzzy_match_window(&self) -> chrono::Duration {
    chrono::Duration::days(self.fuzzy_match_window_days)
  }

  pub fn lookup_timeout(&self) -> std::time::Duration {
    std::time::Duration::from_secs(self.lookup_timeout_secs)
  }
}
