//! Classification — the verification engine's output label.

use serde::{Deserialize, Serialize};

/// An item's trust status as computed from its ledger. Recorded into the
/// ledger as the details of a `verification` event, never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
  Clean,
  Suspicious,
  Stolen,
  Reported,
  Unknown,
}

impl Classification {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Clean => "clean",
      Self::Suspicious => "suspicious",
      Self::Stolen => "stolen",
      Self::Reported => "reported",
      Self::Unknown => "unknown",
    }
  }
}

impl std::fmt::Display for Classification {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A classification paired with its human-readable rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
  pub classification: Classification,
  pub rationale:      String,
}

impl Verdict {
  pub fn new(
    classification: Classification,
    rationale: impl Into<String>,
  ) -> Self {
    Self { classification, rationale: rationale.into() }
  }
}
