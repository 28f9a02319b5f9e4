//! The verification engine: classify an item from its ledger and leave an
//! audit trail of having done so.

use std::sync::Arc;

use chrono::Utc;
use provenant_core::{
  classification::{Classification, Verdict},
  event::{Actor, EventDetails, NewEvent, ProvenanceEvent},
  item::{IdentifierKind, ItemSummary},
  store::RegistryStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  EngineConfig,
  classify::{ClassifyInput, classify},
  error::{EngineError, Result},
};

// ─── Request / report types ──────────────────────────────────────────────────

/// One identifier to verify. Accepted directly as an API body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
  pub identifier: String,
  #[serde(default)]
  pub kind:       IdentifierKind,
}

/// The result of a single verification call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
  pub verdict: Verdict,
  /// `None` when the identifier resolved to nothing.
  pub item:    Option<ItemSummary>,
  /// The full ledger as of this verification, newest-first, including the
  /// audit event this call appended.
  pub ledger:  Vec<ProvenanceEvent>,
}

/// One slot of a batch verification response, aligned with the input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
  pub identifier: String,
  pub kind:       IdentifierKind,
  pub outcome:    BatchOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum BatchOutcome {
  Report(VerificationReport),
  Error { message: String },
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Classifies items against their ledgers. Every successful verification of
/// a known item appends a `verification` event — registry scrutiny is itself
/// part of an item's history.
pub struct VerificationEngine<S> {
  store:  Arc<S>,
  config: EngineConfig,
}

impl<S> VerificationEngine<S>
where
  S: RegistryStore,
  S::Error: Into<provenant_core::Error>,
{
  pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
    Self { store, config }
  }

  /// Verify a single identifier.
  ///
  /// An identifier that resolves to nothing yields an `Unknown` verdict —
  /// a normal outcome, not an error, and nothing is appended (there is no
  /// ledger to anchor an audit event to). For a known item the audit append
  /// is mandatory: if it fails, the whole call fails, so a caller can never
  /// hold a classification the ledger does not show.
  pub async fn verify(
    &self,
    identifier: &str,
    kind: IdentifierKind,
  ) -> Result<VerificationReport> {
    let item = self
      .store
      .find_by_identifier(identifier, kind)
      .await
      .map_err(EngineError::store)?;

    let Some(item) = item else {
      return Ok(VerificationReport {
        verdict: Verdict::new(Classification::Unknown, "not found in registry"),
        item:    None,
        ledger:  Vec::new(),
      });
    };

    let ledger = self
      .store
      .history(item.item_id)
      .await
      .map_err(EngineError::store)?;

    let verdict = classify(&ClassifyInput {
      item:   &item,
      ledger: &ledger,
      now:    Utc::now(),
      config: &self.config,
    });

    let audit = self
      .store
      .append_event(NewEvent::new(
        item.item_id,
        EventDetails::Verification {
          classification: verdict.classification,
          notes:          verdict.rationale.clone(),
        },
        Actor::system(),
      ))
      .await
      .map_err(EngineError::store)?;

    tracing::debug!(
      item = %item.item_id,
      classification = %verdict.classification,
      "verification recorded",
    );

    // Prepend the audit event so the rendered ledger matches what a re-read
    // would now return, without a second round trip.
    let mut ledger = ledger;
    ledger.insert(0, audit);

    Ok(VerificationReport {
      verdict,
      item: Some(item.summary()),
      ledger,
    })
  }

  /// Verify a list of identifiers, one outcome per input, in input order.
  ///
  /// Outcomes are isolated: a storage failure or timeout for one identifier
  /// becomes an error entry in its slot and leaves the others untouched.
  pub async fn verify_batch(
    &self,
    requests: Vec<VerifyRequest>,
  ) -> Vec<BatchEntry> {
    let mut entries = Vec::with_capacity(requests.len());

    for request in requests {
      let outcome = match tokio::time::timeout(
        self.config.lookup_timeout(),
        self.verify(&request.identifier, request.kind),
      )
      .await
      {
        Ok(Ok(report)) => BatchOutcome::Report(report),
        Ok(Err(e)) => {
          tracing::warn!(
            identifier = %request.identifier,
            error = %e,
            "batch verification entry failed",
          );
          BatchOutcome::Error { message: e.to_string() }
        }
        Err(_) => {
          tracing::warn!(
            identifier = %request.identifier,
            "batch verification entry timed out",
          );
          BatchOutcome::Error { message: EngineError::Timeout.to_string() }
        }
      };

      entries.push(BatchEntry {
        identifier: request.identifier,
        kind:       request.kind,
        outcome,
      });
    }

    entries
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
