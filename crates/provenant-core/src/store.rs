//! The `RegistryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `provenant-store-sqlite`). Higher layers (`provenant-engine`,
//! `provenant-api`) depend on this abstraction, not on any concrete backend.
//!
//! One trait covers both the item records and their ledgers: the
//! transactional operations ([`RegistryStore::apply_transfer`],
//! [`RegistryStore::apply_report`]) must write to both within a single unit
//! of work, so splitting them across traits would only move the coupling
//! into every implementation.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  event::{NewEvent, ProvenanceEvent},
  item::{IdentifierKind, Item, ItemStatus, NewItem},
};

// ─── Candidate query ─────────────────────────────────────────────────────────

/// The shape of a cross-match candidate lookup.
///
/// Exact-identifier and fuzzy lookups filter on different columns, so the
/// filter is an enum rather than a bag of optional fields — a query can
/// never accidentally mix both strategies.
#[derive(Debug, Clone)]
pub enum CandidateFilter {
  /// VIN equality.
  Vin(String),
  /// Serial-number equality.
  SerialNumber(String),
  /// Attribute similarity: same category AND at least one of brand, model,
  /// or color matching, restricted to recently registered candidates.
  Fuzzy {
    category:         String,
    brand:            Option<String>,
    model:            Option<String>,
    color:            Option<String>,
    registered_after: DateTime<Utc>,
  },
}

/// Parameters for [`RegistryStore::find_candidates`].
#[derive(Debug, Clone)]
pub struct CandidateQuery {
  pub filter:   CandidateFilter,
  /// Only items in one of these statuses are candidates.
  pub statuses: Vec<ItemStatus>,
  /// The triggering item, excluded so an item never matches itself.
  pub exclude:  Option<Uuid>,
  pub limit:    Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Provenant registry backend.
///
/// The events side of the store is strictly append-only: no operation ever
/// updates or deletes a ledger entry. Item rows carry the only mutable state
/// (status, current owner), and both mutations are bundled with their ledger
/// entry in a single transactional operation.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RegistryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Items ─────────────────────────────────────────────────────────────

  /// Create and persist a new item in `Active` status, appending its
  /// `creation` event in the same transaction.
  fn register_item(
    &self,
    input: NewItem,
  ) -> impl Future<Output = Result<Item, Self::Error>> + Send + '_;

  /// Retrieve an item by id. Returns `None` if not found.
  fn get_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + '_;

  /// Look an item up by serial number or VIN. Returns `None` if the
  /// identifier is not in the registry — a normal outcome, not an error.
  fn find_by_identifier<'a>(
    &'a self,
    value: &'a str,
    kind: IdentifierKind,
  ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send + 'a;

  /// Return items matching a cross-match candidate query.
  fn find_candidates<'a>(
    &'a self,
    query: &'a CandidateQuery,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + 'a;

  // ── Ledger — append-only writes ───────────────────────────────────────

  /// Append one event to an item's ledger and return the stored
  /// [`ProvenanceEvent`]. `recorded_at` is assigned by the store when the
  /// writer supplied none. Fails if the item does not exist.
  ///
  /// Failures are surfaced, never retried internally: a blind retry could
  /// duplicate an append.
  fn append_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<ProvenanceEvent, Self::Error>> + Send + '_;

  /// Return the complete ledger for an item, newest-first (ties broken by
  /// insertion order). An item with no events yields an empty sequence.
  fn history(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ProvenanceEvent>, Self::Error>> + Send + '_;

  // ── Transactional units ───────────────────────────────────────────────

  /// Record an ownership change: append the `transfer` event and repoint
  /// `current_owner` to the new owner in one transaction. Either both writes
  /// apply or neither does.
  ///
  /// `input.details` must be [`EventDetails::Transfer`]; the owner-pointer
  /// update is guarded on `current_owner` still equalling the event's
  /// `previous_owner`, so two racing transfers cannot both commit.
  ///
  /// [`EventDetails::Transfer`]: crate::event::EventDetails::Transfer
  fn apply_transfer(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<ProvenanceEvent, Self::Error>> + Send + '_;

  /// Record an incident report: append the event and set the item's status
  /// in one transaction, so an item in a reported status always has the
  /// ledger entry to show for it.
  fn apply_report(
    &self,
    input: NewEvent,
    status: ItemStatus,
  ) -> impl Future<Output = Result<ProvenanceEvent, Self::Error>> + Send + '_;
}
