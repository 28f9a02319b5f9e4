//! [`SqliteStore`] — the SQLite implementation of [`RegistryStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use provenant_core::{
  event::{Actor, EventDetails, NewEvent, ProvenanceEvent},
  item::{IdentifierKind, Item, ItemStatus, NewItem},
  store::{CandidateFilter, CandidateQuery, RegistryStore},
};

use crate::{
  Error, Result,
  encode::{
    RawEvent, RawItem, encode_actor_kind, encode_dt, encode_item_status,
    encode_uuid,
  },
  schema::SCHEMA,
};

const ITEM_COLUMNS: &str = "item_id, serial_number, vin, category, brand, \
                            model, color, status, current_owner, registered_at";

const EVENT_COLUMNS: &str = "event_id, item_id, event_type, details_json, \
                             recorded_at, actor_id, actor_kind";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Provenant registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Result of a transactional write, smuggled out of the blocking closure so
/// the rollback (transaction drop) happens inside it.
enum TxOutcome {
  Applied,
  ItemMissing,
  OwnerMismatch,
}

/// Pre-encoded column values for one `events` row.
#[derive(Clone)]
struct EventRow {
  event_id:     String,
  item_id:      String,
  event_type:   String,
  details_json: String,
  recorded_at:  String,
  actor_id:     Option<String>,
  actor_kind:   String,
}

fn insert_event_row(
  conn: &rusqlite::Connection,
  row: &EventRow,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO events (
       event_id, item_id, event_type, details_json,
       recorded_at, actor_id, actor_kind
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      row.event_id,
      row.item_id,
      row.event_type,
      row.details_json,
      row.recorded_at,
      row.actor_id,
      row.actor_kind,
    ],
  )?;
  Ok(())
}

fn item_exists(
  conn: &rusqlite::Connection,
  item_id: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM items WHERE item_id = ?1",
        rusqlite::params![item_id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn raw_item_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawItem> {
  Ok(RawItem {
    item_id:       row.get(0)?,
    serial_number: row.get(1)?,
    vin:           row.get(2)?,
    category:      row.get(3)?,
    brand:         row.get(4)?,
    model:         row.get(5)?,
    color:         row.get(6)?,
    status:        row.get(7)?,
    current_owner: row.get(8)?,
    registered_at: row.get(9)?,
  })
}

fn raw_event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    event_id:     row.get(0)?,
    item_id:      row.get(1)?,
    event_type:   row.get(2)?,
    details_json: row.get(3)?,
    recorded_at:  row.get(4)?,
    actor_id:     row.get(5)?,
    actor_kind:   row.get(6)?,
  })
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Materialise a [`NewEvent`] into a stored-shape event plus its encoded
  /// row. `recorded_at` defaults to now when the writer supplied none.
  fn build_event(input: NewEvent) -> Result<(ProvenanceEvent, EventRow)> {
    let event = ProvenanceEvent {
      event_id:    Uuid::new_v4(),
      item_id:     input.item_id,
      details:     input.details,
      recorded_at: input.recorded_at.unwrap_or_else(Utc::now),
      actor:       input.actor,
    };

    let row = EventRow {
      event_id:     encode_uuid(event.event_id),
      item_id:      encode_uuid(event.item_id),
      event_type:   event.details.discriminant().to_owned(),
      details_json: event
        .details
        .to_json()
        .map_err(Error::Core)?
        .to_string(),
      recorded_at:  encode_dt(event.recorded_at),
      actor_id:     event.actor.id.map(encode_uuid),
      actor_kind:   encode_actor_kind(event.actor.kind).to_owned(),
    };

    Ok((event, row))
  }
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = Error;

  // ── Items ─────────────────────────────────────────────────────────────────

  async fn register_item(&self, input: NewItem) -> Result<Item> {
    let item = Item {
      item_id:       Uuid::new_v4(),
      serial_number: input.serial_number,
      vin:           input.vin,
      category:      input.category,
      brand:         input.brand,
      model:         input.model,
      color:         input.color,
      status:        ItemStatus::Active,
      current_owner: input.owner,
      registered_at: Utc::now(),
    };

    // The creation event is part of registration itself, so every ledger
    // begins with one.
    let creation = NewEvent::new(
      item.item_id,
      EventDetails::Creation,
      Actor::user(input.owner),
    )
    .recorded_at(item.registered_at);
    let (_, event_row) = Self::build_event(creation)?;

    let item_id_str  = encode_uuid(item.item_id);
    let serial       = item.serial_number.clone();
    let vin          = item.vin.clone();
    let category     = item.category.clone();
    let brand        = item.brand.clone();
    let model        = item.model.clone();
    let color        = item.color.clone();
    let status_str   = encode_item_status(item.status).to_owned();
    let owner_str    = encode_uuid(item.current_owner);
    let at_str       = encode_dt(item.registered_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO items (
             item_id, serial_number, vin, category, brand, model, color,
             status, current_owner, registered_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            item_id_str,
            serial,
            vin,
            category,
            brand,
            model,
            color,
            status_str,
            owner_str,
            at_str,
          ],
        )?;
        insert_event_row(&tx, &event_row)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(item)
  }

  async fn get_item(&self, id: Uuid) -> Result<Option<Item>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ITEM_COLUMNS} FROM items WHERE item_id = ?1"),
              rusqlite::params![id_str],
              raw_item_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn find_by_identifier(
    &self,
    value: &str,
    kind: IdentifierKind,
  ) -> Result<Option<Item>> {
    let column = match kind {
      IdentifierKind::SerialNumber => "serial_number",
      IdentifierKind::Vin => "vin",
    };
    let value = value.to_owned();

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              // Identifiers are not unique across records; prefer the most
              // recently registered one.
              &format!(
                "SELECT {ITEM_COLUMNS} FROM items WHERE {column} = ?1
                 ORDER BY registered_at DESC LIMIT 1"
              ),
              rusqlite::params![value],
              raw_item_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn find_candidates(&self, query: &CandidateQuery) -> Result<Vec<Item>> {
    // Status restriction: fixed enum strings, inlined as quoted literals.
    let status_list = query
      .statuses
      .iter()
      .map(|s| format!("'{}'", encode_item_status(*s)))
      .collect::<Vec<_>>()
      .join(", ");

    let exclude_str = query.exclude.map(encode_uuid);
    let limit_val   = query.limit.unwrap_or(100) as i64;
    let filter      = query.filter.clone();

    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let base = format!(
          "SELECT {ITEM_COLUMNS} FROM items
           WHERE status IN ({status_list})
             AND (?1 IS NULL OR item_id != ?1)"
        );

        let rows = match filter {
          CandidateFilter::Vin(vin) => {
            let mut stmt =
              conn.prepare(&format!("{base} AND vin = ?2 LIMIT ?3"))?;
            stmt
              .query_map(
                rusqlite::params![exclude_str, vin, limit_val],
                raw_item_from_row,
              )?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          CandidateFilter::SerialNumber(serial) => {
            let mut stmt = conn
              .prepare(&format!("{base} AND serial_number = ?2 LIMIT ?3"))?;
            stmt
              .query_map(
                rusqlite::params![exclude_str, serial, limit_val],
                raw_item_from_row,
              )?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          CandidateFilter::Fuzzy {
            category,
            brand,
            model,
            color,
            registered_after,
          } => {
            // `col = NULL` is never true in SQL, so an absent attribute on
            // either side simply fails to contribute a match.
            let mut stmt = conn.prepare(&format!(
              "{base}
                 AND category = ?2
                 AND (brand = ?3 OR model = ?4 OR color = ?5)
                 AND registered_at >= ?6
               LIMIT ?7"
            ))?;
            stmt
              .query_map(
                rusqlite::params![
                  exclude_str,
                  category,
                  brand,
                  model,
                  color,
                  encode_dt(registered_after),
                  limit_val,
                ],
                raw_item_from_row,
              )?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
        };

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }

  // ── Ledger — append-only writes ───────────────────────────────────────────

  async fn append_event(&self, input: NewEvent) -> Result<ProvenanceEvent> {
    let item_id = input.item_id;
    let (event, row) = Self::build_event(input)?;

    let found: bool = self
      .conn
      .call(move |conn| {
        if !item_exists(conn, &row.item_id)? {
          return Ok(false);
        }
        insert_event_row(conn, &row)?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::ItemNotFound(item_id));
    }
    Ok(event)
  }

  async fn history(&self, item_id: Uuid) -> Result<Vec<ProvenanceEvent>> {
    let id_str = encode_uuid(item_id);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM events
           WHERE item_id = ?1
           ORDER BY recorded_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], raw_event_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  // ── Transactional units ───────────────────────────────────────────────────

  async fn apply_transfer(&self, input: NewEvent) -> Result<ProvenanceEvent> {
    let item_id = input.item_id;
    let (previous_owner, new_owner) = match &input.details {
      EventDetails::Transfer { previous_owner, new_owner, .. } => {
        (*previous_owner, *new_owner)
      }
      other => {
        return Err(Error::Core(provenant_core::Error::InvalidEvent(format!(
          "apply_transfer requires transfer details, got {:?}",
          other.discriminant()
        ))));
      }
    };

    let (event, row) = Self::build_event(input)?;
    let item_id_str  = encode_uuid(item_id);
    let prev_str     = encode_uuid(previous_owner);
    let new_str      = encode_uuid(new_owner);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !item_exists(&tx, &item_id_str)? {
          return Ok(TxOutcome::ItemMissing);
        }

        insert_event_row(&tx, &row)?;

        // Optimistic guard: only repoint the owner if it still equals the
        // previous owner the event claims. A miss rolls the append back too
        // (the transaction is dropped uncommitted).
        let updated = tx.execute(
          "UPDATE items SET current_owner = ?1
           WHERE item_id = ?2 AND current_owner = ?3",
          rusqlite::params![new_str, item_id_str, prev_str],
        )?;
        if updated == 0 {
          return Ok(TxOutcome::OwnerMismatch);
        }

        tx.commit()?;
        Ok(TxOutcome::Applied)
      })
      .await?;

    match outcome {
      TxOutcome::Applied => Ok(event),
      TxOutcome::ItemMissing => Err(Error::ItemNotFound(item_id)),
      TxOutcome::OwnerMismatch => Err(Error::OwnerConflict(item_id)),
    }
  }

  async fn apply_report(
    &self,
    input: NewEvent,
    status: ItemStatus,
  ) -> Result<ProvenanceEvent> {
    let item_id = input.item_id;
    let (event, row) = Self::build_event(input)?;
    let item_id_str  = encode_uuid(item_id);
    let status_str   = encode_item_status(status).to_owned();

    let found: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !item_exists(&tx, &item_id_str)? {
          return Ok(false);
        }

        insert_event_row(&tx, &row)?;
        tx.execute(
          "UPDATE items SET status = ?1 WHERE item_id = ?2",
          rusqlite::params![status_str, item_id_str],
        )?;

        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::ItemNotFound(item_id));
    }
    Ok(event)
  }
}
