//! [`SqliteStore`] — connection handle and SQL primitives.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use pricelog_core::model::{
  City, CityId, CityRef, MetricKind, Observation, PriceRow, Product, ProductId,
  WriteOutcome,
};

use crate::{
  encode::{RawObservation, encode_dt, metric_column, metric_table},
  schema::SCHEMA,
  Result,
};

/// Insert a product, or give an unnamed one the incoming name.
const UPSERT_PRODUCT: &str = "
INSERT INTO products (id, name) VALUES (?1, ?2)
ON CONFLICT (id) DO UPDATE SET name = excluded.name
WHERE products.name IS NULL AND excluded.name IS NOT NULL";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A price ledger backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All clones
/// share one connection, and therefore one transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an existing store for queries only.
  ///
  /// The file is neither created nor migrated, and writes fail.
  pub async fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
    let flags = rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
      | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = tokio_rusqlite::Connection::open_with_flags(path, flags).await?;
    Ok(Self { conn })
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

  /// Close the underlying connection. An open transaction is rolled back.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  // ── Transactions ──────────────────────────────────────────────────────────

  pub async fn begin(&self) -> Result<()> { self.batch("BEGIN").await }

  pub async fn commit(&self) -> Result<()> { self.batch("COMMIT").await }

  pub async fn rollback(&self) -> Result<()> { self.batch("ROLLBACK").await }

  async fn batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Cities ────────────────────────────────────────────────────────────────

  /// Find or create the city for a run.
  ///
  /// Without a caller-supplied id the city is looked up by name and, when
  /// missing, inserted under `MAX(id) + 1`. With an id, a row is inserted
  /// only if that id is not taken yet.
  pub async fn resolve_city(&self, city: &CityRef) -> Result<CityId> {
    let name = city.name.clone();
    let wanted = city.id.map(|id| id.0);

    let id = self
      .conn
      .call(move |conn| {
        let existing: Option<i64> = match wanted {
          Some(id) => conn
            .query_row("SELECT id FROM cities WHERE id = ?1", rusqlite::params![id], |r| {
              r.get(0)
            })
            .optional()?,
          None => conn
            .query_row(
              "SELECT id FROM cities WHERE name = ?1",
              rusqlite::params![name],
              |r| r.get(0),
            )
            .optional()?,
        };
        if let Some(id) = existing {
          return Ok(id);
        }

        let id = match wanted {
          Some(id) => id,
          None => conn.query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM cities", [], |r| {
            r.get(0)
          })?,
        };
        conn.execute(
          "INSERT INTO cities (id, name) VALUES (?1, ?2)",
          rusqlite::params![id, name],
        )?;
        Ok(id)
      })
      .await?;

    Ok(CityId(id))
  }

  pub async fn city_id(&self, name: &str) -> Result<Option<CityId>> {
    let name = name.to_owned();
    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id FROM cities WHERE name = ?1",
              rusqlite::params![name],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(id.map(CityId))
  }

  pub async fn cities(&self) -> Result<Vec<City>> {
    let rows: Vec<(i64, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM cities ORDER BY id")?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(id, name)| City { id: CityId(id), name })
        .collect(),
    )
  }

  // ── Products ──────────────────────────────────────────────────────────────

  pub async fn product(&self, id: ProductId) -> Result<Option<Product>> {
    let raw: Option<(i64, Option<String>)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name FROM products WHERE id = ?1",
              rusqlite::params![id.0],
              |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(|(id, name)| Product { id: ProductId(id), name }))
  }

  // ── Observations — append-only writes ────────────────────────────────────

  /// Record `row` for `city` at `at`, appending only the metrics whose value
  /// differs from the newest stored observation.
  ///
  /// The product row is created if missing; its name is filled in only while
  /// it has none.
  pub async fn record(
    &self,
    row: &PriceRow,
    city: CityId,
    at: DateTime<Utc>,
  ) -> Result<WriteOutcome> {
    let product  = row.product_id.0;
    let name     = row.name().map(str::to_owned);
    let price    = row.price;
    let bonus    = row.bonus;
    let at_str   = encode_dt(at);

    let outcome = self
      .conn
      .call(move |conn| {
        conn
          .prepare_cached(UPSERT_PRODUCT)?
          .execute(rusqlite::params![product, name])?;

        let price_changed =
          append_if_changed(conn, MetricKind::Price, product, city.0, price, &at_str)?;
        let bonus_changed =
          append_if_changed(conn, MetricKind::Bonus, product, city.0, bonus, &at_str)?;

        Ok(WriteOutcome { price_changed, bonus_changed })
      })
      .await?;

    Ok(outcome)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// The newest observation of `metric` for (product, city), if any.
  pub async fn latest(
    &self,
    product: ProductId,
    city: CityId,
    metric: MetricKind,
  ) -> Result<Option<Observation>> {
    Ok(self.observations(product, city, metric, Some(1)).await?.into_iter().next())
  }

  /// Every observation of `metric` for (product, city), newest first.
  pub async fn history(
    &self,
    product: ProductId,
    city: CityId,
    metric: MetricKind,
  ) -> Result<Vec<Observation>> {
    self.observations(product, city, metric, None).await
  }

  async fn observations(
    &self,
    product: ProductId,
    city: CityId,
    metric: MetricKind,
    limit: Option<i64>,
  ) -> Result<Vec<Observation>> {
    let sql = format!(
      "SELECT product_id, city_id, {column}, observed_at
       FROM {table}
       WHERE product_id = ?1 AND city_id = ?2
       ORDER BY observed_at DESC
       LIMIT ?3",
      column = metric_column(metric),
      table = metric_table(metric),
    );
    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.unwrap_or(-1);

    let raws: Vec<RawObservation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![product.0, city.0, limit], |row| {
            Ok(RawObservation {
              product_id:  row.get(0)?,
              city_id:     row.get(1)?,
              value:       row.get(2)?,
              observed_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|raw| raw.into_observation(metric)).collect()
  }
}

/// Append an observation unless the newest one already holds `value`.
fn append_if_changed(
  conn: &rusqlite::Connection,
  metric: MetricKind,
  product: i64,
  city: i64,
  value: i64,
  at: &str,
) -> rusqlite::Result<bool> {
  let table = metric_table(metric);
  let column = metric_column(metric);

  let latest: Option<i64> = conn
    .prepare_cached(&format!(
      "SELECT {column} FROM {table}
       WHERE product_id = ?1 AND city_id = ?2
       ORDER BY observed_at DESC
       LIMIT 1"
    ))?
    .query_row(rusqlite::params![product, city], |r| r.get(0))
    .optional()?;

  if latest == Some(value) {
    return Ok(false);
  }

  conn
    .prepare_cached(&format!(
      "INSERT INTO {table} (product_id, city_id, {column}, observed_at)
       VALUES (?1, ?2, ?3, ?4)"
    ))?
    .execute(rusqlite::params![product, city, value, at])?;
  Ok(true)
}
