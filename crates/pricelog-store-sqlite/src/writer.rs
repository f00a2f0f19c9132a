//! [`SqliteWriter`] — the change-detecting [`ObservationWriter`] for one
//! ingestion run.
//!
//! The store is opened lazily on the first write. The whole run shares a
//! single transaction that is committed by [`close`](ObservationWriter::close).
//! If the store cannot be opened, the writer stays failed for the rest of the
//! run and every write returns [`Error::Unavailable`] without retrying.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pricelog_core::{
  model::{CityId, CityRef, PriceRow, WriteOutcome},
  writer::ObservationWriter,
};

use crate::{Error, Result, SqliteStore};

enum State {
  Unopened,
  Open { store: SqliteStore, city_id: CityId },
  Failed(String),
  Closed,
}

/// Writes one run's observations for one city into a SQLite file.
pub struct SqliteWriter {
  path:   PathBuf,
  city:   CityRef,
  run_at: DateTime<Utc>,
  state:  State,
}

impl SqliteWriter {
  /// Create a writer for `city`. Nothing is opened until the first write.
  ///
  /// Every observation of the run is stamped with the creation time.
  pub fn new(path: impl Into<PathBuf>, city: CityRef) -> Self {
    Self {
      path: path.into(),
      city,
      run_at: Utc::now(),
      state: State::Unopened,
    }
  }

  /// Stamp the run's observations with `run_at` instead of the creation time.
  pub fn at(mut self, run_at: DateTime<Utc>) -> Self {
    self.run_at = run_at;
    self
  }

  /// The resolved city id, once the store is open.
  pub fn city_id(&self) -> Option<CityId> {
    match self.state {
      State::Open { city_id, .. } => Some(city_id),
      _ => None,
    }
  }

  pub fn is_failed(&self) -> bool { matches!(self.state, State::Failed(_)) }

  async fn open(&self) -> State {
    match open_run(&self.path, &self.city).await {
      Ok((store, city_id)) => {
        tracing::info!(
          path = %self.path.display(),
          city = %self.city.name,
          %city_id,
          "store opened"
        );
        State::Open { store, city_id }
      }
      Err(e) => {
        tracing::error!(path = %self.path.display(), error = %e, "failed to open store");
        State::Failed(e.to_string())
      }
    }
  }
}

/// Open the store, resolve the city and begin the run's transaction.
///
/// On failure the connection is released before returning.
async fn open_run(path: &Path, city: &CityRef) -> Result<(SqliteStore, CityId)> {
  let store = SqliteStore::open(path).await?;

  let prepared: Result<CityId> = async {
    let city_id = store.resolve_city(city).await?;
    store.begin().await?;
    Ok(city_id)
  }
  .await;

  match prepared {
    Ok(city_id) => Ok((store, city_id)),
    Err(e) => {
      if let Err(close_err) = store.close().await {
        tracing::warn!(error = %close_err, "failed to close store after open error");
      }
      Err(e)
    }
  }
}

impl ObservationWriter for SqliteWriter {
  type Error = Error;

  async fn write(&mut self, row: &PriceRow) -> Result<WriteOutcome> {
    if let State::Unopened = self.state {
      self.state = self.open().await;
    }

    match &self.state {
      State::Open { store, city_id } => {
        let outcome = store.record(row, *city_id, self.run_at).await?;
        tracing::debug!(
          id = %row.product_id,
          price_changed = outcome.price_changed,
          bonus_changed = outcome.bonus_changed,
          "row recorded"
        );
        Ok(outcome)
      }
      State::Failed(reason) => Err(Error::Unavailable(reason.clone())),
      // `open` never leaves the writer unopened.
      State::Unopened | State::Closed => Err(Error::Closed),
    }
  }

  async fn close(&mut self) -> Result<()> {
    let State::Open { store, .. } = std::mem::replace(&mut self.state, State::Closed)
    else {
      return Ok(());
    };

    let committed = store.commit().await;
    if let Err(e) = &committed {
      tracing::warn!(error = %e, "commit failed, rolling back");
      if let Err(e) = store.rollback().await {
        tracing::warn!(error = %e, "rollback failed");
      }
    }
    let closed = store.close().await;

    committed?;
    closed?;
    tracing::info!(path = %self.path.display(), "run committed");
    Ok(())
  }
}
