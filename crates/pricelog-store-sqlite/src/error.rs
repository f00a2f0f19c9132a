//! Error type for `pricelog-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The store could not be opened for this run. Sticky: every later write
  /// returns this without retrying.
  #[error("store unavailable: {0}")]
  Unavailable(String),

  #[error("writer is closed")]
  Closed,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
