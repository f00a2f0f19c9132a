//! Error types for `pricelog-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No row of the sheet carries all three header labels.
  #[error("{sheet}: no header found")]
  HeaderNotFound { sheet: String },

  /// The city name could not be derived from the input file name.
  #[error("failed to extract city name from {0:?}")]
  CityName(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
