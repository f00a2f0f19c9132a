//! Error types for the workbook reader.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("workbook error: {0}")]
  Calamine(#[from] calamine::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
