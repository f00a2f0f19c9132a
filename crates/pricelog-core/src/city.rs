//! City name derivation from price-list file names.

use std::path::Path;

use crate::{Error, Result};

/// Extract the city from a file name such as `prices-Moscow.xls`.
///
/// The city is the text between the last `-` and the last `.` of the file
/// name. Directory components are ignored.
pub fn city_from_path(path: impl AsRef<Path>) -> Result<String> {
  let path = path.as_ref();
  let file = path
    .file_name()
    .map(|f| f.to_string_lossy())
    .ok_or_else(|| Error::CityName(path.display().to_string()))?;

  match (file.rfind('-'), file.rfind('.')) {
    (Some(from), Some(to)) if to > from + 1 => Ok(file[from + 1..to].to_owned()),
    _ => Err(Error::CityName(file.into_owned())),
  }
}
