//! The grid-of-text view of a worksheet that the ingestion logic works on.

/// A worksheet as a two-dimensional grid of text cells.
///
/// Positions are absolute: row 0 is the first row of the sheet even if it is
/// empty. Cells outside the populated area read as the empty string.
pub trait Sheet {
  fn name(&self) -> &str;

  fn row_count(&self) -> usize;

  fn cell(&self, row: usize, col: usize) -> &str;
}

/// An in-memory [`Sheet`] backed by rows of owned strings.
///
/// Rows may be ragged; missing cells are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
  name: String,
  rows: Vec<Vec<String>>,
}

impl Grid {
  pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
    Self { name: name.into(), rows }
  }

  /// Build a grid from string slices; handy for literals in tests.
  pub fn from_rows<R, C>(name: impl Into<String>, rows: R) -> Self
  where
    R: IntoIterator<Item = C>,
    C: IntoIterator,
    C::Item: Into<String>,
  {
    let rows = rows
      .into_iter()
      .map(|row| row.into_iter().map(Into::into).collect())
      .collect();
    Self::new(name, rows)
  }
}

impl Sheet for Grid {
  fn name(&self) -> &str { &self.name }

  fn row_count(&self) -> usize { self.rows.len() }

  fn cell(&self, row: usize, col: usize) -> &str {
    self
      .rows
      .get(row)
      .and_then(|r| r.get(col))
      .map_or("", String::as_str)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cells_outside_grid_are_empty() {
    let g = Grid::from_rows("s", [vec!["a", "b"], vec!["c"]]);
    assert_eq!(g.row_count(), 2);
    assert_eq!(g.cell(0, 1), "b");
    assert_eq!(g.cell(1, 1), "");
    assert_eq!(g.cell(5, 0), "");
  }
}
