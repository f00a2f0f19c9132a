//! Header detection for price-list sheets.
//!
//! Exports put a variable number of category columns in front of the data,
//! and the header row drifts down with them. A row only counts as the header
//! when it carries all three labels within its search window.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, sheet::Sheet};

/// Columns searched in row 0; every following row widens the window by one.
const BASE_WINDOW: usize = 5;

/// The labels that mark the identifier, price and bonus columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderLabels {
  pub id:    String,
  pub price: String,
  pub bonus: String,
}

impl Default for HeaderLabels {
  fn default() -> Self {
    Self {
      id:    "Код".into(),
      price: "Цена, руб".into(),
      bonus: "Бонусы".into(),
    }
  }
}

/// Where the data lives in a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
  pub header_row: usize,
  pub id_col:     usize,
  /// Always `id_col + 1`; the name column carries no label of its own.
  pub name_col:   usize,
  pub price_col:  usize,
  pub bonus_col:  usize,
}

/// Find the first row holding all three header labels.
///
/// Row `i` is searched in columns `0..i + 5`. Within a row the leftmost
/// occurrence of each label wins.
pub fn locate_header(sheet: &impl Sheet, labels: &HeaderLabels) -> Result<HeaderLayout> {
  (0..sheet.row_count())
    .find_map(|row| match_row(sheet, row, labels))
    .ok_or_else(|| Error::HeaderNotFound { sheet: sheet.name().to_owned() })
}

fn match_row(sheet: &impl Sheet, row: usize, labels: &HeaderLabels) -> Option<HeaderLayout> {
  let (mut id, mut price, mut bonus) = (None, None, None);

  for col in 0..row + BASE_WINDOW {
    let text = sheet.cell(row, col).trim();
    if id.is_none() && text == labels.id {
      id = Some(col);
    } else if price.is_none() && text == labels.price {
      price = Some(col);
    } else if bonus.is_none() && text == labels.bonus {
      bonus = Some(col);
    }
  }

  let id_col = id?;
  Some(HeaderLayout {
    header_row: row,
    id_col,
    name_col: id_col + 1,
    price_col: price?,
    bonus_col: bonus?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sheet::Grid;

  fn locate(rows: Vec<Vec<&str>>) -> Result<HeaderLayout> {
    locate_header(&Grid::from_rows("test", rows), &HeaderLabels::default())
  }

  #[test]
  fn finds_header_on_first_row() {
    let layout = locate(vec![vec!["Код", "Наименование", "Цена, руб", "Бонусы"]]).unwrap();
    assert_eq!(layout, HeaderLayout {
      header_row: 0,
      id_col:     0,
      name_col:   1,
      price_col:  2,
      bonus_col:  3,
    });
  }

  #[test]
  fn finds_header_below_leading_rows() {
    let layout = locate(vec![
      vec!["Прайс-лист"],
      vec![""],
      vec!["Код", "", "Цена, руб", "Бонусы"],
      vec!["1", "Widget", "100", "5"],
    ])
    .unwrap();
    assert_eq!(layout.header_row, 2);
    assert_eq!((layout.id_col, layout.price_col, layout.bonus_col), (0, 2, 3));
  }

  #[test]
  fn category_columns_shift_the_header() {
    // Two category columns before the data; row 1 searches six columns.
    let layout = locate(vec![
      vec![],
      vec!["Ноутбуки", "", "Код", "Наименование", "Цена, руб", "Бонусы"],
    ])
    .unwrap();
    assert_eq!(layout.header_row, 1);
    assert_eq!(layout.id_col, 2);
    assert_eq!(layout.name_col, 3);
    assert_eq!(layout.price_col, 4);
    assert_eq!(layout.bonus_col, 5);
  }

  #[test]
  fn labels_outside_window_are_ignored() {
    // Row 0 only searches columns 0..5; the bonus label sits in column 5.
    let r = locate(vec![vec!["", "", "Код", "x", "Цена, руб", "Бонусы"]]);
    assert!(matches!(r, Err(Error::HeaderNotFound { .. })));
  }

  #[test]
  fn partial_rows_are_not_candidates() {
    let layout = locate(vec![
      vec!["Код", "", "Цена, руб"],
      vec!["Код", "", "", "Бонусы"],
      vec!["Код", "", "Цена, руб", "Бонусы"],
    ])
    .unwrap();
    assert_eq!(layout.header_row, 2);
  }

  #[test]
  fn first_occurrence_wins() {
    let layout = locate(vec![vec!["Код", "", "Цена, руб", "Бонусы", "Цена, руб", "Код"]])
      .unwrap();
    assert_eq!(layout.id_col, 0);
    assert_eq!(layout.price_col, 2);
  }

  #[test]
  fn missing_header_names_the_sheet() {
    let r = locate(vec![vec!["1", "2", "3"], vec!["4", "5", "6"]]);
    let Err(Error::HeaderNotFound { sheet }) = r else {
      panic!("expected HeaderNotFound")
    };
    assert_eq!(sheet, "test");
  }

  #[test]
  fn empty_sheet_has_no_header() {
    assert!(locate(vec![]).is_err());
  }

  #[test]
  fn surrounding_whitespace_is_ignored() {
    let layout = locate(vec![vec![" Код ", "", "Цена, руб ", "\tБонусы"]]).unwrap();
    assert_eq!(layout.bonus_col, 3);
  }

  #[test]
  fn custom_labels() {
    let labels = HeaderLabels {
      id:    "SKU".into(),
      price: "Price".into(),
      bonus: "Points".into(),
    };
    let grid = Grid::from_rows("en", [vec!["SKU", "Name", "Price", "Points"]]);
    let layout = locate_header(&grid, &labels).unwrap();
    assert_eq!(layout.bonus_col, 3);
  }
}
