//! Spreadsheet reader for pricelog.
//!
//! Opens `.xls`, `.xlsx`, `.xlsb` and `.ods` workbooks with [`calamine`] and
//! turns each worksheet into a [`Grid`] of text cells. Pure synchronous; no
//! database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use pricelog_core::sheet::Sheet;
//! use pricelog_xls::Workbook;
//!
//! let mut book = Workbook::open("prices-Moscow.xls").unwrap();
//! for (name, grid) in book.sheets() {
//!   println!("{name}: {} rows", grid.unwrap().row_count());
//! }
//! ```

pub mod error;

use std::{fs::File, io::BufReader, path::Path};

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
pub use error::{Error, Result};
use pricelog_core::sheet::Grid;

// ─── Workbook ────────────────────────────────────────────────────────────────

/// An open workbook; sheets are read one at a time on demand.
pub struct Workbook {
  sheets: Sheets<BufReader<File>>,
}

impl Workbook {
  /// Open a workbook, picking the format from the file extension.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    Ok(Self { sheets: open_workbook_auto(path)? })
  }

  /// Sheet names in workbook order.
  pub fn sheet_names(&self) -> Vec<String> { self.sheets.sheet_names() }

  /// Read one sheet as a grid of text.
  pub fn read_sheet(&mut self, name: &str) -> Result<Grid> {
    let range = self.sheets.worksheet_range(name)?;
    Ok(grid_from_range(name, &range))
  }

  /// Every sheet in workbook order with the result of reading it, read
  /// lazily as the iterator advances.
  pub fn sheets(&mut self) -> impl Iterator<Item = (String, Result<Grid>)> + '_ {
    let names = self.sheet_names();
    names.into_iter().map(move |name| {
      let grid = self.read_sheet(&name);
      (name, grid)
    })
  }
}

// ─── Conversion ──────────────────────────────────────────────────────────────

/// Build a [`Grid`] that keeps the range's absolute cell positions.
///
/// calamine trims leading empty rows and columns off a range; they are put
/// back as empty cells so row and column indices match the sheet.
pub fn grid_from_range(name: &str, range: &Range<Data>) -> Grid {
  let Some((first_row, first_col)) = range.start() else {
    return Grid::new(name, Vec::new());
  };

  let mut rows = vec![Vec::new(); first_row as usize];
  rows.extend(range.rows().map(|cells| {
    let mut row = vec![String::new(); first_col as usize];
    row.extend(cells.iter().map(cell_text));
    row
  }));
  Grid::new(name, rows)
}

/// Render a cell the way it reads in the spreadsheet.
///
/// Whole floats within the `i64` range lose their fractional part so that
/// numeric ids and prices stored as doubles parse as integers.
pub fn cell_text(cell: &Data) -> String {
  match cell {
    Data::String(s) => s.clone(),
    Data::Int(i) => i.to_string(),
    Data::Float(f) => {
      // Out-of-range values keep their float text and fail to parse later.
      if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
        (*f as i64).to_string()
      } else {
        f.to_string()
      }
    }
    Data::Bool(b) => b.to_string(),
    Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    _ => String::new(),
  }
}
