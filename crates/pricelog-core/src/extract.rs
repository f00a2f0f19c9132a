//! Row extraction below a located header.

use crate::{
  locate::HeaderLayout,
  model::{PriceRow, ProductId},
  sheet::Sheet,
};

/// Iterate the data rows of `sheet` under `layout`'s header.
///
/// Rows whose identifier, price or bonus cell is not an integer are skipped
/// without comment. The iterator is single-pass and reads the sheet lazily.
pub fn extract_rows<'a, S: Sheet>(sheet: &'a S, layout: &HeaderLayout) -> Rows<'a, S> {
  Rows { sheet, layout: *layout, next: layout.header_row + 1 }
}

/// Iterator returned by [`extract_rows`].
pub struct Rows<'a, S> {
  sheet:  &'a S,
  layout: HeaderLayout,
  next:   usize,
}

impl<S: Sheet> Iterator for Rows<'_, S> {
  type Item = PriceRow;

  fn next(&mut self) -> Option<PriceRow> {
    while self.next < self.sheet.row_count() {
      let row = self.next;
      self.next += 1;
      if let Some(parsed) = parse_row(self.sheet, &self.layout, row) {
        return Some(parsed);
      }
    }
    None
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (0, Some(self.sheet.row_count().saturating_sub(self.next)))
  }
}

fn parse_row(sheet: &impl Sheet, layout: &HeaderLayout, row: usize) -> Option<PriceRow> {
  let int = |col| sheet.cell(row, col).trim().parse::<i64>().ok();

  Some(PriceRow {
    product_id: ProductId(int(layout.id_col)?),
    name:       sheet.cell(row, layout.name_col).to_owned(),
    price:      int(layout.price_col)?,
    bonus:      int(layout.bonus_col)?,
  })
}
