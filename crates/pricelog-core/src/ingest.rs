//! Ingestion drivers: locate the header, extract rows, write them. One sheet
//! at a time, or a whole workbook that skips sheets it cannot use.

use std::fmt;

use crate::{
  Result,
  extract::extract_rows,
  locate::{HeaderLabels, locate_header},
  sheet::Sheet,
  writer::ObservationWriter,
};

/// Counts for one ingested sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetReport {
  pub sheet:         String,
  /// Rows that parsed as (id, name, price, bonus).
  pub extracted:     usize,
  pub price_changes: usize,
  pub bonus_changes: usize,
  /// Extracted rows the writer rejected.
  pub failed:        usize,
}

impl fmt::Display for SheetReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Extracted {}, price changes {}, bonus changes {}",
      self.extracted, self.price_changes, self.bonus_changes
    )?;
    if self.failed > 0 {
      write!(f, ", failed {}", self.failed)?;
    }
    Ok(())
  }
}

/// Push every data row of `sheet` through `writer`.
///
/// Fails only when the sheet has no header. Writer errors are logged with the
/// offending row and counted; they never stop the sheet.
pub async fn ingest_sheet<S, W>(
  sheet: &S,
  labels: &HeaderLabels,
  writer: &mut W,
) -> Result<SheetReport>
where
  S: Sheet,
  W: ObservationWriter,
{
  let layout = locate_header(sheet, labels)?;
  tracing::debug!(sheet = sheet.name(), ?layout, "header located");

  let mut report = SheetReport { sheet: sheet.name().to_owned(), ..Default::default() };

  for row in extract_rows(sheet, &layout) {
    report.extracted += 1;
    match writer.write(&row).await {
      Ok(outcome) => {
        report.price_changes += usize::from(outcome.price_changed);
        report.bonus_changes += usize::from(outcome.bonus_changed);
      }
      Err(e) => {
        report.failed += 1;
        tracing::warn!(
          error = %e,
          id = %row.product_id,
          price = row.price,
          bonus = row.bonus,
          "failed to record row"
        );
      }
    }
  }

  Ok(report)
}

/// What became of one sheet of a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetOutcome {
  Ingested(SheetReport),
  /// The sheet could not be read or has no header; nothing was written.
  Skipped { sheet: String, message: String },
}

impl SheetOutcome {
  pub fn sheet(&self) -> &str {
    match self {
      SheetOutcome::Ingested(report) => &report.sheet,
      SheetOutcome::Skipped { sheet, .. } => sheet,
    }
  }
}

impl fmt::Display for SheetOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SheetOutcome::Ingested(report) => fmt::Display::fmt(report, f),
      SheetOutcome::Skipped { message, .. } => f.write_str(message),
    }
  }
}

/// Progress notifications from [`ingest_sheets`].
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
  /// About to process the named sheet.
  Started(&'a str),
  Finished(&'a SheetOutcome),
}

/// Run every sheet of a workbook through `writer`, in order.
///
/// `sheets` yields each sheet's name with the result of reading it. A sheet
/// that failed to read or has no header is skipped and the rest still run.
/// The writer is left open; closing it is the caller's job.
pub async fn ingest_sheets<I, S, E, W>(
  sheets: I,
  labels: &HeaderLabels,
  writer: &mut W,
  mut progress: impl FnMut(Progress<'_>),
) -> Vec<SheetOutcome>
where
  I: IntoIterator<Item = (String, std::result::Result<S, E>)>,
  S: Sheet,
  E: fmt::Display,
  W: ObservationWriter,
{
  let mut outcomes = Vec::new();

  for (name, sheet) in sheets {
    progress(Progress::Started(&name));

    let outcome = match sheet {
      Err(e) => {
        tracing::warn!(sheet = %name, error = %e, "skipping unreadable sheet");
        SheetOutcome::Skipped { message: format!("{name}: {e}"), sheet: name }
      }
      Ok(sheet) => match ingest_sheet(&sheet, labels, writer).await {
        Ok(report) => SheetOutcome::Ingested(report),
        Err(e) => {
          tracing::warn!(sheet = %name, error = %e, "skipping sheet");
          SheetOutcome::Skipped { message: e.to_string(), sheet: name }
        }
      },
    };

    progress(Progress::Finished(&outcome));
    outcomes.push(outcome);
  }

  outcomes
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;
  use crate::{
    Error,
    model::{MetricKind, PriceRow, ProductId, WriteOutcome},
    sheet::Grid,
  };

  /// In-memory change detector; rejects product id 13.
  #[derive(Default)]
  struct MemoryWriter {
    latest: HashMap<(ProductId, MetricKind), i64>,
    closed: bool,
  }

  #[derive(Debug, thiserror::Error)]
  #[error("unlucky product")]
  struct Unlucky;

  impl ObservationWriter for MemoryWriter {
    type Error = Unlucky;

    async fn write(&mut self, row: &PriceRow) -> Result<WriteOutcome, Unlucky> {
      if row.product_id == ProductId(13) {
        return Err(Unlucky);
      }
      let mut changed = |metric: MetricKind| {
        let value = metric.value_of(row);
        self.latest.insert((row.product_id, metric), value) != Some(value)
      };
      Ok(WriteOutcome {
        price_changed: changed(MetricKind::Price),
        bonus_changed: changed(MetricKind::Bonus),
      })
    }

    async fn close(&mut self) -> Result<(), Unlucky> {
      self.closed = true;
      Ok(())
    }
  }

  fn price_list() -> Grid {
    Grid::from_rows("Чайники", [
      vec!["Бытовая техника"],
      vec![""],
      vec!["Код", "Наименование", "Цена, руб", "Бонусы"],
      vec!["1001", "Kettle A", "1999", "20"],
      vec!["1002", "Kettle B", "нет", "30"],
      vec!["1003", "Kettle C", "3999", "40"],
    ])
  }

  #[tokio::test]
  async fn first_run_changes_every_valid_row() {
    let mut w = MemoryWriter::default();
    let report = ingest_sheet(&price_list(), &HeaderLabels::default(), &mut w)
      .await
      .unwrap();
    assert_eq!(report, SheetReport {
      sheet:         "Чайники".into(),
      extracted:     2,
      price_changes: 2,
      bonus_changes: 2,
      failed:        0,
    });
  }

  #[tokio::test]
  async fn repeated_run_changes_nothing() {
    let mut w = MemoryWriter::default();
    let labels = HeaderLabels::default();
    ingest_sheet(&price_list(), &labels, &mut w).await.unwrap();
    let report = ingest_sheet(&price_list(), &labels, &mut w).await.unwrap();
    assert_eq!(report.extracted, 2);
    assert_eq!(report.price_changes, 0);
    assert_eq!(report.bonus_changes, 0);
    w.close().await.unwrap();
    assert!(w.closed);
  }

  #[tokio::test]
  async fn writer_errors_are_counted_not_fatal() {
    let grid = Grid::from_rows("s", [
      vec!["Код", "", "Цена, руб", "Бонусы"],
      vec!["13", "", "1", "1"],
      vec!["14", "", "1", "1"],
    ]);
    let mut w = MemoryWriter::default();
    let report = ingest_sheet(&grid, &HeaderLabels::default(), &mut w).await.unwrap();
    assert_eq!((report.extracted, report.failed, report.price_changes), (2, 1, 1));
    assert_eq!(report.to_string(), "Extracted 2, price changes 1, bonus changes 1, failed 1");
  }

  #[tokio::test]
  async fn sheet_without_header_is_an_error() {
    let grid = Grid::from_rows("Прочее", [vec!["1", "2", "3", "4"]]);
    let mut w = MemoryWriter::default();
    let r = ingest_sheet(&grid, &HeaderLabels::default(), &mut w).await;
    assert!(matches!(r, Err(Error::HeaderNotFound { .. })));
    assert!(w.latest.is_empty());
  }

  #[tokio::test]
  async fn workbook_skips_bad_sheets_and_keeps_going() {
    let sheets: Vec<(String, std::result::Result<Grid, &str>)> = vec![
      ("Прочее".into(), Ok(Grid::from_rows("Прочее", [vec!["1", "2", "3", "4"]]))),
      ("Сломан".into(), Err("unsupported cell")),
      ("Чайники".into(), Ok(price_list())),
    ];
    let mut w = MemoryWriter::default();
    let mut seen = Vec::new();

    let outcomes = ingest_sheets(sheets, &HeaderLabels::default(), &mut w, |p| {
      seen.push(match p {
        Progress::Started(name) => format!("start {name}"),
        Progress::Finished(outcome) => format!("done {outcome}"),
      })
    })
    .await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].to_string(), "Прочее: no header found");
    assert_eq!(outcomes[1], SheetOutcome::Skipped {
      sheet:   "Сломан".into(),
      message: "Сломан: unsupported cell".into(),
    });
    let SheetOutcome::Ingested(report) = &outcomes[2] else {
      panic!("expected the last sheet to be ingested: {:?}", outcomes[2]);
    };
    assert_eq!((report.extracted, report.price_changes), (2, 2));
    assert_eq!(outcomes[2].sheet(), "Чайники");
    assert_eq!(w.latest.len(), 4);
    assert!(!w.closed);

    assert_eq!(seen, [
      "start Прочее",
      "done Прочее: no header found",
      "start Сломан",
      "done Сломан: unsupported cell",
      "start Чайники",
      "done Extracted 2, price changes 2, bonus changes 2",
    ]);
  }
}
