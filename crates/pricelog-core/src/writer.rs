//! The `ObservationWriter` trait and the console [`EchoWriter`].
//!
//! The trait is implemented by storage backends (e.g.
//! `pricelog-store-sqlite`). The ingestion driver depends on this
//! abstraction, not on any concrete backend.

use std::io::{self, Write};

use crate::model::{PriceRow, WriteOutcome};

/// Sink for extracted price rows.
///
/// A writer is used for exactly one ingestion run: any number of
/// [`write`](Self::write) calls followed by one [`close`](Self::close).
/// `close` must be safe to call more than once.
pub trait ObservationWriter {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Record one row and report which metrics changed.
  async fn write(&mut self, row: &PriceRow) -> Result<WriteOutcome, Self::Error>;

  /// Finish the run, persisting or discarding what was written.
  async fn close(&mut self) -> Result<(), Self::Error>;
}

/// Debug sink that prints every row and treats it as a change.
pub struct EchoWriter<W = io::Stdout> {
  out: W,
}

impl EchoWriter {
  pub fn stdout() -> Self { Self { out: io::stdout() } }
}

impl<W: Write> EchoWriter<W> {
  pub fn new(out: W) -> Self { Self { out } }

  pub fn into_inner(self) -> W { self.out }
}

impl<W: Write> ObservationWriter for EchoWriter<W> {
  type Error = io::Error;

  async fn write(&mut self, row: &PriceRow) -> io::Result<WriteOutcome> {
    writeln!(
      self.out,
      "Id = {:>10}, price = {:>7}, bonus = {:>5}",
      row.product_id, row.price, row.bonus
    )?;
    Ok(WriteOutcome { price_changed: true, bonus_changed: true })
  }

  async fn close(&mut self) -> io::Result<()> { self.out.flush() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::ProductId;

  #[tokio::test]
  async fn echo_prints_aligned_row() {
    let mut w = EchoWriter::new(Vec::new());
    let row = PriceRow { product_id: ProductId(42), name: "x".into(), price: 1999, bonus: 20 };

    let outcome = w.write(&row).await.unwrap();
    assert!(outcome.price_changed && outcome.bonus_changed);
    w.close().await.unwrap();

    let out = String::from_utf8(w.into_inner()).unwrap();
    assert_eq!(out, "Id =         42, price =    1999, bonus =    20\n");
  }
}
