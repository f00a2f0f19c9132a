//! Domain types — cities, products and the observations recorded for them.
//!
//! Observations are append-only. The current value of a metric for a
//! (product, city) pair is whatever the newest observation says; nothing is
//! ever updated in place.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Store identifier of a city.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CityId(pub i64);

/// Product identifier, taken verbatim from the price list.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for CityId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.0, f)
  }
}

impl fmt::Display for ProductId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.0, f)
  }
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

/// The two value streams tracked independently per (product, city).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
  Price,
  Bonus,
}

impl MetricKind {
  /// Pick this metric's value out of an extracted row.
  pub fn value_of(self, row: &PriceRow) -> i64 {
    match self {
      MetricKind::Price => row.price,
      MetricKind::Bonus => row.bonus,
    }
  }
}

impl fmt::Display for MetricKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      MetricKind::Price => "price",
      MetricKind::Bonus => "bonus",
    })
  }
}

// ─── Entities ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
  pub id:   CityId,
  pub name: String,
}

/// The city an ingestion run writes to.
///
/// `id` is normally left empty and assigned by the store on first sight of
/// `name`; a caller-supplied id is used verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityRef {
  pub name: String,
  pub id:   Option<CityId>,
}

impl CityRef {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), id: None }
  }

  pub fn with_id(mut self, id: CityId) -> Self {
    self.id = Some(id);
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub id:   ProductId,
  /// `None` until some price list carries a name for this product.
  pub name: Option<String>,
}

// ─── Rows and observations ───────────────────────────────────────────────────

/// One data row pulled out of a sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRow {
  pub product_id: ProductId,
  /// Raw name cell; empty when the sheet has no name for the product.
  pub name:       String,
  pub price:      i64,
  pub bonus:      i64,
}

impl PriceRow {
  /// The product name, or `None` for a blank cell.
  pub fn name(&self) -> Option<&str> {
    let name = self.name.trim();
    (!name.is_empty()).then_some(name)
  }
}

/// A single recorded (product, city, metric, value) fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
  pub product_id:  ProductId,
  pub city_id:     CityId,
  pub metric:      MetricKind,
  pub value:       i64,
  pub observed_at: DateTime<Utc>,
}

/// Which metrics a write actually appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
  pub price_changed: bool,
  pub bonus_changed: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn row(name: &str) -> PriceRow {
    PriceRow { product_id: ProductId(1), name: name.into(), price: 10, bonus: 2 }
  }

  #[test]
  fn blank_name_is_none() {
    assert_eq!(row("").name(), None);
    assert_eq!(row("   ").name(), None);
    assert_eq!(row(" Widget ").name(), Some("Widget"));
  }

  #[test]
  fn metric_picks_matching_value() {
    let r = row("x");
    assert_eq!(MetricKind::Price.value_of(&r), 10);
    assert_eq!(MetricKind::Bonus.value_of(&r), 2);
  }

  #[test]
  fn metric_displays_lowercase() {
    assert_eq!(MetricKind::Bonus.to_string(), "bonus");
  }
}
