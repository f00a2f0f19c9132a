//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! precision, so that `ORDER BY observed_at` is chronological.

use chrono::{DateTime, SecondsFormat, Utc};
use pricelog_core::model::{CityId, MetricKind, Observation, ProductId};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── MetricKind ──────────────────────────────────────────────────────────────

/// Table holding the observations of `metric`.
pub fn metric_table(metric: MetricKind) -> &'static str {
  match metric {
    MetricKind::Price => "price_observations",
    MetricKind::Bonus => "bonus_observations",
  }
}

/// Value column within [`metric_table`].
pub fn metric_column(metric: MetricKind) -> &'static str {
  match metric {
    MetricKind::Price => "price",
    MetricKind::Bonus => "bonus",
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an observation row.
pub struct RawObservation {
  pub product_id:  i64,
  pub city_id:     i64,
  pub value:       i64,
  pub observed_at: String,
}

impl RawObservation {
  pub fn into_observation(self, metric: MetricKind) -> Result<Observation> {
    Ok(Observation {
      product_id: ProductId(self.product_id),
      city_id: CityId(self.city_id),
      metric,
      value: self.value,
      observed_at: decode_dt(&self.observed_at)?,
    })
  }
}
