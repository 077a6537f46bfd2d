//! Shared enums and serialization helpers (spec §3, §6).
//!
//! Grounded on the teacher's `src/models/common.rs` (`cents_to_dollars`,
//! status enums) generalized from Kalshi's cents-based contracts market to
//! this marketplace's stringified-integer monetary amounts and ISO-8601
//! timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
}

/// Listing lifecycle status (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListingStatus {
    Active,
    Inactive,
    Canceled,
    Matched,
    Completed,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Created,
    Open,
    Shipped,
    Completed,
    Canceled,
    Failed,
}

/// Marketplace amounts travel as stringified truncated integers (spec §6).
/// `amount` here is minor units (e.g. cents) to avoid floating point drift.
pub fn amount_to_wire(amount_minor_units: i64) -> String {
    (amount_minor_units / 100).to_string()
}

pub fn amount_from_wire(wire: &str) -> Option<i64> {
    wire.parse::<i64>().ok().map(|major| major * 100)
}

/// `.000Z`-suffixed ISO-8601 with millisecond precision (spec §6).
pub fn datetime_to_wire(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub fn date_to_wire(value: chrono::NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_round_trips_through_wire_format() {
        let wire = amount_to_wire(12_300);
        assert_eq!(wire, "123");
        assert_eq!(amount_from_wire(&wire), Some(12_300));
    }

    #[test]
    fn datetime_formats_with_millisecond_precision_and_z_suffix() {
        let dt = DateTime::parse_from_rfc3339("2026-07-26T10:00:00.500+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(datetime_to_wire(dt), "2026-07-26T10:00:00.500Z");
    }
}
