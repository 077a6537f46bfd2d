//! Catalog DTOs (spec §6): product/variant lookups and per-variant market
//! data used by the `beat_*` convenience strategies (spec §4.7.6).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub style_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Variant {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub size: Option<String>,
}

/// Suggested pricing for a variant, read by the `beat_*` strategies
/// (spec §4.7.6). Amounts are minor units (cents).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MarketData {
    #[serde(default)]
    pub lowest_ask: Option<i64>,
    #[serde(default)]
    pub highest_bid: Option<i64>,
    #[serde(default)]
    pub sell_faster: Option<i64>,
    #[serde(default)]
    pub earn_more: Option<i64>,
}
