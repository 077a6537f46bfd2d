//! Listing and listing-operation DTOs (spec §3, §6).

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::{Currency, ListingStatus};

/// One marketplace unit for sale (spec §3): "a listing represents exactly
/// one physical unit."
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub listing_id: String,
    pub product_id: String,
    pub variant_id: String,
    pub amount: i64,
    pub currency_code: Currency,
    pub status: ListingStatus,
    #[serde(default)]
    pub order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Listing detail, additionally carrying the fee breakdown used to probe
/// account-specific fees (spec §4.9).
#[derive(Debug, Clone, Deserialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub payout: Payout,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Payout {
    #[serde(default)]
    pub total_payout: Option<i64>,
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Adjustment {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationStatus {
    Pending,
    Succeeded,
    Failed,
}

/// A per-listing asynchronous action (create, update, delete, activate,
/// deactivate), addressable by an `operation_id` (GLOSSARY).
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    pub operation_id: String,
    pub listing_id: String,
    pub status: OperationStatus,
    #[serde(default)]
    pub error: Option<String>,
}
