//! Batch wire DTOs (spec §3, §4.5, §6).

use serde::{Deserialize, Serialize};

use super::common::Currency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BatchKind {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BatchItemStatus {
    Queued,
    Completed,
    Failed,
}

/// Status of a submitted batch (spec §3 `BatchOperation`).
#[derive(Debug, Clone, Deserialize)]
pub struct BatchStatus {
    pub batch_id: String,
    pub status: BatchOperationStatus,
    pub total_items: u32,
    pub item_statuses: BatchItemStatusCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BatchOperationStatus {
    Queued,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BatchItemStatusCounts {
    #[serde(default)]
    pub queued: u32,
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub failed: u32,
}

impl BatchStatus {
    /// Completion predicate per spec.md §9: `completed + failed == total`
    /// is authoritative over `queued == 0`.
    pub fn is_done(&self) -> bool {
        self.status == BatchOperationStatus::Completed
            || self.item_statuses.completed + self.item_statuses.failed == self.total_items
    }
}

/// One create-batch input: `{variantId, amount, currencyCode, quantity}`.
/// `quantity` is how many identical listings to create (coalesced per
/// §4.7.1), not a marketplace field by itself — the wrapper fans it out
/// into `quantity` repeated single-listing creates at submission time.
#[derive(Debug, Clone, Serialize)]
pub struct BatchCreateInput {
    #[serde(rename = "variantId")]
    pub variant_id: String,
    pub amount: String,
    #[serde(rename = "currencyCode")]
    pub currency_code: Currency,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateInput {
    #[serde(rename = "listingId")]
    pub listing_id: String,
    pub amount: String,
    #[serde(rename = "currencyCode")]
    pub currency_code: Currency,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchDeleteInput {
    #[serde(rename = "listingId")]
    pub listing_id: String,
}

/// Per-item outcome of a completed or partially-completed batch (spec §3
/// `BatchItemResult`). `input` is kept as raw JSON since its shape varies by
/// `BatchKind` and callers already know which kind they submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchItemResult {
    pub input: serde_json::Value,
    pub status: BatchItemStatus,
    #[serde(default)]
    pub listing_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
