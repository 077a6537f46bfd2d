//! Order DTO (spec §1 Non-goals: "the 10+ dataclass DTOs that merely mirror
//! JSON fields" are out of scope beyond what's needed to list/fetch orders
//! through C6; this is intentionally minimal).

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::common::OrderStatus;

#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub listing_id: String,
    pub product_id: String,
    pub variant_id: String,
    pub amount: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}
